//! Resolution of the event receiver's base URL.

use std::fmt;
use std::sync::Arc;

/// Primary environment variable holding the receiver base URL.
pub const EVENT_RECEIVER_ENV: &str = "CA_EVENT_RECEIVER_HTTP";

/// Deprecated fallback for [`EVENT_RECEIVER_ENV`].
pub const LEGACY_EVENT_RECEIVER_ENV: &str = "CA_ARMO_EVENT_URL";

/// Supplies the receiver base URL. Called once per send.
pub trait ResolveEndpoint: Send + Sync {
    fn base_url(&self) -> Option<String>;
}

/// A fixed base URL, typically taken from configuration.
#[derive(Debug, Clone)]
pub struct StaticEndpoint(pub String);

impl ResolveEndpoint for StaticEndpoint {
    fn base_url(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.clone())
        }
    }
}

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads the base URL from the environment on every call, first non-empty
/// variable wins.
#[derive(Clone)]
pub struct EnvEndpoint {
    vars: Vec<String>,
    lookup: Lookup,
}

impl Default for EnvEndpoint {
    fn default() -> Self {
        Self::with_vars([EVENT_RECEIVER_ENV, LEGACY_EVENT_RECEIVER_ENV])
    }
}

impl fmt::Debug for EnvEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvEndpoint")
            .field("vars", &self.vars)
            .finish_non_exhaustive()
    }
}

impl EnvEndpoint {
    pub fn with_vars<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
            lookup: Arc::new(|var: &str| std::env::var(var).ok()),
        }
    }

    /// Replace the process environment with `lookup` when reading variables.
    pub fn with_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.lookup = Arc::new(lookup);
        self
    }
}

impl ResolveEndpoint for EnvEndpoint {
    fn base_url(&self) -> Option<String> {
        self.vars
            .iter()
            .filter_map(|var| (self.lookup)(var))
            .find(|value| !value.is_empty())
    }
}
