//! Configuração do reporter carregada a partir de `sysreport.toml`.
//!
//! A struct [`ReporterConfig`] contém o endereço do receptor de eventos, o
//! caminho do endpoint e a política de retentativas. Valores não presentes no
//! arquivo usam defaults sensíveis. As variáveis de ambiente
//! `CA_EVENT_RECEIVER_HTTP` (e a antiga `CA_ARMO_EVENT_URL`) têm precedência
//! sobre o arquivo para o endereço do receptor.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::endpoint::{EnvEndpoint, ResolveEndpoint};

/// Caminho padrão do endpoint de relatórios no receptor.
pub const DEFAULT_ENDPOINT_PATH: &str = "/k8s/sysreport";

/// Configuração de nível superior carregada de `sysreport.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReporterConfig {
    /// URL base do receptor de eventos (ex.: `http://event-receiver:8080`).
    #[serde(default)]
    pub event_receiver_url: Option<String>,

    /// Caminho anexado à URL base. Vazio volta ao padrão.
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,

    /// Número total de tentativas de POST por relatório.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Intervalo fixo em milissegundos entre tentativas.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

// Valor padrão para o caminho do endpoint.
fn default_endpoint_path() -> String {
    DEFAULT_ENDPOINT_PATH.to_string()
}

// Valor padrão para tentativas: 3.
fn default_max_retries() -> u32 {
    3
}

// Valor padrão para o intervalo entre tentativas: 5000ms.
fn default_retry_delay_ms() -> u64 {
    5000
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            event_receiver_url: None,
            endpoint_path: default_endpoint_path(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl ReporterConfig {
    /// Carrega a configuração de `sysreport.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("sysreport.toml"))
    }

    /// Carrega a configuração de um arquivo explícito, aplicando as
    /// variáveis de ambiente por cima.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<ReporterConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo para a URL.
        if let Some(url) = EnvEndpoint::default().base_url() {
            config.event_receiver_url = Some(url);
        }

        Ok(config)
    }

    /// Caminho do endpoint, com fallback para o padrão quando vazio.
    pub fn endpoint_path(&self) -> &str {
        if self.endpoint_path.is_empty() {
            DEFAULT_ENDPOINT_PATH
        } else {
            &self.endpoint_path
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            delay_ms: self.retry_delay_ms,
        }
    }
}

/// Política de retentativas: número total de tentativas e intervalo fixo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total de tentativas. Zero é tratado como uma tentativa.
    pub max_retries: u32,
    /// Intervalo fixo entre tentativas, em milissegundos.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
