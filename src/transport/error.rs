//! Tipos de erro da camada de transporte.
//!
//! Define [`TransportError`] para falhas que acontecem antes de existir uma
//! resposta HTTP. Respostas fora da faixa 2xx não são erros de transporte;
//! quem decide o que fazer com elas é o laço de retentativas.

use thiserror::Error;

/// Erros que podem ocorrer ao entregar um payload ao receptor de eventos.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Destino inalcançável por um transporte que não usa `reqwest`.
    #[error("receiver unreachable: {0}")]
    Unreachable(String),
}
