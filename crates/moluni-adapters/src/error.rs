use thiserror::Error;

/// Errores al construir el cliente remoto.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("http client error: {0}")]
    Client(String),
    /// Id vacío o que sólo sería un segmento `.`/`..` de la ruta.
    #[error("invalid job id: {0:?}")]
    InvalidJobId(String),
}
