//! Configuración del cliente remoto.
//!
//! Variables: `NVIDIA_NIM_API_URL`, `NVIDIA_API_KEY` (opcional) y
//! `MOLUNI_QUERY_TIMEOUT_SECS`. La carga de `.env` es responsabilidad del
//! binario.

use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::AdapterError;

pub const DEFAULT_API_URL: &str = "http://localhost:8003/v1/infer";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct NimConfig {
    pub base_url: String,
    /// Token bearer; sólo se envía si está presente.
    pub api_key: Option<String>,
    /// Tiempo máximo por consulta (conexión incluida).
    pub timeout: Duration,
}

impl NimConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(),
               api_key: None,
               timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS) }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, AdapterError> {
        let base_url = env::var("NVIDIA_NIM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_key = env::var("NVIDIA_API_KEY").ok().filter(|k| !k.trim().is_empty());
        let timeout = match env::var("MOLUNI_QUERY_TIMEOUT_SECS") {
            Ok(v) => v.trim()
                      .parse::<u64>()
                      .map_err(|_| AdapterError::Config(format!("MOLUNI_QUERY_TIMEOUT_SECS inválido: {v}")))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        let cfg = Self { base_url,
                         api_key,
                         timeout: Duration::from_secs(timeout) };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AdapterError> {
        if self.base_url.trim().is_empty() {
            return Err(AdapterError::Config("base_url vacío".into()));
        }
        self.base()?;
        if self.timeout.is_zero() {
            return Err(AdapterError::Config("timeout debe ser > 0".into()));
        }
        Ok(())
    }

    fn base(&self) -> Result<Url, AdapterError> {
        let url = Url::parse(self.base_url.trim()).map_err(|e| AdapterError::Config(format!("base_url inválido '{}': {e}", self.base_url)))?;
        if url.cannot_be_a_base() {
            return Err(AdapterError::Config(format!("base_url sin ruta jerárquica: {}", self.base_url)));
        }
        Ok(url)
    }

    /// Endpoint de estado de un job: `{base}/{job_id}`, con el id codificado
    /// como un único segmento de ruta (`?`, `#`, `/` y `%` quedan escapados).
    pub fn status_url(&self, job_id: &str) -> Result<Url, AdapterError> {
        if matches!(job_id, "" | "." | "..") {
            return Err(AdapterError::InvalidJobId(job_id.to_string()));
        }
        let mut url = self.base()?;
        url.path_segments_mut()
           .map_err(|_| AdapterError::Config(format!("base_url sin ruta jerárquica: {}", self.base_url)))?
           .pop_if_empty()
           .push(job_id);
        Ok(url)
    }
}
