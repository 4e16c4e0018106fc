//! Configuración de conexión Postgres.
//!
//! Claves reconocidas (entorno o `.env`):
//! - `MOLUNI_DATABASE_URL` (o `DATABASE_URL` como respaldo): obligatoria.
//! - `MOLUNI_DB_MIN_CONNECTIONS` / `MOLUNI_DB_MAX_CONNECTIONS`: tamaño del
//!   pool, por defecto 1 y 4.
//! - `MOLUNI_DB_CONNECT_TIMEOUT_SECS`: espera máxima por una conexión, por
//!   defecto 5.
//!
//! Un valor presente pero inválido es un error de configuración, nunca se
//! sustituye en silencio por el valor por defecto.

use std::env;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::error::PersistenceError;

pub const URL_KEY: &str = "MOLUNI_DATABASE_URL";
pub const FALLBACK_URL_KEY: &str = "DATABASE_URL";
pub const MIN_CONNECTIONS_KEY: &str = "MOLUNI_DB_MIN_CONNECTIONS";
pub const MAX_CONNECTIONS_KEY: &str = "MOLUNI_DB_MAX_CONNECTIONS";
pub const CONNECT_TIMEOUT_KEY: &str = "MOLUNI_DB_CONNECT_TIMEOUT_SECS";

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            log::warn!(".env ignorado: {e}");
        }
    }
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connection_timeout: Duration,
}

impl DbConfig {
    /// Config con los tamaños por defecto para `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(),
               min_connections: 1,
               max_connections: 4,
               connection_timeout: Duration::from_secs(5) }
    }

    /// Lee la configuración del entorno (cargando `.env` una sola vez).
    pub fn from_env() -> Result<Self, PersistenceError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parser puro sobre una función de búsqueda de claves.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PersistenceError>
        where F: Fn(&str) -> Option<String>
    {
        let url = lookup(URL_KEY).or_else(|| lookup(FALLBACK_URL_KEY))
                                 .filter(|u| !u.trim().is_empty())
                                 .ok_or_else(|| PersistenceError::Config(format!("{URL_KEY} (o {FALLBACK_URL_KEY}) no definido")))?;
        let mut cfg = Self::new(url);
        if let Some(v) = parse_key::<u32>(&lookup, MIN_CONNECTIONS_KEY)? {
            cfg.min_connections = v;
        }
        if let Some(v) = parse_key::<u32>(&lookup, MAX_CONNECTIONS_KEY)? {
            cfg.max_connections = v;
        }
        if let Some(v) = parse_key::<u64>(&lookup, CONNECT_TIMEOUT_KEY)? {
            if v == 0 {
                return Err(PersistenceError::Config(format!("{CONNECT_TIMEOUT_KEY} debe ser > 0")));
            }
            cfg.connection_timeout = Duration::from_secs(v);
        }
        if cfg.max_connections == 0 {
            return Err(PersistenceError::Config(format!("{MAX_CONNECTIONS_KEY} debe ser > 0")));
        }
        Ok(cfg)
    }
}

fn parse_key<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, PersistenceError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim()
                        .parse()
                        .map(Some)
                        .map_err(|_| PersistenceError::Config(format!("{key}: valor inválido '{raw}'"))),
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
