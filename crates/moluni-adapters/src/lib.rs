//! moluni-adapters: acceso HTTP a la API remota de cálculo (estilo NIM).
//!
//! - `document`: interpretación del documento de estado de un job.
//! - `nim`: cliente bloqueante que implementa `JobStatusSource` y
//!   `JobSubmitter`.
//! - `config`: URL base, token y timeout desde el entorno.

pub mod config;
pub mod document;
pub mod error;
pub mod nim;

pub use config::NimConfig;
pub use document::{parse_properties, parse_status_document};
pub use error::AdapterError;
pub use nim::NimClient;
