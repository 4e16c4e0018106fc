//! moluni-persistence
//!
//! Implementación Postgres (Diesel + r2d2) del `ResultStore` del core.
//!
//! Módulos:
//! - `pg`: store de cálculos y propiedades sobre Postgres.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: configuración `MOLUNI_*` desde entorno o .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, build_pool_from_config, migrate_pool, ConnectionProvider, LazyPgResultStore, PgPool,
             PgResultStore, PoolProvider};
