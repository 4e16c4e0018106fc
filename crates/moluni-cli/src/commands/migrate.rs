use log::info;
use moluni_persistence::{build_pool_from_config, migrate_pool, DbConfig};

use crate::error::Result;

/// Crea o actualiza el esquema `calculations`/`properties`.
pub fn run() -> Result<()> {
    let cfg = DbConfig::from_env()?;
    let pool = build_pool_from_config(&cfg)?;
    migrate_pool(&pool)?;
    info!("migrate: esquema al día");
    println!("migrations applied");
    Ok(())
}
