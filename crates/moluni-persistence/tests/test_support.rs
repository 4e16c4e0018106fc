use moluni_persistence::config::DbConfig;
use moluni_persistence::pg::{build_pool, migrate_pool, PgPool, PgResultStore, PoolProvider};
use once_cell::sync::Lazy;

pub static TEST_POOL: Lazy<Option<PgPool>> = Lazy::new(|| {
    if std::env::var("DATABASE_URL").is_err() {
        return None;
    }
    let cfg = DbConfig::from_env().ok()?;
    match build_pool(&cfg.url, 1, 2).and_then(|p| migrate_pool(&p).map(|_| p)) {
        Ok(p) => Some(p),
        Err(e) => {
            eprintln!("No se pudo construir pool de test: {e}");
            None
        }
    }
});

/// Store sobre el pool compartido; `None` si no hay base de datos.
pub fn test_store() -> Option<PgResultStore<PoolProvider>> {
    TEST_POOL.as_ref()
             .map(|pool| PgResultStore::new(PoolProvider { pool: pool.clone() }))
}
