use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::BigInt;
use moluni_persistence::config::DbConfig;
use moluni_persistence::pg::{build_pool, migrate_pool};

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[test]
fn migrations_create_result_tables() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip (no DATABASE_URL)");
        return;
    }
    let cfg = DbConfig::from_env().expect("config");
    let pool = build_pool(&cfg.url, 1, 1).expect("pool");
    migrate_pool(&pool).expect("migrate");
    // Idempotente: sin migraciones pendientes no hace nada.
    migrate_pool(&pool).expect("migrate again");
    let mut conn = pool.get().expect("conn");
    let found: Count = sql_query("SELECT COUNT(*) AS count FROM information_schema.tables WHERE table_name IN ('calculations', 'properties')").get_result(&mut conn)
                                                                                                                                          .expect("query");
    assert_eq!(found.count, 2);
}

