//! Implementación Postgres (Diesel) del `ResultStore` del core.
//!
//! Objetivo general del módulo:
//! - Persistir de forma durable las filas de `calculations` y `properties`
//!   con la misma semántica que `InMemoryResultStore`.
//! - Garantizar que una escritura terminal (fila + propiedades) sea atómica:
//!   ambas van en la MISMA transacción, con la fila bloqueada vía
//!   `SELECT ... FOR UPDATE`.
//! - Upsert que nunca sobrescribe filas terminales e inserción de propiedades
//!   con `ON CONFLICT DO NOTHING` (re-entrega segura).
//! - Manejo básico de errores transitorios: reintento con backoff corto.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use log::{debug, info, warn};
use once_cell::unsync::OnceCell;
use moluni_core::{ResultStore, StoreError, TerminalWrite, UpsertOutcome};
use moluni_core::store::should_insert_properties;
use moluni_domain::{Calculation, CalculationStatus, Property, PropertyValue};

use crate::config::DbConfig;
use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{calculations, properties};

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real (producción/tests de integración) o un
/// proveedor alternativo sin acoplar el store a r2d2.
pub trait ConnectionProvider: Send + Sync + 'static {
    /// Obtiene una conexión lista para ejecutar consultas Diesel.
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila mapeada de la tabla `calculations` (orden de columnas del `table!`).
#[derive(Queryable, Debug)]
pub struct CalculationRow {
    pub id: String,
    pub input_descriptor: String,
    pub formula: Option<String>,
    pub calculation_type: String,
    pub status: String,
    pub submission_time: DateTime<Utc>,
    pub completion_time: Option<DateTime<Utc>>,
}

impl TryFrom<CalculationRow> for Calculation {
    type Error = PersistenceError;

    fn try_from(row: CalculationRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e| PersistenceError::InvalidRow(format!("{}: {e}", row.id)))?;
        let calculation_type = row.calculation_type
                                  .parse()
                                  .map_err(|e| PersistenceError::InvalidRow(format!("{}: {e}", row.id)))?;
        Ok(Calculation { id: row.id,
                         input_descriptor: row.input_descriptor,
                         formula: row.formula,
                         calculation_type,
                         status,
                         submission_time: row.submission_time,
                         completion_time: row.completion_time })
    }
}

/// Fila para insertar en `calculations`.
#[derive(Insertable, Debug)]
#[diesel(table_name = calculations)]
pub struct NewCalculationRow<'a> {
    pub id: &'a str,
    pub input_descriptor: &'a str,
    pub formula: Option<&'a str>,
    pub calculation_type: &'a str,
    pub status: &'a str,
    pub submission_time: DateTime<Utc>,
    pub completion_time: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Calculation> for NewCalculationRow<'a> {
    fn from(c: &'a Calculation) -> Self {
        Self { id: &c.id,
               input_descriptor: &c.input_descriptor,
               formula: c.formula.as_deref(),
               calculation_type: c.calculation_type.as_str(),
               status: c.status.as_str(),
               submission_time: c.submission_time,
               completion_time: c.completion_time }
    }
}

/// Fila mapeada de la tabla `properties`.
#[derive(Queryable, Debug)]
pub struct PropertyRow {
    pub calculation_id: String,
    pub property_name: String,
    pub property_value: Option<f64>,
    pub property_text: Option<String>,
    pub units: Option<String>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = PersistenceError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let value = match (row.property_value, row.property_text) {
            (Some(v), _) => PropertyValue::Number(v),
            (None, Some(t)) => PropertyValue::Text(t),
            (None, None) => {
                return Err(PersistenceError::InvalidRow(format!("property {}/{} without value",
                                                               row.calculation_id, row.property_name)))
            }
        };
        Ok(Property { name: row.property_name,
                      value,
                      units: row.units })
    }
}

/// Fila para insertar en `properties`. PK compuesta
/// (`calculation_id`, `property_name`).
#[derive(Insertable, Debug)]
#[diesel(table_name = properties)]
pub struct NewPropertyRow<'a> {
    pub calculation_id: &'a str,
    pub property_name: &'a str,
    pub property_value: Option<f64>,
    pub property_text: Option<&'a str>,
    pub units: Option<&'a str>,
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos mensajes de error (dependen de driver/pg) pueden llegar como Unknown
        // con texto. Hacemos best-effort string match sin acoplar a SQLSTATE.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
        }
        _ => false,
    }
}

/// Retry simple con backoff lineal muy pequeño (hasta 3 reintentos).
///
/// La unidad de trabajo `f` debe ser una transacción completa: repetirla no
/// altera la semántica porque los upserts son idempotentes.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Upsert de una fila dentro de una transacción abierta.
///
/// Inserta primero con `ON CONFLICT (id) DO NOTHING`: si otra pasada creó la
/// fila en paralelo, el insert no falla y se continúa con la fila existente
/// bloqueada vía `FOR UPDATE`.
fn upsert_in_tx(tx: &mut PgConnection, row: &Calculation) -> Result<UpsertOutcome, PersistenceError> {
    row.validate().map_err(|e| PersistenceError::Validation(e.to_string()))?;
    let inserted = diesel::insert_into(calculations::table).values(NewCalculationRow::from(row))
                                                           .on_conflict(calculations::id)
                                                           .do_nothing()
                                                           .execute(tx)?;
    if inserted == 1 {
        return Ok(UpsertOutcome::Inserted);
    }
    let existing: String = calculations::table.find(row.id.as_str())
                                              .select(calculations::status)
                                              .for_update()
                                              .get_result(tx)?;
    let existing: CalculationStatus = existing.parse()
                                              .map_err(|e| PersistenceError::InvalidRow(format!("{}: {e}", row.id)))?;
    if existing.is_terminal() {
        return Ok(UpsertOutcome::AlreadyTerminal(existing));
    }
    if !existing.can_transition_to(row.status) {
        return Ok(UpsertOutcome::Stale(existing));
    }
    let target = calculations::table.find(row.id.as_str());
    match row.formula.as_deref() {
        Some(formula) => diesel::update(target).set((calculations::status.eq(row.status.as_str()),
                                                     calculations::completion_time.eq(row.completion_time),
                                                     calculations::formula.eq(formula)))
                                               .execute(tx)?,
        None => diesel::update(target).set((calculations::status.eq(row.status.as_str()),
                                            calculations::completion_time.eq(row.completion_time)))
                                      .execute(tx)?,
    };
    Ok(UpsertOutcome::Updated)
}

/// Inserta propiedades dentro de una transacción abierta. Los nombres
/// repetidos (en el lote o ya almacenados) se omiten.
fn insert_properties_in_tx(tx: &mut PgConnection, calculation_id: &str, props: &[Property]) -> Result<usize, PersistenceError> {
    let exists: bool = diesel::select(diesel::dsl::exists(calculations::table.find(calculation_id))).get_result(tx)?;
    if !exists {
        return Err(PersistenceError::UnknownCalculation(calculation_id.to_string()));
    }
    let mut seen = HashSet::new();
    let rows: Vec<NewPropertyRow<'_>> = props.iter()
                                             .filter(|p| seen.insert(p.name.as_str()))
                                             .map(|p| NewPropertyRow { calculation_id,
                                                                       property_name: &p.name,
                                                                       property_value: p.value.as_number(),
                                                                       property_text: p.value.as_text(),
                                                                       units: p.units.as_deref() })
                                             .collect();
    if rows.is_empty() {
        return Ok(0);
    }
    let inserted = diesel::insert_into(properties::table).values(&rows)
                                                         .on_conflict((properties::calculation_id, properties::property_name))
                                                         .do_nothing()
                                                         .execute(tx)?;
    Ok(inserted)
}

/// Store Postgres de cálculos y propiedades.
pub struct PgResultStore<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgResultStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> ResultStore for PgResultStore<P> {
    fn upsert_calculation(&mut self, row: &Calculation) -> Result<UpsertOutcome, StoreError> {
        debug!("upsert_calculation:start id={} status={}", row.id, row.status);
        let outcome = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx| upsert_in_tx(tx, row))
        })?;
        debug!("upsert_calculation:done id={} outcome={:?}", row.id, outcome);
        Ok(outcome)
    }

    fn insert_properties(&mut self, calculation_id: &str, props: &[Property]) -> Result<usize, StoreError> {
        let inserted = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx| insert_properties_in_tx(tx, calculation_id, props))
        })?;
        debug!("insert_properties:done id={calculation_id} inserted={inserted}");
        Ok(inserted)
    }

    fn find_calculation(&self, id: &str) -> Result<Option<Calculation>, StoreError> {
        let row: Option<CalculationRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            calculations::table.find(id)
                               .get_result(&mut conn)
                               .optional()
                               .map_err(PersistenceError::from)
        })?;
        Ok(row.map(Calculation::try_from).transpose()?)
    }

    fn list_properties(&self, calculation_id: &str) -> Result<Vec<Property>, StoreError> {
        let rows: Vec<PropertyRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            properties::table.filter(properties::calculation_id.eq(calculation_id))
                             .order(properties::property_name.asc())
                             .load(&mut conn)
                             .map_err(PersistenceError::from)
        })?;
        rows.into_iter()
            .map(|r| Property::try_from(r).map_err(StoreError::from))
            .collect()
    }

    /// Fila y propiedades en una única transacción: no puede quedar un
    /// cálculo `COMPLETED` sin las propiedades devueltas.
    fn record_terminal(&mut self, row: &Calculation, props: &[Property]) -> Result<TerminalWrite, StoreError> {
        let write = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction().read_write().run(|tx| {
                                                     let upsert = upsert_in_tx(tx, row)?;
                                                     let properties_inserted = if should_insert_properties(row, upsert) && !props.is_empty() {
                                                         insert_properties_in_tx(tx, &row.id, props)?
                                                     } else {
                                                         0
                                                     };
                                                     Ok::<TerminalWrite, PersistenceError>(TerminalWrite { upsert,
                                                                                                           properties_inserted })
                                                 })
        })?;
        debug!("record_terminal:done id={} status={} outcome={:?} properties_inserted={}",
               row.id,
               row.status,
               write.upsert,
               write.properties_inserted);
        Ok(write)
    }
}

/// Store que no abre el pool hasta la primera operación.
///
/// Una pasada sin entradas en el ledger no toca nunca la base de datos, así
/// que tampoco necesita que esté configurada ni accesible.
pub struct LazyPgResultStore {
    config: Option<DbConfig>,
    inner: OnceCell<PgResultStore<PoolProvider>>,
}

impl LazyPgResultStore {
    /// Usa `config` al conectar.
    pub fn new(config: DbConfig) -> Self {
        Self { config: Some(config),
               inner: OnceCell::new() }
    }

    /// Lee `DbConfig::from_env` en el primer uso.
    pub fn from_env() -> Self {
        Self { config: None,
               inner: OnceCell::new() }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.get().is_some()
    }

    fn store(&self) -> Result<&PgResultStore<PoolProvider>, PersistenceError> {
        self.inner.get_or_try_init(|| {
                      let config = match &self.config {
                          Some(c) => c.clone(),
                          None => DbConfig::from_env()?,
                      };
                      info!("conectando store Postgres (max_connections={})", config.max_connections);
                      let pool = build_pool_from_config(&config)?;
                      Ok(PgResultStore::new(PoolProvider { pool }))
                  })
    }

    fn store_mut(&mut self) -> Result<&mut PgResultStore<PoolProvider>, PersistenceError> {
        self.store()?;
        self.inner
            .get_mut()
            .ok_or_else(|| PersistenceError::Unknown("store not initialized".into()))
    }
}

impl ResultStore for LazyPgResultStore {
    fn upsert_calculation(&mut self, row: &Calculation) -> Result<UpsertOutcome, StoreError> {
        self.store_mut()?.upsert_calculation(row)
    }

    fn insert_properties(&mut self, calculation_id: &str, props: &[Property]) -> Result<usize, StoreError> {
        self.store_mut()?.insert_properties(calculation_id, props)
    }

    fn find_calculation(&self, id: &str) -> Result<Option<Calculation>, StoreError> {
        self.store()?.find_calculation(id)
    }

    fn list_properties(&self, calculation_id: &str) -> Result<Vec<Property>, StoreError> {
        self.store()?.list_properties(calculation_id)
    }

    fn record_terminal(&mut self, row: &Calculation, props: &[Property]) -> Result<TerminalWrite, StoreError> {
        self.store_mut()?.record_terminal(row, props)
    }
}

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// Comportamiento:
/// - Valida y ajusta tamaños (si `min_size > max_size`, usa `min_size =
///   max_size`).
/// - No migra: el esquema se crea aparte con `migrate_pool`.
/// - Devuelve `PersistenceError::TransientIo` ante errores del pool/manager.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let mut cfg = DbConfig::new(database_url);
    cfg.min_connections = min_size;
    cfg.max_connections = max_size;
    build_pool_from_config(&cfg)
}

/// Como `build_pool`, respetando además `connection_timeout`.
pub fn build_pool_from_config(cfg: &DbConfig) -> Result<PgPool, PersistenceError> {
    let validated_min = if cfg.min_connections == 0 { 1 } else { cfg.min_connections };
    let validated_max = if cfg.max_connections == 0 { 1 } else { cfg.max_connections };
    if validated_min > validated_max {
        warn!("min_size > max_size ({} > {}), ajustando min=max", validated_min, validated_max);
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(cfg.url.as_str());
    r2d2::Pool::builder().min_idle(Some(final_min))
                         .max_size(validated_max)
                         .connection_timeout(cfg.connection_timeout)
                         .build(manager)
                         .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))
}

/// Ejecuta las migraciones pendientes con una conexión del pool.
pub fn migrate_pool(pool: &PgPool) -> Result<(), PersistenceError> {
    let mut conn = pool.get()
                       .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
    run_pending_migrations(&mut conn)
}

/// Helper: carga `.env`, lee configuración y construye un pool (sin migrar).
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = DbConfig::from_env()?;
    build_pool_from_config(&cfg)
}
