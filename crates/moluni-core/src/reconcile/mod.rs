//! Reconciliador: lleva cada entrada no terminal del ledger hacia un estado
//! terminal registrado en el store.
//!
//! Una pasada:
//! 1. Carga el ledger (vacío => no-op exitoso; corrupto => aborta).
//! 2. Consulta la fuente remota por cada entrada (en paralelo si
//!    `PassOptions::parallel_queries`), con aislamiento por entrada.
//! 3. Clasifica cada respuesta en un `EntryOutcome`.
//! 4. Registra los resultados terminales en el store (fila + propiedades).
//! 5. Reescribe el ledger completo con las entradas supervivientes.
//!
//! La escritura en el store de una entrada siempre precede a su salida del
//! ledger. Si el store falla la pasada aborta antes de reescribir el ledger;
//! la siguiente pasada repite las escrituras terminales, que son idempotentes.

mod outcome;
mod report;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use moluni_domain::LedgerEntry;
use rayon::prelude::*;
use uuid::Uuid;

use crate::archive::ResultArchive;
use crate::errors::{CoreError, QueryError};
use crate::ledger::Ledger;
use crate::remote::{JobStatusSource, RemoteReport};
use crate::store::{ResultStore, UpsertOutcome};

pub use outcome::{classify, EntryOutcome};
pub use report::PassReport;

/// Opciones de una pasada.
#[derive(Debug, Clone, Default)]
pub struct PassOptions {
    /// Consulta las entradas en paralelo (rayon). Las escrituras siguen
    /// siendo secuenciales.
    pub parallel_queries: bool,
    /// Directorio donde archivar el documento remoto de cada resultado
    /// terminal.
    pub archive: Option<ResultArchive>,
}

/// Motor de reconciliación sobre una fuente remota.
///
/// El ledger y el store se reciben explícitamente en cada pasada; el
/// reconciliador no guarda estado entre pasadas.
pub struct Reconciler<S: JobStatusSource> {
    source: S,
    options: PassOptions,
}

impl<S: JobStatusSource> Reconciler<S> {
    pub fn new(source: S) -> Self {
        Self { source,
               options: PassOptions::default() }
    }

    pub fn with_options(mut self, options: PassOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ejecuta una pasada completa usando el reloj del sistema.
    pub fn run_pass<L: Ledger, R: ResultStore>(&self, ledger: &mut L, store: &mut R) -> Result<PassReport, CoreError> {
        self.run_pass_at(ledger, store, Utc::now())
    }

    /// Ejecuta una pasada con `now` como instante de completado.
    pub fn run_pass_at<L: Ledger, R: ResultStore>(&self, ledger: &mut L, store: &mut R, now: DateTime<Utc>) -> Result<PassReport, CoreError> {
        let pass_id = Uuid::new_v4();
        let mut report = PassReport::new(pass_id, now);

        let snapshot = ledger.load().map_err(|e| {
                                         error!("reconcile:abort pass_id={pass_id} ledger load failed: {e}");
                                         e
                                     })?;
        if snapshot.is_empty() {
            info!("reconcile:noop pass_id={pass_id} ledger empty");
            return Ok(report);
        }
        info!("reconcile:start pass_id={pass_id} entries={} parallel={}",
              snapshot.len(),
              self.options.parallel_queries);

        let responses = self.poll(&snapshot);
        let outcomes: Vec<EntryOutcome> = snapshot.iter().zip(responses).map(|(entry, response)| classify(entry, response, now)).collect();

        let mut survivors: Vec<LedgerEntry> = Vec::with_capacity(snapshot.len());
        for outcome in &outcomes {
            let job_id = outcome.job_id();
            match outcome {
                EntryOutcome::Pending { entry, changed } => {
                    if *changed {
                        debug!("reconcile:pending pass_id={pass_id} job_id={job_id} status -> {}", entry.status);
                    }
                    report.still_pending += 1;
                }
                EntryOutcome::Retry { error, .. } => {
                    warn!("reconcile:retry pass_id={pass_id} job_id={job_id} transient error: {error}");
                    report.still_pending += 1;
                    report.transient_errors += 1;
                }
                EntryOutcome::Terminal { calculation,
                                         properties,
                                         raw,
                                         .. } => {
                    if let (Some(archive), Some(raw)) = (&self.options.archive, raw) {
                        if let Err(e) = archive.store(job_id, raw) {
                            warn!("reconcile:archive pass_id={pass_id} job_id={job_id} failed: {e}");
                        }
                    }
                    let write = store.record_terminal(calculation, properties).map_err(|e| {
                                                                                   error!("reconcile:abort pass_id={pass_id} job_id={job_id} store write failed: {e}");
                                                                                   e
                                                                               })?;
                    if let UpsertOutcome::AlreadyTerminal(existing) = write.upsert {
                        if existing != calculation.status {
                            warn!("reconcile:conflict pass_id={pass_id} job_id={job_id} store={} remote={} (kept store)",
                                  existing,
                                  calculation.status);
                        }
                    }
                    info!("reconcile:terminal pass_id={pass_id} job_id={job_id} status={} properties_inserted={}",
                          calculation.status,
                          write.properties_inserted);
                    report.tally_terminal(calculation.status, write.upsert);
                }
            }
            if let Some(entry) = outcome.surviving_entry() {
                survivors.push(entry.clone());
            }
        }

        if survivors == snapshot {
            debug!("reconcile:ledger unchanged pass_id={pass_id}");
        } else {
            ledger.replace(&survivors).map_err(|e| {
                                          error!("reconcile:abort pass_id={pass_id} ledger replace failed: {e}");
                                          e
                                      })?;
        }
        info!("reconcile:done {report}");
        Ok(report)
    }

    fn poll(&self, entries: &[LedgerEntry]) -> Vec<Result<RemoteReport, QueryError>> {
        if self.options.parallel_queries {
            entries.par_iter().map(|e| self.source.query(&e.id)).collect()
        } else {
            entries.iter().map(|e| self.source.query(&e.id)).collect()
        }
    }
}
