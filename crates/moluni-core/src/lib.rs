//! moluni-core: ledger de jobs, contrato del store y reconciliador.
pub mod archive;
pub mod errors;
mod fsio;
pub mod ledger;
pub mod reconcile;
pub mod remote;
pub mod store;
pub mod submit;

pub use archive::ResultArchive;
pub use errors::{CoreError, LedgerError, QueryError, StoreError};
pub use ledger::{InMemoryLedger, JsonFileLedger, Ledger};
pub use reconcile::{classify, EntryOutcome, PassOptions, PassReport, Reconciler};
pub use remote::{JobStatusSource, JobSubmitter, RemoteReport, RemoteStatus, ScriptedStatusSource};
pub use store::{InMemoryResultStore, ResultStore, TerminalWrite, UpsertOutcome};
pub use submit::{prepare_payload, record_submission, submit_and_record, SubmissionRequest, SubmitError};
