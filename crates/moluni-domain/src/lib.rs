// moluni-domain library entry point
pub mod calculation;
pub mod error;
pub mod ledger_entry;
pub mod property;
pub mod status;

pub use calculation::{Calculation, CalculationType};
pub use error::DomainError;
pub use ledger_entry::LedgerEntry;
pub use property::{Property, PropertyValue};
pub use status::CalculationStatus;
