pub mod migrate;
pub mod pending;
pub mod reconcile;
pub mod submit;
