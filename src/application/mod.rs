// Application layer - the caller-facing surface of the ledger core.
// Presentation code (forms, tables, dashboards) talks to LedgerService and
// nothing below it.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
