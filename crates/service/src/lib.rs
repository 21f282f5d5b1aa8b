//! Service layer providing the banking domain on top of file-backed storage.
//! - Separates business logic from the HTTP surface.
//! - Keeps persistence behind a storage trait so handlers stay testable.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod ledger;
pub mod runtime;
pub mod storage;
