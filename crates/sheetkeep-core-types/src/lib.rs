//! Types shared by the SheetKeep error and logging facilities
//!
//! - **Correlation**: `RequestId` attached to every API request
//! - **Sensitive data**: `Sensitive<T>` for automatic redaction
//! - **Schema constants**: canonical structured-logging field keys

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{RequestId, REQUEST_ID_HEADER};
pub use sensitive::Sensitive;
