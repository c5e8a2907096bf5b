//! # Models
//!
//! The status record read back from each target and the receipt of a probe write.

pub mod receipt;
pub mod status;

pub use receipt::{truncate_to_micros, ReceiptClock, WriteReceipt};
pub use status::{format_status, StatusRecord};
