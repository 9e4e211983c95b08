//! Math tools module.
//!
//! - `sum`: add two numbers
//!
//! Each tool has handlers for both HTTP and STDIO transports.

pub mod common;
pub mod sum;

pub use sum::{SumTwoNumbersOutput, SumTwoNumbersParams, SumTwoNumbersTool};
