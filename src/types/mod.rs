//! Type definitions for timesheet-rollup

mod calendar;
mod error;
mod label;
mod record;
mod rollup;

pub use calendar::*;
pub use error::*;
pub use label::*;
pub use record::*;
pub use rollup::*;
