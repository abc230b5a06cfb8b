//! Report aggregation engine for employee time tracking.
//!
//! Raw work reports flow one way through four pure stages:
//! [`services::normalizer`] → [`services::bucketer`] →
//! [`services::aggregator`] → [`services::classifier`].
//! [`services::rollup`] runs the whole pipeline.

pub mod services;
pub mod types;
