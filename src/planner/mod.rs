//! The planner.

pub use order::{check_order, visiting_order};

mod order;
