//! Entity type definitions

pub mod case;

pub use case::{CostSavingsCase, NewCase};
