//! Order wire types and money rounding

pub mod money;
pub mod types;

pub use types::*;
