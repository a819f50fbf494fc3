//! Data models
//!
//! Catalog snapshots fetched from the vendor backend, tenant credentials and
//! the locally persisted device settings.

pub mod addon;
pub mod credentials;
pub mod device;
pub mod product;

// Re-exports
pub use addon::*;
pub use credentials::*;
pub use device::*;
pub use product::*;
