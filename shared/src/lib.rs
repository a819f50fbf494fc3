//! Shared types for Comanda
//!
//! Vendor wire types used by the POS client: the `{sucesso, erro}` response
//! envelope, catalog models, device settings and the order payload.

pub mod models;
pub mod order;
pub mod response;
pub mod util;

// Re-exports
pub use models::{
    AddOnGroup, AddOnOption, Credentials, DeviceRole, DeviceSettings, Product, ProductImage,
    ProductKind, TableLabel,
};
pub use order::{LineKind, OrderCustomer, OrderHeader, OrderLine, OrderRequest};
pub use response::Envelope;
pub use rust_decimal::Decimal;
