//! Add-on normalization and lookup
//!
//! Deployments deliver add-on groups in several shapes: already canonical,
//! raw vendor records, wrapped in an envelope, or embedded in a product
//! record. [`normalize`] folds all of them into `Vec<AddOnGroup>`;
//! [`AddOnResolver`] finds the payload in the first place.

mod normalize;
mod resolver;

pub use normalize::{AddOnPayload, normalize};
pub use resolver::AddOnResolver;
