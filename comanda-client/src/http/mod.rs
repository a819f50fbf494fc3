//! Vendor RPC transport
//!
//! One POST endpoint, header-routed actions, `{sucesso, erro}` envelope.

pub mod action;
pub mod client;
pub mod shaping;

pub use action::Action;
pub use client::{EnvelopeClient, EnvelopeTransport, RpcRequest};
