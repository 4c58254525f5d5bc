//! API routes served beside the gateway.

pub mod store;
