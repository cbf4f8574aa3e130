//! HTTP bindings, one module per route.

pub mod deregister;
pub mod public_key;
pub mod push;
pub mod register;
pub mod version;
