//! Networking: the authenticated request client and its parts.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the send primitive, `middleware` the chain around it,
//! `auth_layer` the credential policy, `client` the shared handle, `api` the
//! typed call groups, and `types` the wire schema.

pub mod api;
pub mod auth_layer;
pub mod client;
pub mod middleware;
pub mod tokens;
pub mod transport;
pub mod types;
