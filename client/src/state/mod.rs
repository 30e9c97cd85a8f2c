//! Client-side application state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` holds the signed-in user and credentials; `router` guards
//! navigation on top of it.

pub mod router;
pub mod session;
