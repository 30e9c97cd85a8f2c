//! LabTrack client core.
//!
//! ARCHITECTURE
//! ============
//! - `net`: the authenticated request client. A middleware pipeline over a
//!   swappable transport attaches bearer tokens and recovers once from an
//!   expired access token. Typed API groups sit on top.
//! - `state`: the session store and the route guard / navigator.
//! - `pages`: screen flows with logic of their own (login, sample form,
//!   dashboard summary).
//! - `storage`: the key-value persistence port shared by tokens and the
//!   session record.
//! - `app`: wires all of the above for one process.

pub mod app;
pub mod config;
pub mod error;
pub mod net;
pub mod pages;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_helpers;

pub use app::AppContext;
pub use config::ClientConfig;
pub use error::{ApiError, ValidationError};
pub use net::client::ApiClient;
pub use state::session::{Session, SessionStore};
