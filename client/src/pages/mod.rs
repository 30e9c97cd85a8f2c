//! Screen-level flows that carry logic.
//!
//! ARCHITECTURE
//! ============
//! Each module owns one screen's validation and orchestration and delegates
//! network calls to `net::client::ApiClient`. Rendering is left to whatever
//! surface drives them (the `labtrack` CLI today).

pub mod dashboard;
pub mod login;
pub mod sample_form;
