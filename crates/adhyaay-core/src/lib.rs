//! Core library for the Adhyaay booking client.
//!
//! The heart of the crate is [`auth::AuthStateController`], which derives the
//! authenticated flag from a persisted bearer token and keeps the two in
//! sync. Around it sit the REST client, the form validators, the routing
//! model and the configuration.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod forms;
pub mod models;
pub mod nav;
pub mod notify;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use auth::{AuthError, AuthStateController, TokenStatus, TokenStore};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use nav::{Navigator, Route, Router};
pub use notify::{NoticeKind, Notifier};
