//! REST API client module for the booking backend.
//!
//! This module provides the `ApiClient` for signing in, registering, and
//! booking sessions with mentors. Authenticated calls carry the session
//! token as a bearer credential.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{server_message, ApiError, ServerReply};
