//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `AuthStateController`: owns the authenticated flag and keeps it in step
//!   with the persisted bearer token
//! - `TokenStore`: persisted key/value storage for the token, backed by a
//!   JSON file or the OS keychain
//! - Claim decoding for JWT-shaped tokens, used to check expiry locally
//!
//! The flag is a point-in-time snapshot. It is computed once at start and
//! then changes only on explicit login/logout.

pub mod controller;
pub mod credentials;
pub mod error;
pub mod store;
pub mod token;

pub use controller::{AuthStateController, MalformedTokenPolicy, ROOT_PATH, TOKEN_KEY};
pub use credentials::KeyringTokenStore;
pub use error::{AuthError, StoreError};
pub use store::{FileTokenStore, TokenStore};
pub use token::{decode_claims, Claims, TokenStatus};
