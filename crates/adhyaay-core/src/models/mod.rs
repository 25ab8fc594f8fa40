//! Data models for the booking backend.
//!
//! This module contains request and response types exchanged with the REST
//! API:
//! - `user`: login/registration payloads and the current user's profile
//! - `mentor`: mentors available for booking
//! - `appointment`: appointment requests

pub mod appointment;
pub mod mentor;
pub mod user;

pub use appointment::AppointmentRequest;
pub use mentor::Mentor;
pub use user::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
