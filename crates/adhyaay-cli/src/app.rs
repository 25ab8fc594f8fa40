//! Application state for the Adhyaay terminal client.
//!
//! `App` owns the auth controller and hands it to the login, register,
//! logout and booking flows. The controller is initialized in `App::new`,
//! before anything that depends on the authenticated flag is printed.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::DateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use adhyaay_core::api::{server_message, ApiClient, ApiError};
use adhyaay_core::forms::{BookingForm, LoginForm, RegisterForm};
use adhyaay_core::models::{Mentor, UserProfile};
use adhyaay_core::nav::{Navbar, HOME_PATH};
use adhyaay_core::{
    AuthStateController, Config, Navigator, NoticeKind, Notifier, Router, SystemClock, TokenStatus,
    TokenStore,
};

use crate::pages;
use crate::terminal;

const LOGIN_SUCCESS_MESSAGE: &str = "Login successful!";
const LOGIN_FAILURE_MESSAGE: &str = "Login failed. Please try again.";
const REGISTER_SUCCESS_MESSAGE: &str = "Registration successful!";
const REGISTER_FAILURE_MESSAGE: &str = "Registration failed. Please try again.";
const BOOKING_SUCCESS_MESSAGE: &str = "Appointment booked successfully!";
const BOOKING_FAILURE_MESSAGE: &str = "Error booking appointment. Please try again.";
const MENTORS_FAILURE_MESSAGE: &str = "Failed to load mentors. Try again later.";

pub struct App {
    config: Config,
    config_path: PathBuf,
    api: ApiClient,
    auth: AuthStateController<Box<dyn TokenStore>, SystemClock>,
    auth_changes: watch::Receiver<bool>,
    session_status: TokenStatus,
    router: Router,
    navbar: Navbar,
    notifier: Box<dyn Notifier>,
}

impl App {
    pub fn new(config: Config, api_base_url: &str, notifier: Box<dyn Notifier>) -> Result<Self> {
        let store = config.open_token_store()?;
        let api = ApiClient::new(api_base_url)?;
        Ok(Self::with_parts(config, Config::config_path()?, api, store, notifier))
    }

    pub fn with_parts(
        config: Config,
        config_path: PathBuf,
        mut api: ApiClient,
        store: Box<dyn TokenStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let mut auth = AuthStateController::new(store, SystemClock)
            .with_malformed_policy(config.malformed_token_policy());
        let session_status = auth.initialize();
        debug!(?session_status, "Session initialized");

        if let Some(token) = auth.token() {
            api.set_token(token);
        }
        let auth_changes = auth.subscribe();

        Self {
            config,
            config_path,
            api,
            auth,
            auth_changes,
            session_status,
            router: Router::default(),
            navbar: Navbar::default(),
            notifier,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn print_navbar(&self) {
        terminal::print_navbar(&self.navbar, self.is_authenticated());
    }

    /// Reprint the navbar if the auth flag changed since the last look.
    fn refresh_navbar(&mut self) {
        if self.auth_changes.has_changed().unwrap_or(false) {
            let authenticated = *self.auth_changes.borrow_and_update();
            debug!(authenticated, "Auth flag changed, redrawing navbar");
            self.print_navbar();
        }
    }

    /// Describe the session as found at start.
    pub fn session_summary(&self) -> String {
        match &self.session_status {
            TokenStatus::Valid { expires_at_ms } => match DateTime::from_timestamp_millis(*expires_at_ms) {
                Some(expires_at) => format!(
                    "Signed in until {}",
                    expires_at.format("%Y-%m-%d %H:%M UTC")
                ),
                None => "Signed in".to_string(),
            },
            TokenStatus::Expired { .. } => "Signed out (session expired)".to_string(),
            TokenStatus::Malformed { .. } => "Signed out (stored session was unreadable)".to_string(),
            TokenStatus::Unavailable { .. } => "Signed out (session storage unavailable)".to_string(),
            TokenStatus::Absent => "Signed out".to_string(),
        }
    }

    pub fn last_email(&self) -> Option<&str> {
        self.config.last_email.as_deref()
    }

    fn remember_email(&mut self, email: &str) {
        self.config.last_email = Some(email.to_string());
        if let Err(e) = self.config.save_to(&self.config_path) {
            warn!(error = %e, "Failed to save config");
        }
    }

    // ===== Auth flows =====

    pub async fn login(&mut self, form: &LoginForm) -> Result<()> {
        let request = form.validate().inspect_err(terminal::print_validation_errors)?;

        let outcome = match self.api.login(&request).await {
            Ok(response) => response
                .token
                .ok_or_else(|| anyhow!(ApiError::InvalidResponse("login response carried no token".to_string())))
                .and_then(|token| {
                    self.auth.login(&token)?;
                    Ok(token)
                }),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(token) => {
                self.api.set_token(token);
                self.remember_email(&request.email);
                info!(email = %request.email, "Login succeeded");
                self.notifier.notify(NoticeKind::Success, LOGIN_SUCCESS_MESSAGE);
                self.router.redirect_to(HOME_PATH);
                self.refresh_navbar();
                Ok(())
            }
            Err(e) => {
                let shown = server_message(&e).unwrap_or("Login failed").to_string();
                warn!(error = %e, "Login failed");
                self.notifier.notify(NoticeKind::Error, LOGIN_FAILURE_MESSAGE);
                Err(e.context(shown))
            }
        }
    }

    pub async fn register(&mut self, form: &RegisterForm) -> Result<()> {
        let request = form.validate().inspect_err(terminal::print_validation_errors)?;

        match self.api.signup(&request).await {
            Ok(response) => {
                if let Some(token) = response.token {
                    match self.auth.login(&token) {
                        Ok(()) => self.api.set_token(token),
                        Err(e) => warn!(error = %e, "Signup token rejected, sign in to continue"),
                    }
                }
                self.remember_email(&request.email);
                info!(email = %request.email, "Registration succeeded");
                self.notifier.notify(NoticeKind::Success, REGISTER_SUCCESS_MESSAGE);
                self.router.redirect_to(HOME_PATH);
                self.refresh_navbar();
                Ok(())
            }
            Err(e) => {
                let shown = server_message(&e).unwrap_or("Registration failed").to_string();
                warn!(error = %e, "Registration failed");
                self.notifier.notify(NoticeKind::Error, REGISTER_FAILURE_MESSAGE);
                Err(e.context(shown))
            }
        }
    }

    pub fn logout(&mut self) {
        self.auth.logout(&mut self.router, self.notifier.as_ref());
        self.api.clear_token();
        self.refresh_navbar();
    }

    // ===== Booking =====

    async fn fetch_profile(&self) -> Option<UserProfile> {
        if !self.is_authenticated() {
            return None;
        }
        match self.api.me().await {
            Ok(profile) => Some(profile),
            Err(e) => {
                debug!(error = %e, "Could not load profile");
                None
            }
        }
    }

    pub async fn load_mentors(&self) -> Vec<Mentor> {
        match self.api.mentors().await {
            Ok(mentors) => mentors,
            Err(e) => {
                warn!(error = %e, "Failed to load mentors");
                self.notifier.notify(NoticeKind::Error, MENTORS_FAILURE_MESSAGE);
                Vec::new()
            }
        }
    }

    /// Profile and mentor list, fetched together.
    pub async fn prepare_booking(&self) -> (BookingForm, Vec<Mentor>) {
        let (profile, mentors) = futures::join!(self.fetch_profile(), self.load_mentors());

        let mut form = BookingForm::default();
        if let Some(profile) = profile {
            form.prefill(&profile);
        }
        (form, mentors)
    }

    /// Submit the form. It is cleared after a successful booking.
    pub async fn book(&mut self, form: &mut BookingForm) -> Result<()> {
        let request = match form.validate() {
            Ok(request) => request,
            Err(e) => {
                self.notifier.notify(NoticeKind::Error, &e.to_string());
                return Err(e.into());
            }
        };

        match self.api.book(&request).await {
            Ok(()) => {
                info!(mentor = %request.mentor, date = %request.date, "Appointment booked");
                self.notifier.notify(NoticeKind::Success, BOOKING_SUCCESS_MESSAGE);
                form.reset();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Booking failed");
                self.notifier.notify(NoticeKind::Error, BOOKING_FAILURE_MESSAGE);
                Err(e)
            }
        }
    }

    // ===== Navigation =====

    /// Follow a navbar item by name and show where it leads.
    pub async fn select_nav(&mut self, name: &str) -> Result<()> {
        let item = self
            .navbar
            .find(name)
            .ok_or_else(|| anyhow!("Unknown navbar item '{}'", name))?;

        match self.navbar.select(item, &mut self.router) {
            Some(plan) => {
                if let Some(delay) = plan.delay {
                    pages::render_route(self.router.current_route());
                    tokio::time::sleep(delay).await;
                }
                pages::render_section(&plan.anchor);
            }
            None => pages::render_route(self.router.current_route()),
        }
        Ok(())
    }

    pub fn open(&mut self, path: &str) {
        self.router.redirect_to(path);
        pages::render_route(self.router.current_route());
    }
}
