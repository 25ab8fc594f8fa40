//! Terminal input and output: notices, prompts and the navbar line.

use std::io::{self, Write};

use anyhow::{Context, Result};
use crossterm::style::Stylize;

use adhyaay_core::forms::ValidationErrors;
use adhyaay_core::nav::{AuthAction, Navbar};
use adhyaay_core::{NoticeKind, Notifier};

/// Prints notices to stderr, green for success and red for errors.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => eprintln!("{} {}", "✔".green().bold(), message.green()),
            NoticeKind::Error => eprintln!("{} {}", "✖".red().bold(), message.red()),
        }
    }
}

/// Read one line from stdin, falling back to `default` on empty input.
pub fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) if !d.is_empty() => print!("{} [{}]: ", label, d),
        _ => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .with_context(|| format!("Failed to read {}", label.to_lowercase()))?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}

pub fn prompt_password(label: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}: ", label)).context("Failed to read password")
}

pub fn print_validation_errors(errors: &ValidationErrors) {
    for error in &errors.errors {
        eprintln!("  {} {}", format!("{}:", error.field).dim(), error.message.red());
    }
}

pub fn print_navbar(navbar: &Navbar, is_authenticated: bool) {
    let items: Vec<&str> = navbar.items().iter().map(|item| item.name).collect();
    let actions: Vec<String> = Navbar::auth_actions(is_authenticated)
        .iter()
        .map(|action| match action {
            AuthAction::Logout => action.label().red().to_string(),
            AuthAction::SignIn | AuthAction::SignUp => action.label().yellow().to_string(),
        })
        .collect();

    println!(
        "{}  {}  {}",
        "ADHYAAY".bold(),
        items.join("  "),
        actions.join(" ")
    );
}
