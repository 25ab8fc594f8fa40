//! Adhyaay - a terminal client for booking mentorship and counseling sessions.
//!
//! Sign in or register, browse mentors, and request appointments against the
//! Adhyaay backend. The session token is kept between runs.

mod app;
mod pages;
mod terminal;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use adhyaay_core::config::API_URL_ENV;
use adhyaay_core::forms::{LoginForm, RegisterForm};
use adhyaay_core::Config;

use app::App;
use terminal::{prompt_line, prompt_password, TerminalNotifier};

#[derive(Parser, Debug)]
#[command(name = "adhyaay", version, about = "Book mentorship and counseling sessions")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the navbar and whether you are signed in
    Status,
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// List mentors available for booking
    Mentors,
    /// Request an appointment with a mentor
    Book {
        #[arg(long)]
        semester: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Mentor id, or its number in the mentor list
        #[arg(long)]
        mentor: Option<String>,
        /// Day of the session, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    /// Follow a navbar item (Home, About, Teams, Services, Contact)
    Nav { item: String },
    /// Open a page by path, e.g. /adhyaay/councellors
    Open { path: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .context("Log file path has no file name")?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file.as_deref())?;
    info!("Adhyaay client starting");

    let config = Config::load()?;
    let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_base_url());
    let mut app = App::new(config, &api_url, Box::new(TerminalNotifier))?;

    match cli.command {
        Command::Status => {
            app.print_navbar();
            println!("{}", app.session_summary());
        }
        Command::Login { email } => {
            let default_email = email.or_else(|| app.last_email().map(str::to_string));
            let form = LoginForm {
                email: prompt_line("Email", default_email.as_deref())?,
                password: prompt_password("Password")?,
            };
            app.login(&form).await?;
            pages::render_route(app.router().current_route());
        }
        Command::Register { name, email } => {
            let form = RegisterForm {
                name: match name {
                    Some(name) => name,
                    None => prompt_line("Name", None)?,
                },
                email: match email {
                    Some(email) => email,
                    None => prompt_line("Email", None)?,
                },
                password: prompt_password("Password")?,
            };
            app.register(&form).await?;
            pages::render_route(app.router().current_route());
        }
        Command::Logout => {
            app.logout();
            pages::render_route(app.router().current_route());
        }
        Command::Mentors => {
            let mentors = app.load_mentors().await;
            pages::render_mentors(&mentors);
        }
        Command::Book {
            semester,
            description,
            mentor,
            date,
        } => {
            let (mut form, mentors) = app.prepare_booking().await;
            println!("Name:  {}", form.junior_name);
            println!("Email: {}", form.junior_email);

            form.semester = semester.map_or_else(|| prompt_line("Semester", None), Ok)?;
            form.description =
                description.map_or_else(|| prompt_line("Describe your issue", None), Ok)?;

            let choice = match mentor {
                Some(mentor) => mentor,
                None => {
                    pages::render_mentors(&mentors);
                    prompt_line("Mentor", None)?
                }
            };
            form.mentor = resolve_mentor(&choice, &mentors);
            form.date = date.map_or_else(|| prompt_line("Date (YYYY-MM-DD)", None), Ok)?;

            app.book(&mut form).await?;
        }
        Command::Nav { item } => app.select_nav(&item).await?,
        Command::Open { path } => app.open(&path),
    }

    info!("Adhyaay client exiting");
    Ok(())
}

/// Accept a 1-based list position or a mentor id.
fn resolve_mentor(choice: &str, mentors: &[adhyaay_core::models::Mentor]) -> String {
    choice
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| mentors.get(index))
        .map(|mentor| mentor.id.clone())
        .unwrap_or_else(|| choice.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adhyaay_core::models::Mentor;

    fn mentors() -> Vec<Mentor> {
        vec![
            Mentor {
                id: "66f0a1".to_string(),
                name: "Ravi".to_string(),
                email: "ravi@example.com".to_string(),
            },
            Mentor {
                id: "66f0a2".to_string(),
                name: "Meera".to_string(),
                email: "meera@example.com".to_string(),
            },
        ]
    }

    #[test]
    fn test_resolve_mentor_by_position() {
        assert_eq!(resolve_mentor("2", &mentors()), "66f0a2");
        assert_eq!(resolve_mentor(" 1 ", &mentors()), "66f0a1");
    }

    #[test]
    fn test_resolve_mentor_by_id_or_out_of_range() {
        assert_eq!(resolve_mentor("66f0a1", &mentors()), "66f0a1");
        assert_eq!(resolve_mentor("0", &mentors()), "0");
        assert_eq!(resolve_mentor("9", &mentors()), "9");
        assert_eq!(resolve_mentor("", &mentors()), "");
    }

    #[test]
    fn test_cli_parses_book_flags() {
        let cli = Cli::try_parse_from([
            "adhyaay", "book", "--semester", "3", "--mentor", "1", "--date", "2025-03-14",
        ])
        .expect("valid arguments");
        assert!(matches!(
            cli.command,
            Command::Book { ref semester, ref date, .. }
                if semester.as_deref() == Some("3") && date.as_deref() == Some("2025-03-14")
        ));
    }
}
