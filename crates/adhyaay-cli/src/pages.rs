//! Plain-text renderings of the site's pages and home page sections.

use crossterm::style::Stylize;

use adhyaay_core::models::Mentor;
use adhyaay_core::Route;

/// Body text for a home page section, by anchor id.
pub fn section(anchor: &str) -> Option<&'static str> {
    match anchor {
        "aboutus" => Some(
            "About us\n\
             Adhyaay connects juniors with seniors and trained councellors for\n\
             guidance on academics, careers and wellbeing.",
        ),
        "teams" => Some(
            "Teams\n\
             Management, councellors and mentors work together to keep every\n\
             session confidential and useful.",
        ),
        "footer" => Some(
            "Contact\n\
             Reach the team through the booking form or at the student\n\
             wellness centre.",
        ),
        _ => None,
    }
}

pub fn render_route(route: Route) {
    println!("{}", route.title().bold());
    match route {
        Route::Home => {
            for anchor in ["aboutus", "teams", "footer"] {
                if let Some(text) = section(anchor) {
                    println!("\n{}", text);
                }
            }
        }
        Route::Councellors => {
            println!("Uncover your true potential with expert support.");
            println!(
                "Book your session: {}",
                Route::Book.path().underlined()
            );
        }
        Route::Login => println!("Run `adhyaay login` to sign in."),
        Route::Register => println!("Run `adhyaay register` to create an account."),
        Route::Book => println!("Run `adhyaay book` to request an appointment."),
        Route::Mentors => println!("Run `adhyaay mentors` to list mentors."),
        Route::ManagementTeam => println!("The people who run Adhyaay."),
        Route::NotFound => println!("Nothing lives at this address."),
    }
}

pub fn render_section(anchor: &str) {
    match section(anchor) {
        Some(text) => println!("{}", text),
        None => println!("No section named '{}'", anchor),
    }
}

pub fn render_mentors(mentors: &[Mentor]) {
    if mentors.is_empty() {
        println!("No mentors available.");
        return;
    }
    for (index, mentor) in mentors.iter().enumerate() {
        println!(
            "{:>2}. {} {}",
            index + 1,
            mentor.name.as_str().bold(),
            format!("<{}>", mentor.email).dim()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navbar_anchors_have_sections() {
        use adhyaay_core::nav::{NavTarget, NAV_ITEMS};

        for item in NAV_ITEMS {
            if let NavTarget::Anchor(anchor) = item.target {
                assert!(section(anchor).is_some(), "missing section for {}", anchor);
            }
        }
        assert_eq!(section("pricing"), None);
    }
}
