//! Routing table and navbar model.
//!
//! Pages live under the `/adhyaay/` base path. The navbar mixes plain route
//! links with in-page anchors on the home page; selecting an anchor from
//! another page navigates home first and scrolls once the page is shown.

use std::time::Duration;

use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// Base path all pages are mounted under.
pub const BASE_PATH: &str = "/adhyaay";

/// Path of the home page.
pub const HOME_PATH: &str = "/adhyaay/";

/// Height of the fixed navbar in pixels. Anchors scroll to just below it.
pub const NAVBAR_HEIGHT: f64 = 64.0;

/// Delay before scrolling to an anchor after a page change, so the target
/// section exists when the scroll happens.
pub const SCROLL_AFTER_NAVIGATE_DELAY: Duration = Duration::from_millis(200);

/// Redirect target for navigation side effects (logout, guards).
pub trait Navigator {
    fn redirect_to(&mut self, path: &str);
}

// ============================================================================
// Routes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Register,
    Login,
    ManagementTeam,
    Councellors,
    Mentors,
    Book,
    NotFound,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Register,
        Route::Login,
        Route::ManagementTeam,
        Route::Councellors,
        Route::Mentors,
        Route::Book,
    ];

    /// Resolve a path to a route. The application root `/` is home.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "" | BASE_PATH => Route::Home,
            "/adhyaay/register" => Route::Register,
            "/adhyaay/login" => Route::Login,
            "/adhyaay/management-team" => Route::ManagementTeam,
            "/adhyaay/councellors" => Route::Councellors,
            "/adhyaay/mentors" => Route::Mentors,
            "/adhyaay/book" => Route::Book,
            _ => Route::NotFound,
        }
    }

    /// Canonical path for this route.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home | Route::NotFound => HOME_PATH,
            Route::Register => "/adhyaay/register",
            Route::Login => "/adhyaay/login",
            Route::ManagementTeam => "/adhyaay/management-team",
            Route::Councellors => "/adhyaay/councellors",
            Route::Mentors => "/adhyaay/mentors",
            Route::Book => "/adhyaay/book",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Register => "Register",
            Route::Login => "Login",
            Route::ManagementTeam => "Management Team",
            Route::Councellors => "Councellors",
            Route::Mentors => "Mentors",
            Route::Book => "Book a Session",
            Route::NotFound => "Not Found",
        }
    }
}

/// Tracks the current location and every redirect made.
#[derive(Debug, Clone)]
pub struct Router {
    current: String,
    history: Vec<String>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(HOME_PATH)
    }
}

impl Router {
    pub fn new(initial_path: &str) -> Self {
        Self {
            current: initial_path.to_string(),
            history: Vec::new(),
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current
    }

    pub fn current_route(&self) -> Route {
        Route::from_path(&self.current)
    }

    /// Paths navigated to since creation, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Navigator for Router {
    fn redirect_to(&mut self, path: &str) {
        debug!(from = %self.current, to = path, "Navigate");
        self.current = path.to_string();
        self.history.push(path.to_string());
    }
}

// ============================================================================
// Navbar
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    /// A page path.
    Route(&'static str),
    /// The id of a section on the home page.
    Anchor(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub name: &'static str,
    pub target: NavTarget,
}

pub const NAV_ITEMS: [NavItem; 5] = [
    NavItem {
        name: "Home",
        target: NavTarget::Route(HOME_PATH),
    },
    NavItem {
        name: "About",
        target: NavTarget::Anchor("aboutus"),
    },
    NavItem {
        name: "Teams",
        target: NavTarget::Anchor("teams"),
    },
    NavItem {
        name: "Services",
        target: NavTarget::Route("/adhyaay/councellors"),
    },
    NavItem {
        name: "Contact",
        target: NavTarget::Anchor("footer"),
    },
];

/// Auth buttons shown at the end of the navbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Logout,
    SignIn,
    SignUp,
}

impl AuthAction {
    pub fn label(&self) -> &'static str {
        match self {
            AuthAction::Logout => "Logout",
            AuthAction::SignIn => "Sign In",
            AuthAction::SignUp => "Sign Up",
        }
    }

    /// Route the action links to. Logout is handled by the auth controller.
    pub fn path(&self) -> Option<&'static str> {
        match self {
            AuthAction::Logout => None,
            AuthAction::SignIn => Some(Route::Login.path()),
            AuthAction::SignUp => Some(Route::Register.path()),
        }
    }
}

/// A pending scroll to a home page section.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollPlan {
    pub anchor: String,
    /// Set when the page had to change first.
    pub delay: Option<Duration>,
}

/// Vertical scroll position that puts an element just below the navbar.
pub fn scroll_offset(element_top: f64, scroll_y: f64) -> f64 {
    element_top + scroll_y - NAVBAR_HEIGHT
}

/// Navbar state: only whether the mobile menu is open.
#[derive(Debug, Clone, Default)]
pub struct Navbar {
    is_open: bool,
}

impl Navbar {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn items(&self) -> &'static [NavItem] {
        &NAV_ITEMS
    }

    pub fn find(&self, name: &str) -> Option<&'static NavItem> {
        NAV_ITEMS.iter().find(|item| item.name.eq_ignore_ascii_case(name))
    }

    pub fn auth_actions(is_authenticated: bool) -> &'static [AuthAction] {
        if is_authenticated {
            &[AuthAction::Logout]
        } else {
            &[AuthAction::SignIn, AuthAction::SignUp]
        }
    }

    /// Follow a navbar item. Returns a scroll plan for anchors.
    pub fn select(&mut self, item: &NavItem, router: &mut Router) -> Option<ScrollPlan> {
        match item.target {
            NavTarget::Route(path) => {
                self.close();
                router.redirect_to(path);
                None
            }
            NavTarget::Anchor(anchor) => Some(self.scroll_to(anchor, router)),
        }
    }

    /// Scroll to a home page section, navigating home first when the current
    /// page is outside the base path.
    pub fn scroll_to(&mut self, target_id: &str, router: &mut Router) -> ScrollPlan {
        self.close();

        if router.current_path().starts_with(BASE_PATH) {
            ScrollPlan {
                anchor: target_id.to_string(),
                delay: None,
            }
        } else {
            router.redirect_to(HOME_PATH);
            ScrollPlan {
                anchor: target_id.to_string(),
                delay: Some(SCROLL_AFTER_NAVIGATE_DELAY),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_from_path() {
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path("/adhyaay"), Route::Home);
        assert_eq!(Route::from_path("/adhyaay/"), Route::Home);
        assert_eq!(Route::from_path("/adhyaay/login"), Route::Login);
        assert_eq!(Route::from_path("/adhyaay/book/"), Route::Book);
        assert_eq!(Route::from_path("/adhyaay/councellors?ref=nav"), Route::Councellors);
        assert_eq!(Route::from_path("/adhyaay/unknown"), Route::NotFound);
        assert_eq!(Route::from_path("/login"), Route::NotFound);
    }

    #[test]
    fn test_route_paths_resolve_back() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    #[test]
    fn test_router_records_redirects() {
        let mut router = Router::default();
        router.redirect_to("/adhyaay/login");
        router.redirect_to("/");
        assert_eq!(router.current_route(), Route::Home);
        assert_eq!(router.history(), ["/adhyaay/login", "/"]);
    }

    #[test]
    fn test_scroll_nav_on_home_scrolls_immediately() {
        let mut navbar = Navbar::default();
        navbar.toggle();
        let mut router = Router::new("/adhyaay/mentors");

        let plan = navbar.scroll_to("teams", &mut router);

        assert!(!navbar.is_open());
        assert_eq!(plan.anchor, "teams");
        assert_eq!(plan.delay, None);
        assert!(router.history().is_empty());
    }

    #[test]
    fn test_scroll_nav_outside_base_navigates_home_first() {
        let mut navbar = Navbar::default();
        let mut router = Router::new("/");

        let plan = navbar.scroll_to("footer", &mut router);

        assert_eq!(router.current_path(), HOME_PATH);
        assert_eq!(plan.delay, Some(SCROLL_AFTER_NAVIGATE_DELAY));
    }

    #[test]
    fn test_select_route_item_closes_menu() {
        let mut navbar = Navbar::default();
        navbar.toggle();
        let mut router = Router::default();
        let services = *navbar.find("services").expect("services item");

        assert_eq!(navbar.select(&services, &mut router), None);
        assert!(!navbar.is_open());
        assert_eq!(router.current_route(), Route::Councellors);
    }

    #[test]
    fn test_auth_actions() {
        assert_eq!(Navbar::auth_actions(true), [AuthAction::Logout]);
        assert_eq!(
            Navbar::auth_actions(false),
            [AuthAction::SignIn, AuthAction::SignUp]
        );
        assert_eq!(AuthAction::SignIn.path(), Some("/adhyaay/login"));
    }

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(500.0, 100.0), 536.0);
        assert_eq!(scroll_offset(0.0, 0.0), -64.0);
    }
}
