//! Application state management for AI Clone.
//!
//! This module contains the core `App` struct that drives the views: which
//! route is showing, the sign-in form, the route guard of the mounted view,
//! and the session store handed in from `main`.

use anyhow::Result;
use tracing::{debug, info, warn};

use aiclone_core::{
    Config, GuardState, Navigator, Plan, Projection, Route, RouteGuard, Session, SessionStore,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for email input.
/// 254 is the longest address SMTP allows.
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for display name input.
const MAX_NAME_LENGTH: usize = 64;

/// How many frames a status message stays up (about four seconds at the
/// event poll interval).
pub const STATUS_MESSAGE_TICKS: u32 = 40;

// ============================================================================
// UI State Types
// ============================================================================

/// Routes reachable from the navigation bar, in display order.
pub const NAV_ROUTES: [Route; 4] = [Route::Home, Route::About, Route::SignIn, Route::Dashboard];

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Sign-in form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInFocus {
    Email,
    Name,
    Plan,
    Button,
}

impl SignInFocus {
    pub fn next(&self) -> Self {
        match self {
            SignInFocus::Email => SignInFocus::Name,
            SignInFocus::Name => SignInFocus::Plan,
            SignInFocus::Plan => SignInFocus::Button,
            SignInFocus::Button => SignInFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SignInFocus::Email => SignInFocus::Button,
            SignInFocus::Name => SignInFocus::Email,
            SignInFocus::Plan => SignInFocus::Name,
            SignInFocus::Button => SignInFocus::Plan,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Current route plus a navigation requested but not yet applied.
#[derive(Debug)]
pub struct Router {
    current: Route,
    pending: Option<Route>,
}

impl Router {
    fn new(start: Route) -> Self {
        Self {
            current: start,
            pending: None,
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    /// Apply the pending navigation, returning the new route if it moved.
    fn settle(&mut self) -> Option<Route> {
        let next = self.pending.take()?;
        if next == self.current {
            return None;
        }
        debug!(from = %self.current, to = %next, "Navigated");
        self.current = next;
        Some(next)
    }
}

impl Navigator for Router {
    fn navigate(&mut self, route: Route) {
        self.pending = Some(route);
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App<'a> {
    pub config: Config,
    store: &'a SessionStore,

    pub state: AppState,
    router: Router,
    /// Guard of the mounted protected view, if any.
    guard: Option<RouteGuard>,
    /// Credit count shown in the navigation bar.
    credits: Projection<Option<u64>>,

    // Sign-in form state
    pub signin_email: String,
    pub signin_name: String,
    pub signin_plan: Plan,
    pub signin_focus: SignInFocus,
    pub signin_error: Option<String>,

    pub status_message: Option<String>,
    /// Ticks left before `status_message` is cleared.
    status_ticks: u32,
}

impl<'a> App<'a> {
    pub fn new(config: Config, store: &'a SessionStore) -> Self {
        let signin_email = std::env::var("AICLONE_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();

        let credits = store.select(|user| user.map(|u| u.credits));

        Self {
            config,
            store,
            state: AppState::Normal,
            router: Router::new(Route::Home),
            guard: None,
            credits,
            signin_email,
            signin_name: String::new(),
            signin_plan: Plan::default(),
            signin_focus: SignInFocus::Email,
            signin_error: None,
            status_message: None,
            status_ticks: 0,
        }
    }

    pub fn route(&self) -> Route {
        self.router.current()
    }

    pub fn session(&self) -> Option<Session> {
        self.store.current()
    }

    pub fn credits(&self) -> Option<u64> {
        *self.credits.get()
    }

    /// What the mounted protected view should show. `None` outside protected views.
    pub fn guard_state(&self) -> Option<&GuardState> {
        self.guard.as_ref().map(RouteGuard::state)
    }

    /// Request navigation; takes effect on the next `tick`.
    pub fn navigate(&mut self, route: Route) {
        self.router.navigate(route);
    }

    /// Run one observation pass: evaluate the guard, apply navigation, and
    /// pick up store changes for the navigation bar. Called once per frame.
    pub fn tick(&mut self) {
        // A redirect issued by the guard mounts the target in the same pass
        for _ in 0..2 {
            self.apply_navigation();
            if let Some(guard) = self.guard.as_mut() {
                guard.check(&mut self.router);
            }
        }

        // Balance changes only; a session appearing is not news
        let before = *self.credits.get();
        if let Some(Some(balance)) = self.credits.changed() {
            if before.is_some() {
                self.set_status(format!("Credits: {}", balance));
            }
        }

        if self.status_message.is_some() {
            self.status_ticks = self.status_ticks.saturating_sub(1);
            if self.status_ticks == 0 {
                self.status_message = None;
            }
        }
    }

    /// Show a transient message in the status bar.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_ticks = STATUS_MESSAGE_TICKS;
    }

    fn apply_navigation(&mut self) {
        if let Some(route) = self.router.settle() {
            self.guard = route.is_protected().then(|| RouteGuard::mount(self.store));
            if route == Route::SignIn {
                self.start_sign_in();
            }
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Reset the sign-in form focus and error.
    pub fn start_sign_in(&mut self) {
        self.signin_focus = if self.signin_email.is_empty() {
            SignInFocus::Email
        } else {
            SignInFocus::Name
        };
        self.signin_error = None;
    }

    /// Sign in with the form contents. There is no server to verify against;
    /// a new session is created locally and handed to the store.
    pub fn attempt_sign_in(&mut self) -> Result<()> {
        let email = self.signin_email.trim().to_string();
        if email.is_empty() {
            self.signin_error = Some("Email required".to_string());
            return Err(anyhow::anyhow!("Email required"));
        }
        if !email.contains('@') {
            self.signin_error = Some("Enter a valid email address".to_string());
            return Err(anyhow::anyhow!("Invalid email address"));
        }
        self.signin_error = None;

        let mut session = Session::new(generate_session_id(), email.clone(), self.signin_plan);
        let name = self.signin_name.trim();
        if !name.is_empty() {
            session = session.with_name(name);
        }
        self.store.set_session(session);

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.signin_name.clear();
        self.status_message = None;
        info!("Sign-in successful");
        self.navigate(Route::Dashboard);
        Ok(())
    }

    /// Clear the session and return to the public home view.
    pub fn logout(&mut self) {
        self.store.logout();
        self.set_status("Logged out");
        self.navigate(Route::Home);
    }
}

/// Opaque account identifier for a locally created session.
pub fn generate_session_id() -> String {
    format!("usr_{:016x}", rand::random::<u64>())
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if a display name character should be accepted
pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> Session {
        Session::new("u1", "a@b.com", Plan::Free)
            .with_name("Ann")
            .with_credits(5)
    }

    fn app(store: &SessionStore) -> App<'_> {
        let mut app = App::new(Config::default(), store);
        app.signin_email.clear();
        app
    }

    #[test]
    fn test_signin_focus_cycle() {
        assert_eq!(SignInFocus::Email.next(), SignInFocus::Name);
        assert_eq!(SignInFocus::Button.next(), SignInFocus::Email); // Wraps around
        assert_eq!(SignInFocus::Email.prev(), SignInFocus::Button);
        assert_eq!(SignInFocus::Plan.prev(), SignInFocus::Name);
    }

    #[test]
    fn test_dashboard_without_session_redirects_to_signin() {
        let store = SessionStore::in_memory();
        let mut app = app(&store);

        app.navigate(Route::Dashboard);
        app.tick();

        assert_eq!(app.route(), Route::SignIn);
        assert!(app.guard_state().is_none());
    }

    #[test]
    fn test_dashboard_with_session_is_authorized() {
        let store = SessionStore::in_memory();
        store.set_session(ann());
        let mut app = app(&store);

        app.navigate(Route::Dashboard);
        app.tick();

        assert_eq!(app.route(), Route::Dashboard);
        assert_eq!(app.guard_state(), Some(&GuardState::Authorized(ann())));
    }

    #[test]
    fn test_external_logout_redirects_mounted_dashboard() {
        let store = SessionStore::in_memory();
        store.set_session(ann());
        let mut app = app(&store);
        app.navigate(Route::Dashboard);
        app.tick();

        store.logout();
        app.tick();

        assert_eq!(app.route(), Route::SignIn);
    }

    #[test]
    fn test_logout_action_returns_home() {
        let store = SessionStore::in_memory();
        store.set_session(ann());
        let mut app = app(&store);
        app.navigate(Route::Dashboard);
        app.tick();

        app.logout();
        app.tick();

        assert_eq!(app.route(), Route::Home);
        assert_eq!(store.current(), None);
    }

    #[test]
    fn test_sign_in_requires_email() {
        let store = SessionStore::in_memory();
        let mut app = app(&store);
        assert!(app.attempt_sign_in().is_err());
        assert!(app.signin_error.is_some());
        assert_eq!(store.current(), None);

        app.signin_email = "not-an-email".to_string();
        assert!(app.attempt_sign_in().is_err());
        assert_eq!(store.current(), None);
    }

    #[test]
    fn test_credits_projection_updates_status() {
        let store = SessionStore::in_memory();
        store.set_session(ann());
        let mut app = app(&store);
        assert_eq!(app.credits(), Some(5));

        store.update_credits(12);
        app.tick();

        assert_eq!(app.credits(), Some(12));
        assert_eq!(app.status_message.as_deref(), Some("Credits: 12"));
    }

    #[test]
    fn test_session_appearing_does_not_announce_credits() {
        let store = SessionStore::in_memory();
        let mut app = app(&store);
        assert_eq!(app.credits(), None);

        store.set_session(ann());
        app.tick();

        assert_eq!(app.credits(), Some(5));
        assert_eq!(app.status_message, None);
    }

    #[test]
    fn test_status_message_expires() {
        let store = SessionStore::in_memory();
        store.set_session(ann());
        let mut app = app(&store);

        store.update_credits(12);
        for _ in 0..STATUS_MESSAGE_TICKS - 1 {
            app.tick();
        }
        assert_eq!(app.status_message.as_deref(), Some("Credits: 12"));

        app.tick();
        assert_eq!(app.status_message, None);
    }

    #[test]
    fn test_generate_session_id_shape() {
        let id = generate_session_id();
        assert!(id.starts_with("usr_"));
        assert_eq!(id.len(), 20);
        assert_ne!(id, generate_session_id());
    }

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(0, '@'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(0, '\n'));
        assert!(!can_add_email_char(254, 'a'));
    }

    #[test]
    fn test_can_add_name_char() {
        assert!(can_add_name_char(0, 'A'));
        assert!(can_add_name_char(10, ' '));
        assert!(!can_add_name_char(64, 'a'));
        assert!(!can_add_name_char(0, '\t'));
    }
}
