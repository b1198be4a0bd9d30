//! Login gate for protected views.
//!
//! A [`RouteGuard`] is created when a protected view mounts and evaluated each
//! time the view draws. It re-reads the store whenever the store has changed,
//! so a logout elsewhere in the application sends the view to sign-in without
//! a remount.

use std::fmt;

use crate::session::Session;
use crate::store::{SessionStore, Subscription};

/// Views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    SignIn,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::SignIn => "/signin",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Route::Home),
            "/about" => Some(Route::About),
            "/signin" => Some(Route::SignIn),
            "/dashboard" => Some(Route::Dashboard),
            _ => None,
        }
    }

    /// Whether the view needs an active session.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::About => "About",
            Route::SignIn => "Sign In",
            Route::Dashboard => "Dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// The "navigate to path" primitive supplied by the host UI.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Initial state on mount, before the store has been read.
    Checking,
    /// No session; sign-in navigation issued. Terminal for this mount.
    Redirecting,
    /// Session present; protected content binds to it.
    Authorized(Session),
}

pub struct RouteGuard {
    subscription: Subscription,
    state: GuardState,
}

impl RouteGuard {
    pub fn mount(store: &SessionStore) -> Self {
        Self {
            subscription: store.subscribe(),
            state: GuardState::Checking,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Evaluate the guard. Returns the session to render, or `None` when the
    /// view must render nothing.
    pub fn check<N: Navigator + ?Sized>(&mut self, navigator: &mut N) -> Option<&Session> {
        let recheck = match &self.state {
            GuardState::Checking => true,
            GuardState::Redirecting => false,
            GuardState::Authorized(_) => self.subscription.changed(),
        };

        if recheck {
            // Consume any pending notification so the next check starts clean
            self.subscription.changed();
            self.state = match self.subscription.current() {
                Some(session) => GuardState::Authorized(session),
                None => {
                    tracing::debug!(to = %Route::SignIn, "No session, redirecting");
                    navigator.navigate(Route::SignIn);
                    GuardState::Redirecting
                }
            };
        }

        match &self.state {
            GuardState::Authorized(session) => Some(session),
            GuardState::Checking | GuardState::Redirecting => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Plan;

    #[derive(Default)]
    struct Recorder(Vec<Route>);

    impl Navigator for Recorder {
        fn navigate(&mut self, route: Route) {
            self.0.push(route);
        }
    }

    #[test]
    fn test_route_paths() {
        for route in [Route::Home, Route::About, Route::SignIn, Route::Dashboard] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/dashboard/"), Some(Route::Dashboard));
        assert_eq!(Route::from_path("/models"), None);
        assert!(Route::Dashboard.is_protected());
        assert!(!Route::SignIn.is_protected());
    }

    #[test]
    fn test_starts_checking() {
        let store = SessionStore::in_memory();
        let guard = RouteGuard::mount(&store);
        assert_eq!(guard.state(), &GuardState::Checking);
    }

    #[test]
    fn test_redirecting_is_terminal() {
        let store = SessionStore::in_memory();
        let mut guard = RouteGuard::mount(&store);
        let mut nav = Recorder::default();

        assert!(guard.check(&mut nav).is_none());
        store.set_session(Session::new("u1", "a@b.com", Plan::Free));
        assert!(guard.check(&mut nav).is_none());
        assert_eq!(guard.state(), &GuardState::Redirecting);
        assert_eq!(nav.0, vec![Route::SignIn]);
    }

    #[test]
    fn test_authorized_tracks_credit_updates() {
        let store = SessionStore::in_memory();
        store.set_session(Session::new("u1", "a@b.com", Plan::Pro).with_credits(5));
        let mut guard = RouteGuard::mount(&store);
        let mut nav = Recorder::default();

        assert_eq!(guard.check(&mut nav).map(|s| s.credits), Some(5));
        store.update_credits(3);
        assert_eq!(guard.check(&mut nav).map(|s| s.credits), Some(3));
        assert!(nav.0.is_empty());
    }
}
