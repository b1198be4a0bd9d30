//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use aiclone_core::Route;

use crate::app::{can_add_email_char, can_add_name_char, App, AppState, SignInFocus, NAV_ROUTES};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // The sign-in form captures text keys
    if app.route() == Route::SignIn {
        return handle_signin_input(app, key);
    }

    handle_normal_input(app, key)
}

fn handle_normal_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('l') if app.session().is_some() => app.logout(),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.navigate(NAV_ROUTES[index]);
        }
        KeyCode::Right => app.navigate(cycle_route(app.route(), true)),
        KeyCode::Left => app.navigate(cycle_route(app.route(), false)),
        _ => {}
    }
    Ok(false)
}

fn handle_signin_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Leave the form
            app.navigate(Route::Home);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.signin_focus = app.signin_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.signin_focus = app.signin_focus.prev();
        }
        KeyCode::Left if app.signin_focus == SignInFocus::Plan => {
            app.signin_plan = app.signin_plan.prev();
        }
        KeyCode::Right if app.signin_focus == SignInFocus::Plan => {
            app.signin_plan = app.signin_plan.next();
        }
        KeyCode::Enter => match app.signin_focus {
            SignInFocus::Button => {
                // On failure signin_error is set and the form stays up
                let _ = app.attempt_sign_in();
            }
            focus => app.signin_focus = focus.next(),
        },
        KeyCode::Backspace => match app.signin_focus {
            SignInFocus::Email => {
                app.signin_email.pop();
            }
            SignInFocus::Name => {
                app.signin_name.pop();
            }
            SignInFocus::Plan | SignInFocus::Button => {}
        },
        KeyCode::Char(c) => match app.signin_focus {
            SignInFocus::Email => {
                if can_add_email_char(app.signin_email.chars().count(), c) {
                    app.signin_email.push(c);
                }
            }
            SignInFocus::Name => {
                if can_add_name_char(app.signin_name.chars().count(), c) {
                    app.signin_name.push(c);
                }
            }
            // Ignore character input on the selector and button
            SignInFocus::Plan | SignInFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

/// Next or previous route in navigation-bar order (wrapping around)
fn cycle_route(current: Route, forward: bool) -> Route {
    let len = NAV_ROUTES.len();
    let index = NAV_ROUTES.iter().position(|r| *r == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    NAV_ROUTES[next]
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiclone_core::{Config, Plan, SessionStore};
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    #[test]
    fn test_cycle_route_wraps() {
        assert_eq!(cycle_route(Route::Home, true), Route::About);
        assert_eq!(cycle_route(Route::Dashboard, true), Route::Home);
        assert_eq!(cycle_route(Route::Home, false), Route::Dashboard);
    }

    #[test]
    fn test_number_keys_navigate() {
        let store = SessionStore::in_memory();
        let mut app = App::new(Config::default(), &store);
        press(&mut app, KeyCode::Char('2'));
        app.tick();
        assert_eq!(app.route(), Route::About);
    }

    #[test]
    fn test_signin_form_typing_and_plan_selection() {
        let store = SessionStore::in_memory();
        let mut app = App::new(Config::default(), &store);
        app.signin_email.clear();
        press(&mut app, KeyCode::Char('3'));
        app.tick();
        assert_eq!(app.route(), Route::SignIn);
        assert_eq!(app.signin_focus, SignInFocus::Email);

        for c in "a@b.com".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        for c in "Ann".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);

        assert_eq!(app.signin_email, "a@b.com");
        assert_eq!(app.signin_name, "An");
        assert_eq!(app.signin_plan, Plan::Pro);
        // 'q' is text inside the form, not quit
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_quit_confirmation() {
        let store = SessionStore::in_memory();
        let mut app = App::new(Config::default(), &store);
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(press(&mut app, KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_logout_key_ignored_when_signed_out() {
        let store = SessionStore::in_memory();
        let mut app = App::new(Config::default(), &store);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.status_message, None);
    }
}
