//! Core library for AI Clone.
//!
//! This crate provides:
//! - `Session`, `Plan`: the signed-in user and their credit balance
//! - `SessionStore`: persisted, observable single source of truth
//! - `RouteGuard`: login gate for protected views
//! - `Config`: on-disk application configuration
//!
//! The store is restored from storage when opened and written back on every
//! mutation. Storage is pluggable through `StateStorage`.

pub mod config;
pub mod guard;
pub mod persist;
pub mod session;
pub mod state;
pub mod store;

pub use config::Config;
pub use guard::{GuardState, Navigator, Route, RouteGuard};
pub use persist::{FileStorage, MemoryStorage, Persister, StateStorage, StorageError, STORAGE_KEY};
pub use session::{Plan, Session, UnknownPlan, DEFAULT_CREDITS};
pub use state::UserState;
pub use store::{Projection, SessionStore, Subscription};
