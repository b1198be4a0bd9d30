//! Per-route content rendering.

pub mod about;
pub mod dashboard;
pub mod home;
pub mod signin;
