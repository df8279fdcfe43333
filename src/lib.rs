//! Client library for the InternLink internship marketplace. Owns the
//! session store, the authenticated HTTP gateway, role-based route
//! guarding, the public listing filter, and the moderation queues used by
//! admin and employer review screens.

pub mod api;
pub mod config;
pub mod filter;
pub mod guard;
pub mod models;
pub mod moderation;
pub mod session;

pub use api::{ApiClient, ApiError, LoginFieldErrors, LoginOutcome, PasswordChange};
pub use config::ClientConfig;
pub use guard::{AccessGuard, GuardDecision};
pub use models::{Application, Internship, ModerationStatus, Role, User};
pub use moderation::{Moderated, ModerationError, ModerationQueue, ModerationTarget};
pub use session::{Session, SessionStore};

use tracing_subscriber::EnvFilter;

/// Install the process-wide tracing subscriber. Call once at startup;
/// `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
