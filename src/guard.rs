use tracing::debug;

use crate::models::{Role, User};
use crate::session::SessionStore;

/// Route the guard sends unauthenticated or unauthorized visitors to.
pub const LOGIN_ROUTE: &str = "/login";

/// Outcome of a guard evaluation for one navigation.
#[derive(Clone, Debug, PartialEq)]
pub enum GuardDecision {
    /// Session present and permitted; the resolved user is handed to the
    /// guarded subtree so children never re-read storage themselves.
    Authorized(User),
    /// Send the visitor to the login screen. `replace` asks the router to
    /// overwrite the history entry so back-navigation cannot re-enter the
    /// guarded page; `from` is the location to return to after login.
    RedirectToLogin {
        replace: bool,
        from: Option<String>,
    },
}

impl GuardDecision {
    fn redirect(from: &str) -> Self {
        GuardDecision::RedirectToLogin {
            replace: true,
            from: Some(from.to_string()),
        }
    }
}

/// Gates entry to a navigational subtree by required role set. One
/// synchronous decision per navigation; no retries, no side effects beyond
/// reading the session store.
#[derive(Clone)]
pub struct AccessGuard {
    store: SessionStore,
}

impl AccessGuard {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Evaluate entry to `requested`. `allowed_roles` of `None` means any
    /// authenticated role may enter. Role comparison is case-insensitive and
    /// normalised here, nowhere else. Both rejection branches preserve the
    /// requested location for a post-login return.
    pub fn check(&self, allowed_roles: Option<&[Role]>, requested: &str) -> GuardDecision {
        let Some(session) = self.store.read() else {
            debug!(requested, "no session, redirecting to login");
            return GuardDecision::redirect(requested);
        };

        if let Some(allowed) = allowed_roles {
            let permitted = session
                .user
                .role()
                .map(|role| allowed.contains(&role))
                .unwrap_or(false);
            if !permitted {
                debug!(
                    requested,
                    role = %session.user.role,
                    "role not permitted, redirecting to login"
                );
                return GuardDecision::redirect(requested);
            }
        }

        GuardDecision::Authorized(session.user)
    }
}
