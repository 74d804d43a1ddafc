//! Application state for shared services

use std::sync::Arc;

use crate::config::Environment;
use crate::domain::prescription::PrescriptionRepository;
use crate::infrastructure::auth::TokenIssuer;
use crate::infrastructure::user::UserDirectory;

use super::auth::session::SessionCookie;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserDirectory>,
    pub tokens: Arc<TokenIssuer>,
    pub prescriptions: Arc<dyn PrescriptionRepository>,
    pub cookie: SessionCookie,
    pub environment: Environment,
}

impl AppState {
    pub fn new(
        users: UserDirectory,
        tokens: TokenIssuer,
        prescriptions: Arc<dyn PrescriptionRepository>,
        cookie: SessionCookie,
        environment: Environment,
    ) -> Self {
        Self {
            users: Arc::new(users),
            tokens: Arc::new(tokens),
            prescriptions,
            cookie,
            environment,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("users", &self.users)
            .field("prescriptions", &self.prescriptions)
            .field("cookie", &self.cookie)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}
