use std::sync::{Mutex, PoisonError};

pub const SIGN_IN_ROUTE: &str = "/auth/signin";
pub const FORGOT_PASSWORD_ROUTE: &str = "/auth/forgot-password";
pub const HOME_ROUTE: &str = "/";

/// Moves the user to another screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Records every route it is asked to show. The console prints the last one
/// as a hint after a command finishes.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current(&self) -> Option<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route = %route, "Navigating");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}
