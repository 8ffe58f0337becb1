use std::sync::RwLock;

use crate::usecase::ports::session::Session;

/// Session backed by a token resolved at startup (config file or env).
#[derive(Debug, Default)]
pub struct StaticSession {
    token: RwLock<Option<String>>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|token| !token.trim().is_empty());
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.into());
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.bearer_token().is_some()
    }
}

impl Session for StaticSession {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|slot| slot.clone())
    }

    fn on_unauthorized(&self) {
        tracing::warn!("api rejected the session token; signing out");
        if let Ok(mut slot) = self.token.write() {
            slot.take();
        }
    }
}
