use parking_lot::RwLock;

/// Holds the caller's auth token. The engine never reads it directly; the
/// CLI pulls the token out and passes it to each remote call.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: String);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set(token.into());
        session
    }
}

impl SessionStore for MemorySession {
    fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// A blank token clears the session.
    fn set(&self, token: String) {
        let token = token.trim().to_string();
        *self.token.write() = Some(token).filter(|t| !t.is_empty());
    }

    fn clear(&self) {
        *self.token.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let session = MemorySession::new();
        assert_eq!(session.get(), None);
        session.set(" abc ".to_string());
        assert_eq!(session.get().as_deref(), Some("abc"));
        session.set(String::new());
        assert_eq!(session.get(), None);
        let session = MemorySession::with_token("t");
        session.clear();
        assert_eq!(session.get(), None);
    }
}
