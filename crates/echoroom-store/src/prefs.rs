//! Client preferences: dark mode, language, and the signaling auth token.

use crate::database::Database;
use crate::error::Result;
use crate::keys;

/// Default UI language.
const DEFAULT_LANGUAGE: &str = "en";

impl Database {
    pub fn dark_mode(&self) -> bool {
        self.load_or_default(keys::DARK_MODE)
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.save_document(keys::DARK_MODE, &enabled)
    }

    pub fn language(&self) -> String {
        self.load_document(keys::LANGUAGE)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    pub fn set_language(&self, language: &str) -> Result<()> {
        self.save_document(keys::LANGUAGE, language)
    }

    /// Bearer token for the signaling connection. Issued at login, read at
    /// connect time, cleared on logout.
    pub fn auth_token(&self) -> Option<String> {
        self.load_document(keys::AUTH_TOKEN)
    }

    pub fn set_auth_token(&self, token: &str) -> Result<()> {
        self.save_document(keys::AUTH_TOKEN, token)
    }

    pub fn clear_auth_token(&self) -> Result<()> {
        self.delete_document(keys::AUTH_TOKEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_round_trips() {
        let db = Database::open_in_memory().unwrap();

        assert!(!db.dark_mode());
        assert_eq!(db.language(), "en");
        assert!(db.auth_token().is_none());

        db.set_dark_mode(true).unwrap();
        db.set_language("fr").unwrap();
        db.set_auth_token("tok-1").unwrap();

        assert!(db.dark_mode());
        assert_eq!(db.language(), "fr");
        assert_eq!(db.auth_token().as_deref(), Some("tok-1"));

        db.clear_auth_token().unwrap();
        assert!(db.auth_token().is_none());
    }
}
