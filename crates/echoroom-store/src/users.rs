//! Current-user record and the local users collection.
//!
//! The app supports a local multi-user simulation: every registration is
//! appended to the `users` collection, while `current_user` holds the
//! single signed-in profile. At most one current user exists at a time —
//! the single-key document enforces it structurally.

use echoroom_shared::user::User;
use echoroom_shared::UserId;

use crate::database::Database;
use crate::error::Result;
use crate::keys;

impl Database {
    // ------------------------------------------------------------------
    // Current user
    // ------------------------------------------------------------------

    pub fn current_user(&self) -> Option<User> {
        self.load_document(keys::CURRENT_USER)
    }

    pub fn set_current_user(&self, user: &User) -> Result<()> {
        self.save_document(keys::CURRENT_USER, user)
    }

    pub fn clear_current_user(&self) -> Result<()> {
        self.delete_document(keys::CURRENT_USER)
    }

    // ------------------------------------------------------------------
    // Users collection
    // ------------------------------------------------------------------

    /// List every locally registered user.
    pub fn list_users(&self) -> Vec<User> {
        self.load_or_default(keys::USERS)
    }

    /// Insert or replace a user by id.
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        let mut users = self.list_users();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        self.save_document(keys::USERS, &users)
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.list_users().into_iter().find(|u| u.username == username)
    }

    pub fn find_user_by_id(&self, id: UserId) -> Option<User> {
        self.list_users().into_iter().find(|u| u.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echoroom_shared::user::GenderIdentity;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn current_user_set_get_clear() {
        let db = db();
        assert!(db.current_user().is_none());

        let user = User::new("ada", "ada@example.com", GenderIdentity::Female, "bisexual");
        db.set_current_user(&user).unwrap();
        assert_eq!(db.current_user(), Some(user));

        db.clear_current_user().unwrap();
        assert!(db.current_user().is_none());
    }

    #[test]
    fn upsert_replaces_by_id() {
        let db = db();
        let mut user = User::new("ada", "ada@example.com", GenderIdentity::Female, "bisexual");
        db.upsert_user(&user).unwrap();

        user.display_name = Some("Ada".into());
        db.upsert_user(&user).unwrap();

        let users = db.list_users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].display_name.as_deref(), Some("Ada"));
        assert_eq!(db.find_user_by_username("ada"), Some(user));
    }
}
