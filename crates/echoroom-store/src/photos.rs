//! Per-user encoded profile photos.
//!
//! Each photo is its own document (`echoroom.photo.<uuid>`), so one
//! oversized upload can only fail its own write. The quota check happens in
//! the generic save path; this module just namespaces the keys.

use tracing::debug;

use echoroom_shared::photo::EncodedPhoto;
use echoroom_shared::UserId;

use crate::database::Database;
use crate::error::Result;
use crate::keys;

fn photo_key(user: UserId) -> String {
    format!("{}.{}", keys::PHOTO_PREFIX, user)
}

impl Database {
    pub fn photo_for_user(&self, user: UserId) -> Option<EncodedPhoto> {
        self.load_document(&photo_key(user))
    }

    pub fn save_photo(&self, user: UserId, photo: &EncodedPhoto) -> Result<()> {
        debug!(user = %user, bytes = photo.data_base64.len(), "saving photo");
        self.save_document(&photo_key(user), photo)
    }

    pub fn delete_photo(&self, user: UserId) -> Result<()> {
        self.delete_document(&photo_key(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    fn photo(data_len: usize) -> EncodedPhoto {
        EncodedPhoto {
            hash: "00".repeat(32),
            data_base64: "A".repeat(data_len),
            width: 10,
            height: 10,
        }
    }

    #[test]
    fn save_get_delete() {
        let db = Database::open_in_memory().unwrap();
        let user = UserId::new();

        assert!(db.photo_for_user(user).is_none());
        db.save_photo(user, &photo(128)).unwrap();
        assert_eq!(db.photo_for_user(user).unwrap().width, 10);

        db.delete_photo(user).unwrap();
        assert!(db.photo_for_user(user).is_none());
    }

    #[test]
    fn oversized_photo_reports_quota() {
        let db = Database::open_in_memory().unwrap();
        let user = UserId::new();

        let err = db
            .save_photo(user, &photo(echoroom_shared::constants::MAX_DOCUMENT_SIZE))
            .unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
    }
}
