//! Persisted notification counters.

use echoroom_shared::notifications::NotificationCounts;

use crate::database::Database;
use crate::error::Result;
use crate::keys;

impl Database {
    pub fn notification_counts(&self) -> NotificationCounts {
        self.load_or_default(keys::NOTIFICATION_COUNTS)
    }

    pub fn save_notification_counts(&self, counts: &NotificationCounts) -> Result<()> {
        self.save_document(keys::NOTIFICATION_COUNTS, counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_default() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.notification_counts(), NotificationCounts::default());

        let mut counts = db.notification_counts();
        counts.bump_archived_chats();
        db.save_notification_counts(&counts).unwrap();

        assert_eq!(db.notification_counts().archived_chats, 1);
    }
}
