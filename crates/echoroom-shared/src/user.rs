//! User profile model and attraction-preference derivation.
//!
//! Profiles are created at registration and mutated by profile edits.
//! `attracted_to` is never entered directly; it is derived from the gender
//! identity and the orientation string via [`derive_attraction`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

// ---------------------------------------------------------------------------
// Gender / orientation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GenderIdentity {
    Male,
    Female,
    NonBinary,
}

/// Derive the set of gender identities a user is attracted to.
///
/// The orientation is kept as the free-form string the user entered;
/// matching is case-insensitive. Unrecognized orientations resolve to all
/// genders rather than an empty set, so a typo never hides every profile.
///
/// * heterosexual: the opposite binary gender; non-binary users map to both
///   binary genders
/// * homosexual: the same gender
/// * bisexual: `[Female, Male]`
/// * asexual: empty
/// * anything else: `[Female, Male, NonBinary]`
pub fn derive_attraction(gender: GenderIdentity, orientation: &str) -> Vec<GenderIdentity> {
    use GenderIdentity::*;

    match orientation.trim().to_ascii_lowercase().as_str() {
        "heterosexual" | "straight" => match gender {
            Male => vec![Female],
            Female => vec![Male],
            NonBinary => vec![Female, Male],
        },
        "homosexual" | "gay" | "lesbian" => vec![gender],
        "bisexual" => vec![Female, Male],
        "asexual" => Vec::new(),
        _ => vec![Female, Male, NonBinary],
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Lifestyle attributes shown on the profile card. All optional; absent
/// fields are simply not displayed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Lifestyle {
    pub smoking: Option<String>,
    pub drinking: Option<String>,
    pub looking_for: Option<String>,
}

/// A registered user profile.
///
/// The store keeps a `users` collection (local multi-user simulation) plus
/// a single *current user* record; at most one current user exists at a
/// time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable local identifier, minted at registration.
    pub id: UserId,
    /// Unique login name, lowercase `[a-z0-9_]`.
    pub username: String,
    pub email: String,
    /// Optional display name; falls back to the username in the UI.
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub gender: GenderIdentity,
    /// Orientation as entered, preserved verbatim.
    pub orientation: String,
    /// Derived from `gender` + `orientation`; recomputed on profile edits.
    pub attracted_to: Vec<GenderIdentity>,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    /// BLAKE3 hash of the stored profile photo, if one was uploaded.
    pub avatar_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh profile with derived attraction preferences.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        gender: GenderIdentity,
        orientation: impl Into<String>,
    ) -> Self {
        let orientation = orientation.into();
        let attracted_to = derive_attraction(gender, &orientation);

        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            display_name: None,
            bio: None,
            gender,
            orientation,
            attracted_to,
            lifestyle: Lifestyle::default(),
            avatar_hash: None,
            created_at: Utc::now(),
        }
    }

    /// Re-derive `attracted_to` after a gender or orientation edit.
    pub fn refresh_attraction(&mut self) {
        self.attracted_to = derive_attraction(self.gender, &self.orientation);
    }
}
