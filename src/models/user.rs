//! User Model
//!
//! Account data structures shared by the services and the API layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public user profile as returned by the API
///
/// Carries no sensitive state: password hashes and reset tokens stay on
/// [`UserRecord`]. All timestamps are UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable account id
    pub id: Uuid,

    /// Unique handle
    pub username: String,

    /// Display name shown on profiles and uploads
    pub full_name: String,

    /// Login email, stored normalized (trimmed, lowercased)
    pub email: String,

    /// Optional short biography
    pub bio: Option<String>,

    /// Avatar URL, if the user set one
    pub profile_image_url: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// Last profile modification time
    pub updated_at: DateTime<Utc>,
}

/// Full user row including the password hash and reset token state
///
/// This struct is what repositories load and store. It's never exposed in API
/// responses; handlers convert to [`User`] first.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    /// Stable account id
    pub id: Uuid,

    /// Unique handle
    pub username: String,

    /// Display name
    pub full_name: String,

    /// Login email
    pub email: String,

    /// bcrypt hashed password
    pub password_hash: String,

    /// Optional short biography
    pub bio: Option<String>,

    /// Avatar URL, if the user set one
    pub profile_image_url: Option<String>,

    /// Currently outstanding password reset token, if any
    pub reset_token: Option<String>,

    /// Expiry of the outstanding reset token
    pub reset_token_expires_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// Last profile modification time
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a verified account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

impl From<UserRecord> for User {
    /// Convert the stored row to the public user struct
    ///
    /// This conversion strips the password hash and reset token state so they
    /// are never accidentally exposed in API responses.
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            username: record.username,
            full_name: record.full_name,
            email: record.email,
            bio: record.bio,
            profile_image_url: record.profile_image_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_conversion() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: "nina_s".to_string(),
            full_name: "Nina Simone".to_string(),
            email: "nina@resonate.fm".to_string(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
            bio: None,
            profile_image_url: Some("https://cdn.resonate.fm/avatars/nina.jpg".to_string()),
            reset_token: Some("aabbcc".to_string()),
            reset_token_expires_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let user: User = record.into();

        // Conversion keeps profile fields and drops credential state
        assert_eq!(user.username, "nina_s");
        assert_eq!(user.full_name, "Nina Simone");
        assert_eq!(user.email, "nina@resonate.fm");
        assert_eq!(
            user.profile_image_url,
            Some("https://cdn.resonate.fm/avatars/nina.jpg".to_string())
        );
        let serialized = serde_json::to_value(&user).unwrap();
        assert!(serialized.get("password_hash").is_none());
        assert!(serialized.get("reset_token").is_none());
    }
}
