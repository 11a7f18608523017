//! User types for Cirrus.

/// A registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address (unique, case-insensitive).
    pub email: String,
    /// Argon2id password hash.
    pub password: String,
    /// Short bio.
    pub bio: Option<String>,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
    /// Bytes currently consumed by this user's files.
    pub storage_used: i64,
    /// Storage ceiling in bytes.
    pub storage_limit: i64,
    /// When the account was created.
    pub created_at: String,
    /// When the account was last modified.
    pub updated_at: String,
}

impl User {
    /// Remaining quota headroom in bytes.
    pub fn headroom(&self) -> i64 {
        self.storage_limit - self.storage_used
    }
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password: String,
    /// Short bio.
    pub bio: Option<String>,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
    /// Storage ceiling in bytes.
    pub storage_limit: i64,
}

impl NewUser {
    /// Create a NewUser with the given storage limit.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        storage_limit: i64,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password_hash.into(),
            bio: None,
            profile_picture: None,
            storage_limit,
        }
    }

    /// Set the bio.
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Set the profile picture URL.
    pub fn with_profile_picture(mut self, url: impl Into<String>) -> Self {
        self.profile_picture = Some(url.into());
        self
    }
}

/// Builder for profile updates. Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New bio (Some(None) clears it).
    pub bio: Option<Option<String>>,
    /// New profile picture URL (Some(None) clears it).
    pub profile_picture: Option<Option<String>>,
}

impl ProfileUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the bio.
    pub fn bio(mut self, bio: Option<impl Into<String>>) -> Self {
        self.bio = Some(bio.map(|s| s.into()));
        self
    }

    /// Set the profile picture URL.
    pub fn profile_picture(mut self, url: Option<impl Into<String>>) -> Self {
        self.profile_picture = Some(url.map(|s| s.into()));
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.profile_picture.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_builder() {
        let user = NewUser::new("Ada", "ada@example.com", "$argon2id$hash", 1024)
            .with_bio("mathematician")
            .with_profile_picture("https://example.com/ada.png");

        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.storage_limit, 1024);
        assert_eq!(user.bio, Some("mathematician".to_string()));
        assert!(user.profile_picture.is_some());
    }

    #[test]
    fn test_profile_update_builder() {
        let update = ProfileUpdate::new()
            .name("Ada Lovelace")
            .bio(Some("pioneer"));

        assert_eq!(update.name, Some("Ada Lovelace".to_string()));
        assert_eq!(update.bio, Some(Some("pioneer".to_string())));
        assert!(update.profile_picture.is_none());
        assert!(!update.is_empty());
        assert!(ProfileUpdate::new().is_empty());
    }

    #[test]
    fn test_headroom() {
        let user = User {
            id: 1,
            name: "u".into(),
            email: "u@example.com".into(),
            password: "h".into(),
            bio: None,
            profile_picture: None,
            storage_used: 300,
            storage_limit: 1000,
            created_at: "2026-01-01 00:00:00".into(),
            updated_at: "2026-01-01 00:00:00".into(),
        };
        assert_eq!(user.headroom(), 700);
    }
}
