//! Identity: users signed in through Google, and their sessions.
//!
//! This capability is independent of the learning-path store. Everything is
//! held in memory.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Sequential id, starting at 1.
    pub id: u64,
    /// The Google account id.
    pub google_id: String,
    /// Primary email address.
    pub email: String,
    /// Name to display.
    pub display_name: String,
    /// Profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// When the user first signed in.
    pub created_at: DateTime<Utc>,
}

/// The profile returned by Google after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoogleProfile {
    /// The Google account id.
    pub google_id: String,
    /// The first email on the account, if Google returned one.
    pub email: Option<String>,
    /// Name to display.
    pub display_name: String,
    /// Profile picture.
    pub avatar_url: Option<String>,
}

/// Errors raised while signing a user in.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// Google returned a profile without an email address.
    #[error("no email found in Google profile for account '{0}'")]
    MissingEmail(String),
}

/// The set of known users.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<u64, User>,
    next_id: u64,
}

impl UserDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The user with the given id.
    #[must_use]
    pub fn get_user(&self, id: u64) -> Option<&User> {
        self.users.get(&id)
    }

    /// The user with the given Google account id.
    #[must_use]
    pub fn get_user_by_google_id(&self, google_id: &str) -> Option<&User> {
        self.users.values().find(|user| user.google_id == google_id)
    }

    /// Return the user for a Google profile, creating one on first sign-in.
    ///
    /// An existing user has their display name, avatar and email refreshed
    /// from the profile.
    ///
    /// # Errors
    ///
    /// Fails if the profile has no email address.
    pub fn find_or_create_by_google_id(&mut self, profile: GoogleProfile) -> Result<User, AuthError> {
        let Some(email) = profile.email else {
            return Err(AuthError::MissingEmail(profile.google_id));
        };

        if let Some(user) = self
            .users
            .values_mut()
            .find(|user| user.google_id == profile.google_id)
        {
            if user.display_name != profile.display_name
                || user.avatar_url != profile.avatar_url
                || user.email != email
            {
                tracing::debug!("refreshing profile of user {}", user.id);
                user.display_name = profile.display_name;
                user.avatar_url = profile.avatar_url;
                user.email = email;
            }
            return Ok(user.clone());
        }

        self.next_id += 1;
        let user = User {
            id: self.next_id,
            google_id: profile.google_id,
            email,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            created_at: Utc::now(),
        };
        tracing::info!("created user {} for {}", user.id, user.email);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// An opaque session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Signed-in sessions, each bound to a user id.
#[derive(Debug, Default)]
pub struct Sessions {
    active: HashMap<SessionId, u64>,
}

impl Sessions {
    /// No active sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for the user.
    pub fn login(&mut self, user: &User) -> SessionId {
        let session = SessionId(Uuid::new_v4());
        self.active.insert(session, user.id);
        tracing::debug!("user {} logged in", user.id);
        session
    }

    /// The user a session belongs to, looked up in `users`.
    ///
    /// `None` for unknown or ended sessions.
    #[must_use]
    pub fn current_user<'a>(&self, users: &'a UserDirectory, session: SessionId) -> Option<&'a User> {
        self.active
            .get(&session)
            .and_then(|id| users.get_user(*id))
    }

    /// End a session. Ending an unknown session is not an error.
    pub fn logout(&mut self, session: SessionId) {
        if let Some(id) = self.active.remove(&session) {
            tracing::debug!("user {id} logged out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(google_id: &str, name: &str) -> GoogleProfile {
        GoogleProfile {
            google_id: google_id.to_string(),
            email: Some(format!("{google_id}@example.com")),
            display_name: name.to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn new_users_get_sequential_ids() {
        let mut users = UserDirectory::new();

        let ada = users.find_or_create_by_google_id(profile("g-1", "Ada")).unwrap();
        let bob = users.find_or_create_by_google_id(profile("g-2", "Bob")).unwrap();

        assert_eq!(ada.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(users.get_user(2), Some(&bob));
        assert_eq!(users.get_user_by_google_id("g-1"), Some(&ada));
    }

    #[test]
    fn find_or_create_is_idempotent_and_refreshes_fields() {
        let mut users = UserDirectory::new();
        let first = users.find_or_create_by_google_id(profile("g-1", "Ada")).unwrap();

        let mut changed = profile("g-1", "Ada Lovelace");
        changed.avatar_url = Some("https://example.com/ada.png".to_string());
        let second = users.find_or_create_by_google_id(changed).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.display_name, "Ada Lovelace");
        assert_eq!(second.avatar_url.as_deref(), Some("https://example.com/ada.png"));
        assert_eq!(users.get_user(first.id), Some(&second));
        assert!(users.get_user(2).is_none());
    }

    #[test]
    fn profile_without_email_is_rejected() {
        let mut users = UserDirectory::new();
        let mut anonymous = profile("g-1", "Anon");
        anonymous.email = None;

        let error = users.find_or_create_by_google_id(anonymous).unwrap_err();

        assert_eq!(error, AuthError::MissingEmail("g-1".to_string()));
        assert!(users.get_user(1).is_none());
    }

    #[test]
    fn sessions_resolve_until_logout() {
        let mut users = UserDirectory::new();
        let mut sessions = Sessions::new();
        let ada = users.find_or_create_by_google_id(profile("g-1", "Ada")).unwrap();

        let session = sessions.login(&ada);
        assert_eq!(sessions.current_user(&users, session), Some(&ada));
        assert_eq!(sessions.current_user(&users, session), Some(&ada));

        sessions.logout(session);
        sessions.logout(session);

        assert!(sessions.current_user(&users, session).is_none());
    }

    #[test]
    fn user_serializes_in_camel_case() {
        let mut users = UserDirectory::new();
        let ada = users.find_or_create_by_google_id(profile("g-1", "Ada")).unwrap();

        let value = serde_json::to_value(&ada).unwrap();

        assert_eq!(value["googleId"], "g-1");
        assert_eq!(value["displayName"], "Ada");
        assert!(value.get("avatarUrl").is_none());
    }
}
