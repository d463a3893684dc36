//! Account settings screen: profile load, dirty tracking, save.
//!
//! The profile photo lives only in view state. It is shown, counted as a
//! change, and cleared locally, but never included in the update payload.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::auth::session::Session;
use crate::error::{ClientError, ClientResult};
use crate::models::{Profile, ProfileUpdate};
use crate::repository::UserRepository;
use crate::validation::{AccountForm, FormState};

/// Avatar shown when no photo is selected.
pub const DEFAULT_AVATAR: &str = "/img/default-avatar.png";

/// Image types the photo picker accepts.
pub const ACCEPTED_PHOTO_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Last-saved values the dirty check compares against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Snapshot {
    form: AccountForm,
    photo: Option<String>,
}

pub struct AccountSync {
    users: Arc<dyn UserRepository>,
    profile: Option<Profile>,
    form: FormState<AccountForm>,
    photo: Option<String>,
    original: Snapshot,
}

impl AccountSync {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            profile: None,
            form: FormState::default(),
            photo: None,
            original: Snapshot::default(),
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn form(&self) -> &FormState<AccountForm> {
        &self.form
    }

    /// Fetch the profile and take it as both the live and the original values.
    ///
    /// Without a session this fails with `Unauthenticated` before any request.
    pub async fn load(&mut self, session: &Session, user_id: i64) -> ClientResult<&Profile> {
        session.require_user_id()?;
        let profile = self
            .users
            .get_profile(session, user_id)
            .await
            .inspect_err(|e| tracing::error!("Failed to load profile {}: {}", user_id, e))?;

        let values = AccountForm {
            username: profile.username.clone(),
            email: profile.email.clone(),
        };
        self.form.replace(values.clone());
        self.photo = None;
        self.original = Snapshot {
            form: values,
            photo: None,
        };
        Ok(self.profile.insert(profile))
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        let username = username.into();
        self.form.edit("username", |f| f.username = username);
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        let email = email.into();
        self.form.edit("email", |f| f.email = email);
    }

    /// Read a picked image into a data URI held only in view state.
    pub fn select_photo(&mut self, mime: &str, bytes: &[u8]) -> ClientResult<()> {
        if !ACCEPTED_PHOTO_TYPES.contains(&mime) {
            return Err(ClientError::BadRequest(format!(
                "Unsupported image type {}. Use PNG or JPEG.",
                mime
            )));
        }
        self.photo = Some(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)));
        Ok(())
    }

    pub fn clear_photo(&mut self) {
        self.photo = None;
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn avatar(&self) -> &str {
        self.photo.as_deref().unwrap_or(DEFAULT_AVATAR)
    }

    /// True when the form or photo differs from the last-saved snapshot.
    pub fn is_dirty(&self) -> bool {
        *self.form.values() != self.original.form || self.photo != self.original.photo
    }

    pub fn submit_disabled(&self) -> bool {
        self.form.submit_disabled() || !self.is_dirty()
    }

    /// Push username and email when something changed.
    ///
    /// Invalid input aborts before any request. A clean form returns the
    /// current profile without contacting the backend. On success the
    /// snapshot advances, so the form reads clean again.
    pub async fn save(&mut self, session: &Session) -> ClientResult<Profile> {
        if !self.form.validate_all() {
            return Err(ClientError::Validation(self.form.errors().clone()));
        }
        let user_id = session.require_user_id()?;
        let profile_id = self.profile.as_ref().map(|p| p.id).unwrap_or(user_id);

        if !self.is_dirty() {
            tracing::debug!("Account form unchanged, nothing to save");
            if let Some(profile) = &self.profile {
                return Ok(profile.clone());
            }
        }

        let values = self.form.values().clone();
        let update = ProfileUpdate {
            username: values.username.trim().to_string(),
            email: values.email.trim().to_string(),
        };
        let saved = self
            .users
            .update_profile(session, profile_id, &update)
            .await
            .inspect_err(|e| tracing::error!("Failed to save profile {}: {}", profile_id, e))?;

        if self.photo != self.original.photo {
            tracing::info!("Profile photo changed locally; it is not sent to the backend");
        }
        self.original = Snapshot {
            form: values,
            photo: self.photo.clone(),
        };
        self.profile = Some(saved.clone());
        Ok(saved)
    }
}
