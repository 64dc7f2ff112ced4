//! Authenticated profile edits.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;
use sessionkit_core::{ClearReason, Session, SessionStorage, UserProfile};
use sessionkit_store::SessionStore;

use crate::{
    api::ApiClient,
    error::{PROFILE_REJECTED_FALLBACK, ProfileError, SESSION_EXPIRED_FALLBACK},
    validate,
};

const UPDATE_PROFILE_PATH: &str = "/update-profile";

/// Client for profile updates on behalf of the stored session.
pub struct ProfileClient<S>
where
    S: SessionStorage,
{
    api: ApiClient,
    store: Arc<SessionStore<S>>,
}

impl<S> ProfileClient<S>
where
    S: SessionStorage,
{
    /// Create a client acting for the session in `store`.
    #[must_use]
    pub const fn new(api: ApiClient, store: Arc<SessionStore<S>>) -> Self {
        Self { api, store }
    }

    /// Profile of the stored session, if any.
    pub async fn current_profile(&self) -> Option<UserProfile> {
        self.store.get().await.map(|session| session.profile)
    }

    /// Change the display name.
    ///
    /// On success the new name is merged into the stored profile (email and
    /// auth flag are kept) and the updated profile is returned.
    ///
    /// # Errors
    /// - `Invalid` if `new_name` is blank; nothing is sent.
    /// - `Unauthenticated` if no session is stored; nothing is sent.
    /// - `SessionExpired` on a 401; the store has been cleared.
    /// - `Rejected` on any other non-success status; the session is kept.
    /// - `Transport` if the request fails or the body is not JSON.
    /// - `Storage` if the store cannot be written.
    pub async fn update_profile(&self, new_name: &str) -> Result<UserProfile, ProfileError> {
        validate::validate_name(new_name)?;
        let Some(session) = self.store.get().await else {
            return Err(ProfileError::Unauthenticated);
        };

        let reply = self
            .api
            .post_json(
                UPDATE_PROFILE_PATH,
                &json!({ "name": new_name }),
                Some(&session.token),
            )
            .await?;

        if reply.status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Token refused, clearing session");
            self.store.clear_with(ClearReason::Expired).await?;
            return Err(ProfileError::SessionExpired(
                reply
                    .detail()
                    .unwrap_or_else(|| SESSION_EXPIRED_FALLBACK.to_string()),
            ));
        }

        if !reply.is_success() {
            tracing::warn!(status = %reply.status, "Profile update rejected");
            return Err(ProfileError::Rejected(
                reply
                    .detail()
                    .unwrap_or_else(|| PROFILE_REJECTED_FALLBACK.to_string()),
            ));
        }
        reply.json()?;

        // Merge only into the session the request was made for; a logout or
        // re-login while the request was in flight wins.
        let updated = self
            .store
            .update(|current| {
                (current.token == session.token).then(|| {
                    Session::new(current.token.clone(), current.profile.renamed(new_name))
                })
            })
            .await?;

        match updated {
            Some(updated) => {
                tracing::info!("Profile updated");
                Ok(updated.profile)
            }
            None => {
                tracing::debug!("Session changed during profile update, result dropped");
                Err(ProfileError::Unauthenticated)
            }
        }
    }
}
