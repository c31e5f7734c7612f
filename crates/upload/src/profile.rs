//! First-login profile setup.

use apkstore_protocol::UserProfile;
use apkstore_query::{QueryError, StoreClient};
use tracing::info;

/// Single-field form asking a new caller for a display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSetupForm {
    pub name: String,
}

impl ProfileSetupForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit stays disabled while the trimmed name is empty.
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Saves the profile. Returns `Ok(None)` without a remote call when the
    /// name is blank.
    pub async fn submit(&self, client: &StoreClient) -> Result<Option<UserProfile>, QueryError> {
        if !self.can_submit() {
            return Ok(None);
        }
        let profile = UserProfile {
            name: self.name.trim().to_string(),
        };
        client.save_caller_user_profile(&profile).await?;
        info!(name = %profile.name, "profile set up");
        Ok(Some(profile))
    }
}
