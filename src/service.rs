//! Account-facing operations built on the resolver.

use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::account::{AccountCredentials, AccountUpdater};
use crate::bucket::BucketKey;
use crate::error::Result;
use crate::phase::{name_with_phase, PhaseTable};
use crate::resolver::MoonResolver;

/// Outcome of a profile picture update.
#[derive(Debug, Clone, PartialEq)]
pub struct PictureUpdate {
    pub message: String,
    pub moon_id: BucketKey,
    pub path: PathBuf,
}

/// Resolves frames and applies them to accounts.
pub struct MoonService {
    resolver: Arc<MoonResolver>,
    account: Arc<dyn AccountUpdater>,
    phases: PhaseTable,
}

impl MoonService {
    pub fn new(resolver: Arc<MoonResolver>, account: Arc<dyn AccountUpdater>) -> Self {
        Self {
            resolver,
            account,
            phases: PhaseTable::default(),
        }
    }

    pub fn resolver(&self) -> &MoonResolver {
        &self.resolver
    }

    /// Resolve the current frame and upload it as the profile picture.
    ///
    /// The cache lease is released before the upload starts.
    pub fn update_picture(&self, credentials: &AccountCredentials) -> Result<PictureUpdate> {
        let resolution = self.resolver.resolve()?;
        self.account
            .update_profile_image(credentials, &resolution.path)?;
        info!("Profile picture updated with frame {}", resolution.key);
        Ok(PictureUpdate {
            message: "profile picture updated".to_string(),
            moon_id: resolution.key,
            path: resolution.path,
        })
    }

    /// Append today's phase symbol to `current_name` and apply it.
    pub fn update_name(&self, credentials: &AccountCredentials, current_name: &str) -> Result<String> {
        self.update_name_on(credentials, current_name, Utc::now().date_naive())
    }

    /// Like [`update_name`](Self::update_name) for a given date.
    pub fn update_name_on(
        &self,
        credentials: &AccountCredentials,
        current_name: &str,
        date: NaiveDate,
    ) -> Result<String> {
        let symbol = self.phases.symbol_for(date, self.resolver.hemisphere());
        let name = name_with_phase(current_name, symbol);
        self.account.update_display_name(credentials, &name)?;
        info!("Display name updated to {:?}", name);
        Ok(name)
    }
}
