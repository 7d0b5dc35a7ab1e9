use std::path::Path;

use dash_logging::{dash_error, dash_info, dash_warn};
use examdash_core::{JobId, Theme};
use examdash_engine::{ClientStorage, JOB_ID_KEY, THEME_KEY};

/// Job reference and theme preference kept across runs.
#[derive(Debug, Clone)]
pub struct Persistence {
    storage: ClientStorage,
}

impl Persistence {
    /// The directory is created by the first write.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            storage: ClientStorage::new(state_dir),
        }
    }

    pub fn load_job_id(&self) -> Option<JobId> {
        let job_id = self.storage.get_or_none(JOB_ID_KEY)?;
        dash_info!("Loaded persisted job {} from {:?}", job_id, self.storage.path());
        Some(job_id)
    }

    pub fn save_job_id(&self, job_id: &str) {
        if let Err(err) = self.storage.set(JOB_ID_KEY, job_id) {
            dash_error!("Failed to persist job {}: {}", job_id, err);
        }
    }

    pub fn clear_job_id(&self) {
        if let Err(err) = self.storage.remove(JOB_ID_KEY) {
            dash_error!("Failed to clear persisted job: {}", err);
        }
    }

    /// Unrecognised values read as "no preference".
    pub fn load_theme(&self) -> Option<Theme> {
        let raw = self.storage.get_or_none(THEME_KEY)?;
        let theme = Theme::parse(&raw);
        if theme.is_none() {
            dash_warn!("Ignoring stored theme {:?}", raw);
        }
        theme
    }

    pub fn save_theme(&self, theme: Theme) {
        if let Err(err) = self.storage.set(THEME_KEY, theme.as_str()) {
            dash_error!("Failed to persist theme {}: {}", theme.as_str(), err);
        }
    }
}
