use std::path::{Path, PathBuf};

use crate::{
    backend::ReviewBackend,
    config,
    error::DraftError,
    management::drafts_file,
    review::DecisionStore,
    types::{DecisionEntry, JobId},
};

/// Decisions recorded for a job but not yet submitted.
///
/// Stored as the ordered entry list under
/// `<data_local_dir>/plmcli/drafts/job_<id>.json`, so decisions made over
/// several CLI invocations keep their order and survive a failed submit.
pub struct DraftManager {
    job_id: JobId,
    path: PathBuf,
    entries: Vec<DecisionEntry>,
}

impl DraftManager {
    pub fn new(job_id: JobId) -> Self {
        Self::with_dir(config::data_dir(), job_id)
    }

    /// Draft kept below `base` instead of the user's data directory.
    pub fn with_dir(base: impl AsRef<Path>, job_id: JobId) -> Self {
        Self {
            job_id,
            path: drafts_file(base.as_ref(), format!("job_{}.json", job_id)),
            entries: Vec::new(),
        }
    }

    /// Loads the draft for `job_id`, or an empty one if none was saved.
    pub async fn load(job_id: JobId) -> Result<Self, DraftError> {
        Self::load_from(config::data_dir(), job_id).await
    }

    pub async fn load_from(base: impl AsRef<Path>, job_id: JobId) -> Result<Self, DraftError> {
        let mut draft = Self::with_dir(base, job_id);
        if !draft.path.is_file() {
            return Ok(draft);
        }

        let json = async_fs::read_to_string(&draft.path).await?;
        draft.entries = serde_json::from_str(&json)?;
        Ok(draft)
    }

    pub async fn persist(&self) -> Result<(), DraftError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn clear(&mut self) -> Result<(), DraftError> {
        self.entries.clear();
        if self.path.is_file() {
            async_fs::remove_file(&self.path).await?;
        }
        Ok(())
    }

    /// Sends the decisions of `store` as one batch and settles the draft.
    ///
    /// On success the draft file is removed. When the backend refuses or
    /// cannot be reached the batch is written back to the draft and the
    /// failure comes back as [`DraftError::Submit`].
    pub async fn submit<B: ReviewBackend>(
        &mut self,
        store: &DecisionStore,
        backend: &B,
    ) -> Result<usize, DraftError> {
        match store.submit(backend, self.job_id).await {
            Ok(count) => {
                self.clear().await?;
                Ok(count)
            }
            Err(e) => {
                self.sync_from(store);
                self.persist().await?;
                Err(DraftError::Submit(e))
            }
        }
    }

    pub fn entries(&self) -> &[DecisionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the draft with the batch the store would submit.
    pub fn sync_from(&mut self, store: &DecisionStore) {
        self.entries = store.build_submission();
    }
}
