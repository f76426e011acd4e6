mod draft;
mod ledger;

use std::path::{Path, PathBuf};

pub use draft::DraftManager;
pub use ledger::RetryLedger;

/// Per-job files live in `<base>/drafts/`.
fn drafts_file(base: &Path, file_name: String) -> PathBuf {
    base.join("drafts").join(file_name)
}
