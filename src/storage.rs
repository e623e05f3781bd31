use crate::model::SaveFile;
use anyhow::Result;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Storage boundary for the single persisted record. Injected so the app
/// loop can be driven against an in-memory fake in tests.
pub(crate) trait Store {
    /// Best-effort read. Missing or unreadable data yields `None`; the
    /// caller falls back to defaults without surfacing an error.
    fn load(&self) -> Option<SaveFile>;

    /// Write-through save, called on every change to pet or settings.
    fn save(&self, save: &SaveFile) -> Result<()>;
}

pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Option<SaveFile> {
        let s = fs::read_to_string(&self.path).ok()?;
        decode_save(&s)
    }

    fn save(&self, save: &SaveFile) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(save)?;
        fs::write(&tmp, data)?;
        atomic_rename(&tmp, &self.path)?;
        Ok(())
    }
}

pub(crate) fn decode_save(s: &str) -> Option<SaveFile> {
    serde_json::from_str::<SaveFile>(s).ok()
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // Best-effort atomic replace on same filesystem.
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}
