use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::{fs, path::PathBuf};

/// The fixed key the persisted `{ pet, settings }` record lives under.
pub(crate) const STATE_FILE: &str = "tamagotchy.json";

pub(crate) struct Paths {
    pub(crate) state_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "tamagotchy", "Tamagotchy")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        state_path: dir.join(STATE_FILE),
    })
}
