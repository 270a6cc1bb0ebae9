use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Where the best score lives between sessions. The engine reads it once per
/// game over and writes only when it was beaten.
pub trait HighScoreStore {
    fn high_score(&self) -> u32;
    fn set_high_score(&mut self, score: u32);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryHighScore {
    best: u32,
}

impl MemoryHighScore {
    pub fn new(best: u32) -> Self {
        Self { best }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn high_score(&self) -> u32 {
        self.best
    }

    fn set_high_score(&mut self, score: u32) {
        self.best = score;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct HighScoreFile {
    version: u8,
    #[serde(rename = "highScore", alias = "high_score")]
    high_score: u32,
    #[serde(rename = "updatedAt", default)]
    updated_at: Option<String>,
}

/// JSON-file backed high score. Reads happen once at load. Writes go through the
/// background task from [`FileHighScoreStore::spawn_writer`], or onto the
/// blocking pool of the current tokio runtime. Only without any runtime do they
/// hit the disk inline.
pub struct FileHighScoreStore {
    file_path: PathBuf,
    best: u32,
    writer: Option<mpsc::UnboundedSender<u32>>,
}

impl FileHighScoreStore {
    pub fn new(file_path: PathBuf) -> Self {
        let best = load_high_score(&file_path);
        Self {
            file_path,
            best,
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Moves persistence onto a tokio task. Must be called inside a runtime.
    pub fn spawn_writer(&mut self) -> tokio::task::JoinHandle<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
        let path = self.file_path.clone();
        self.writer = Some(tx);
        tokio::spawn(async move {
            while let Some(mut score) = rx.recv().await {
                while let Ok(newer) = rx.try_recv() {
                    score = score.max(newer);
                }
                let path = path.clone();
                let result = tokio::task::spawn_blocking(move || save_high_score(&path, score)).await;
                match result {
                    Ok(Ok(())) => debug!(score, "high score persisted"),
                    Ok(Err(error)) => warn!(%error, "failed to persist high score"),
                    Err(error) => warn!(%error, "high score writer task failed"),
                }
            }
        })
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn high_score(&self) -> u32 {
        self.best
    }

    fn set_high_score(&mut self, score: u32) {
        self.best = score;
        if let Some(writer) = &self.writer {
            if writer.send(score).is_ok() {
                return;
            }
            warn!(path = %self.file_path.display(), "high score writer stopped, writing inline");
            self.writer = None;
        }
        // hand the write to the ambient runtime when there is one
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let path = self.file_path.clone();
            handle.spawn_blocking(move || {
                if let Err(error) = save_high_score(&path, score) {
                    warn!(path = %path.display(), %error, "failed to persist high score");
                }
            });
            return;
        }
        debug!(path = %self.file_path.display(), score, "no runtime, writing high score inline");
        if let Err(error) = save_high_score(&self.file_path, score) {
            warn!(path = %self.file_path.display(), %error, "failed to persist high score");
        }
    }
}

fn load_high_score(path: &Path) -> u32 {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), %error, "failed to read high score");
            }
            return 0;
        }
    };
    match serde_json::from_str::<HighScoreFile>(&text) {
        Ok(file) if file.version == 1 => file.high_score,
        Ok(file) => {
            warn!(path = %path.display(), version = file.version, "unsupported high score version");
            0
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to parse high score");
            0
        }
    }
}

fn save_high_score(path: &Path, score: u32) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let payload = HighScoreFile {
        version: 1,
        high_score: score,
        updated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    };
    fs::write(path, serde_json::to_string_pretty(&payload)?)?;
    Ok(())
}
