//! Persist the best score (XDG config or ~/.config/chain_burst).
//!
//! The engine only sees the [`HighScoreStore`] trait. Loading never fails from
//! the engine's point of view: a missing or unreadable value counts as 0.
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};

const DIRNAME: &str = "chain_burst";
const FILENAME: &str = "highscore";

/// Storage for a single best-score value.
pub trait HighScoreStore {
    /// Returns the stored best score, or 0 if there is none or it cannot be read.
    fn load(&self) -> u32;
    /// Records a new best score.
    fn save(&mut self, score: u32) -> Result<()>;
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for Box<S> {
    fn load(&self) -> u32 {
        (**self).load()
    }

    fn save(&mut self, score: u32) -> Result<()> {
        (**self).save(score)
    }
}

/// Returns the default high score path (config dir / chain_burst / highscore).
pub fn default_path() -> PathBuf {
    config_path_from(
        std::env::var("XDG_CONFIG_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

fn config_path_from(xdg: Option<String>, home: Option<String>) -> PathBuf {
    let base = match xdg {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => home
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    base.join(DIRNAME).join(FILENAME)
}

/// A high score kept in a text file holding one decimal integer.
#[derive(Clone, Debug)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileHighScoreStore { path: path.into() }
    }

    /// A store at [`default_path`].
    pub fn at_default_path() -> Self {
        FileHighScoreStore::new(default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> u32 {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| content.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }

    /// Writes the score, creating the parent directory if needed.
    fn save(&mut self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, format!("{}\n", score))
            .with_context(|| format!("writing high score to {}", self.path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    score: u32,
    saves: Vec<u32>,
}

/// An in-memory store. Clones share the same value, so a caller can keep a
/// handle after moving one into a game.
#[derive(Clone, Debug, Default)]
pub struct MemoryHighScoreStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryHighScoreStore {
    /// A store that already holds `score`.
    pub fn with_score(score: u32) -> Self {
        let store = MemoryHighScoreStore::default();
        store.inner.borrow_mut().score = score;
        store
    }

    /// Every value passed to `save`, oldest first.
    pub fn saves(&self) -> Vec<u32> {
        self.inner.borrow().saves.clone()
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> u32 {
        self.inner.borrow().score
    }

    fn save(&mut self, score: u32) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.score = score;
        inner.saves.push(score);
        Ok(())
    }
}
