//! Per-round, per-stage output directories.
//!
//! Every stage of every round writes into its own directory under the
//! campaign root, named `{prefix}_i{round}_{stage}`. Initial samples use
//! `{prefix}_i0_initial_{k}`. Rounds are numbered from 1, so none of these
//! names collide.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::Result;

/// Format of [`CampaignLayout::timestamped`] prefixes, e.g. `241019153012`.
pub const PREFIX_FORMAT: &str = "%y%m%d%H%M%S";

/// Directories of one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundPaths {
    pub train: PathBuf,
    pub optimise: PathBuf,
    pub simulate: PathBuf,
}

impl RoundPaths {
    pub fn all(&self) -> [&Path; 3] {
        [self.train.as_path(), self.optimise.as_path(), self.simulate.as_path()]
    }

    /// True once any of the three directories exists.
    #[must_use]
    pub fn any_exists(&self) -> bool {
        self.all().iter().any(|d| d.exists())
    }

    /// Create all three directories. A round never reuses a directory, so
    /// an existing one is refused.
    ///
    /// # Errors
    /// IO failures; `ErrorKind::AlreadyExists` when a directory is taken.
    pub fn create(&self) -> Result<()> {
        if let Some(taken) = self.all().into_iter().find(|d| d.exists()) {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists", taken.display()),
            )
            .into());
        }
        for dir in self.all() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Naming scheme for a campaign's results tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampaignLayout {
    root: PathBuf,
    prefix: String,
}

impl CampaignLayout {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self { root: root.into(), prefix: prefix.into() }
    }

    /// Prefix taken from the local clock.
    pub fn timestamped(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Local::now().format(PREFIX_FORMAT).to_string())
    }

    /// Newest timestamped campaign under `root`, if any. Directory names not
    /// starting with a [`PREFIX_FORMAT`] stamp followed by `_i` are ignored.
    ///
    /// # Errors
    /// IO failures listing `root`.
    pub fn latest(root: impl Into<PathBuf>) -> Result<Option<Self>> {
        let root = root.into();
        if !root.is_dir() {
            return Ok(None);
        }
        let mut newest: Option<String> = None;
        for entry in fs::read_dir(&root)? {
            let name = entry?.file_name();
            let Some((prefix, _)) = name.to_str().and_then(|n| n.split_once("_i")) else {
                continue;
            };
            let stamped = prefix.len() == 12 && prefix.bytes().all(|b| b.is_ascii_digit());
            if stamped && newest.as_deref().is_none_or(|n| prefix > n) {
                newest = Some(prefix.to_string());
            }
        }
        Ok(newest.map(|prefix| Self::new(root, prefix)))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn dir(&self, tag: &str) -> PathBuf {
        self.root.join(format!("{}_{tag}", self.prefix))
    }

    #[must_use]
    pub fn round(&self, round: usize) -> RoundPaths {
        RoundPaths {
            train: self.dir(&format!("i{round}_surrogate")),
            optimise: self.dir(&format!("i{round}_optimise")),
            simulate: self.dir(&format!("i{round}_simulate")),
        }
    }

    /// Evaluation directory of the `k`-th initial sample.
    #[must_use]
    pub fn initial(&self, k: usize) -> PathBuf {
        self.dir(&format!("i0_initial_{k}"))
    }
}
