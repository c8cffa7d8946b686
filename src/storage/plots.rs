//! Rendered network artifacts
//!
//! Every analysis writes its own file named by a fresh ULID, so concurrent
//! analyses never overwrite each other's output. The ULID timestamp doubles
//! as the file's age when the directory is pruned.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use crate::error::AppError;

/// Identifier of one rendered artifact (ULID, 26 characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlotId(ulid::Ulid);

impl PlotId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    fn file_name(&self) -> String {
        format!("{}.html", self.0)
    }

    /// Inverse of `file_name`; anything else in the directory is ignored.
    fn from_file_name(name: &str) -> Option<Self> {
        let ulid = name.strip_suffix(".html")?;
        ulid::Ulid::from_string(ulid).ok().map(Self)
    }

    fn created_at(&self) -> SystemTime {
        self.0.datetime()
    }
}

impl Default for PlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for PlotId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s)
            .map(Self)
            .map_err(|_| AppError::NotFound)
    }
}

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How long artifacts are kept
#[derive(Debug, Clone, Copy)]
pub struct PlotRetention {
    /// Artifacts older than this are removed
    pub max_age: Duration,
    /// Only the newest `max_files` artifacts are kept
    pub max_files: usize,
}

impl Default for PlotRetention {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(3600),
            max_files: 1000,
        }
    }
}

/// Directory of rendered artifacts
pub struct PlotStore {
    dir: PathBuf,
    retention: PlotRetention,
}

impl PlotStore {
    /// Create the store, making sure the directory exists.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            retention: PlotRetention::default(),
        })
    }

    pub fn with_retention(mut self, retention: PlotRetention) -> Self {
        self.retention = retention;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `html` under a new id.
    pub async fn save(&self, html: &str) -> Result<PlotId, AppError> {
        let id = PlotId::new();
        let path = self.dir.join(id.file_name());
        tokio::fs::write(&path, html).await?;

        tracing::debug!(plot_id = %id, path = %path.display(), bytes = html.len(), "Plot saved");
        Ok(id)
    }

    /// Read a previously saved artifact.
    pub async fn load(&self, id: &PlotId) -> Result<String, AppError> {
        let path = self.dir.join(id.file_name());
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => Ok(html),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound),
            Err(error) => Err(error.into()),
        }
    }

    /// Remove artifacts past the retention age, then the oldest beyond the
    /// retention count.
    ///
    /// # Returns
    /// Number of artifacts removed
    pub async fn prune(&self) -> Result<usize, AppError> {
        let mut plots = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = entry.file_name().to_str().and_then(PlotId::from_file_name) {
                plots.push(id);
            }
        }

        // Newest first
        plots.sort_by(|a, b| b.0.cmp(&a.0));

        let now = SystemTime::now();
        let mut removed = 0;
        for (index, id) in plots.iter().enumerate() {
            let age = now.duration_since(id.created_at()).unwrap_or_default();
            if index < self.retention.max_files && age < self.retention.max_age {
                continue;
            }

            match tokio::fs::remove_file(self.dir.join(id.file_name())).await {
                Ok(()) => removed += 1,
                // Already gone
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(error) => return Err(error.into()),
            }
        }

        if removed > 0 {
            tracing::info!(removed, kept = plots.len() - removed, "Pruned plots");
        }
        Ok(removed)
    }
}
