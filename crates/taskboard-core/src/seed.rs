//! Seed loading: one JSON document with `projects`, `users`, `tasks` and
//! `comments` arrays. Loading is all-or-nothing.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::model::{Comment, Project, Task, User};

/// The full dataset a session starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Why a seed could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read seed file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed seed {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SeedError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::SeedNotFound,
            Self::Read { .. } => ErrorCode::InternalUnexpected,
            Self::Malformed { .. } => ErrorCode::SeedMalformed,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

impl Seed {
    /// Parse a seed from JSON text. `origin` only labels errors.
    ///
    /// # Errors
    ///
    /// [`SeedError::Malformed`] when the text is not a valid seed document.
    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self, SeedError> {
        serde_json::from_str(text).map_err(|source| SeedError::Malformed {
            path: origin.to_path_buf(),
            source,
        })
    }
}

/// Load and parse the seed at `path`.
///
/// # Errors
///
/// Fails if the file is missing, unreadable, or not a valid seed document.
pub fn load_seed(path: &Path) -> Result<Seed, SeedError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SeedError::NotFound(path.to_path_buf())
        } else {
            SeedError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let seed = Seed::from_json_str(&text, path)?;
    tracing::info!(
        path = %path.display(),
        projects = seed.projects.len(),
        users = seed.users.len(),
        tasks = seed.tasks.len(),
        comments = seed.comments.len(),
        "seed loaded"
    );
    Ok(seed)
}
