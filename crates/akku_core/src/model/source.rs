//! Journal source model.
//!
//! # Responsibility
//! - Describe where entries are loaded from and how.
//! - Keep per-format options typed instead of an opaque string.
//!
//! # Invariants
//! - `SourceId` is stable for the lifetime of a registered source.
//! - Passphrases are never part of a source configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Heading that marks capture nodes in outline files.
pub const DEFAULT_CAPTURE_MARKER: &str = "log";
/// Heading that holds checklist-style journals.
pub const DEFAULT_LIST_HEADING: &str = "Log";

/// Stable identifier of a registered source.
pub type SourceId = Uuid;

/// Source format discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Outline file with capture nodes carrying a `CREATED` property.
    Outline,
    /// Outline file with a checklist journal under one heading.
    List,
    /// Directory of per-day files with encrypted outline nodes.
    EncryptedArchive,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outline => "outline",
            Self::List => "list",
            Self::EncryptedArchive => "encrypted_archive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "outline" => Some(Self::Outline),
            "list" => Some(Self::List),
            "encrypted_archive" => Some(Self::EncryptedArchive),
            _ => None,
        }
    }
}

/// Per-format source options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Outline {
        #[serde(default = "default_capture_marker")]
        marker: String,
    },
    List {
        #[serde(default = "default_list_heading")]
        heading: String,
    },
    EncryptedArchive,
}

impl SourceConfig {
    /// Outline config with the default `log` marker.
    pub fn outline() -> Self {
        Self::Outline {
            marker: default_capture_marker(),
        }
    }

    /// List config with the default `Log` heading.
    pub fn list() -> Self {
        Self::List {
            heading: default_list_heading(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Outline { .. } => SourceKind::Outline,
            Self::List { .. } => SourceKind::List,
            Self::EncryptedArchive => SourceKind::EncryptedArchive,
        }
    }
}

/// Registered source of journal entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: SourceId,
    /// File for outline/list sources, directory for archives.
    pub path: PathBuf,
    pub config: SourceConfig,
}

impl Source {
    /// Creates a source with a freshly generated id.
    pub fn new(path: impl Into<PathBuf>, config: SourceConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            config,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.config.kind()
    }
}

fn default_capture_marker() -> String {
    DEFAULT_CAPTURE_MARKER.to_string()
}

fn default_list_heading() -> String {
    DEFAULT_LIST_HEADING.to_string()
}
