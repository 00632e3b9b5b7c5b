use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entity names that own a backing table and a schema descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKey {
    Asset,
    Sequence,
    Shot,
    Task,
    Version,
    Note,
    PublishedFile,
    Post,
    PostMedia,
    PostReaction,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown entity '{0}'")]
pub struct ParseEntityError(pub String);

impl EntityKey {
    pub const ALL: [EntityKey; 11] = [
        Self::Asset,
        Self::Sequence,
        Self::Shot,
        Self::Task,
        Self::Version,
        Self::Note,
        Self::PublishedFile,
        Self::Post,
        Self::PostMedia,
        Self::PostReaction,
        Self::Annotation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Sequence => "sequence",
            Self::Shot => "shot",
            Self::Task => "task",
            Self::Version => "version",
            Self::Note => "note",
            Self::PublishedFile => "published_file",
            Self::Post => "post",
            Self::PostMedia => "post_media",
            Self::PostReaction => "post_reaction",
            Self::Annotation => "annotation",
        }
    }

    /// Backing table in the hosted database.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Asset => "assets",
            Self::Sequence => "sequences",
            Self::Shot => "shots",
            Self::Task => "tasks",
            Self::Version => "versions",
            Self::Note => "notes",
            Self::PublishedFile => "published_files",
            Self::Post => "posts",
            Self::PostMedia => "post_media",
            Self::PostReaction => "post_reactions",
            Self::Annotation => "annotations",
        }
    }

    /// The `entity_type` value this entity uses in the runtime schema view.
    ///
    /// Identity for every entity today. Callers go through this mapping so
    /// a rename on the database side only touches this match.
    pub fn runtime_entity_type(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Sequence => "sequence",
            Self::Shot => "shot",
            Self::Task => "task",
            Self::Version => "version",
            Self::Note => "note",
            Self::PublishedFile => "published_file",
            Self::Post => "post",
            Self::PostMedia => "post_media",
            Self::PostReaction => "post_reaction",
            Self::Annotation => "annotation",
        }
    }

    /// Human-readable label used in activity descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Sequence => "Sequence",
            Self::Shot => "Shot",
            Self::Task => "Task",
            Self::Version => "Version",
            Self::Note => "Note",
            Self::PublishedFile => "Published File",
            Self::Post => "Post",
            Self::PostMedia => "Post Media",
            Self::PostReaction => "Reaction",
            Self::Annotation => "Annotation",
        }
    }

    /// Whether rows of this entity carry a `project_id` owning them.
    pub fn is_project_scoped(&self) -> bool {
        !matches!(self, Self::PostMedia | Self::PostReaction | Self::Annotation)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKey {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| ParseEntityError(s.to_string()))
    }
}
