use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which catalog a media id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Movie,
    Tv,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    pub fn is_tv(self) -> bool {
        matches!(self, Self::Tv)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl std::str::FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            other => Err(UnknownContentType(other.to_string())),
        }
    }
}

/// The (media id, content type) pair a player is mounted for.
///
/// Two refs are the same content only if both halves match: movie `42` and
/// show `42` are unrelated catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: String,
    pub kind: ContentType,
}

impl MediaRef {
    pub fn new(id: impl Into<String>, kind: ContentType) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn movie(id: impl Into<String>) -> Self {
        Self::new(id, ContentType::Movie)
    }

    pub fn tv(id: impl Into<String>) -> Self {
        Self::new(id, ContentType::Tv)
    }
}

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
