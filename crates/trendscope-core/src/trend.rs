use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} \"{value}\"")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Instagram,
}

impl Platform {
    /// Every supported platform, in display order.
    pub const ALL: [Platform; 2] = [Platform::YouTube, Platform::Instagram];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Instagram => "instagram",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" => Ok(Platform::YouTube),
            "instagram" => Ok(Platform::Instagram),
            _ => Err(ParseEnumError::new("platform", s)),
        }
    }
}

/// Whether a record came from a real platform API or the built-in demo set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Live,
    Mock,
}

impl RecordSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecordSource::Live => "live",
            RecordSource::Mock => "mock",
        }
    }
}

impl std::fmt::Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordSource {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(RecordSource::Live),
            "mock" => Ok(RecordSource::Mock),
            _ => Err(ParseEnumError::new("record source", s)),
        }
    }
}

/// Lifecycle state of a collection run. Only `Running` may transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunStatus::Running),
            "succeeded" => Ok(RunStatus::Succeeded),
            "failed" => Ok(RunStatus::Failed),
            _ => Err(ParseEnumError::new("run status", s)),
        }
    }
}

/// One normalized piece of platform content, keyed by `(platform, content_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub platform: Platform,
    /// Platform-prefixed identifier, e.g. `"youtube_dQw4w9WgXcQ"`.
    pub content_id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: Option<String>,
    /// Always 0 for Instagram, which does not report view counts.
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    /// Lowercase, without the leading `#`.
    pub hashtags: Vec<String>,
    /// Publish time reported by the platform.
    pub observed_at: DateTime<Utc>,
    pub source: RecordSource,
}

impl TrendRecord {
    /// Clamps counters at zero and truncates `observed_at` to whole seconds,
    /// matching what storage can round-trip.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.views = self.views.max(0);
        self.likes = self.likes.max(0);
        self.comments = self.comments.max(0);
        self.observed_at = self.observed_at.trunc_subsecs(0);
        self
    }

    /// Likes plus comments.
    #[must_use]
    pub fn total_engagement(&self) -> i64 {
        self.likes.saturating_add(self.comments)
    }
}
