// glacier-restore/src/storage/types.rs
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Restored copies stay available for this many days.
pub const RESTORE_RETENTION_DAYS: i32 = 30;

/// Storage class an object currently lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageTier {
    Standard,
    StandardIa,
    OnezoneIa,
    Glacier,
    DeepArchive,
    IntelligentTiering,
    /// Anything the service reports that is not modelled above (e.g. GLACIER_IR).
    Other(String),
}

impl StorageTier {
    pub fn as_str(&self) -> &str {
        match self {
            StorageTier::Standard => "STANDARD",
            StorageTier::StandardIa => "STANDARD_IA",
            StorageTier::OnezoneIa => "ONEZONE_IA",
            StorageTier::Glacier => "GLACIER",
            StorageTier::DeepArchive => "DEEP_ARCHIVE",
            StorageTier::IntelligentTiering => "INTELLIGENT_TIERING",
            StorageTier::Other(name) => name,
        }
    }
}

impl From<&str> for StorageTier {
    fn from(value: &str) -> Self {
        match value {
            "STANDARD" => StorageTier::Standard,
            "STANDARD_IA" => StorageTier::StandardIa,
            "ONEZONE_IA" => StorageTier::OnezoneIa,
            "GLACIER" => StorageTier::Glacier,
            "DEEP_ARCHIVE" => StorageTier::DeepArchive,
            "INTELLIGENT_TIERING" => StorageTier::IntelligentTiering,
            other => StorageTier::Other(other.to_string()),
        }
    }
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retrieval speed accepted by the restore API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetrievalTier {
    Expedited,
    Standard,
    Bulk,
}

impl RetrievalTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalTier::Expedited => "Expedited",
            RetrievalTier::Standard => "Standard",
            RetrievalTier::Bulk => "Bulk",
        }
    }
}

impl fmt::Display for RetrievalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller asked for: a concrete tier, or the fastest one the object's
/// storage class supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TierRequest {
    Fixed(RetrievalTier),
    Fastest,
}

impl Default for TierRequest {
    fn default() -> Self {
        TierRequest::Fixed(RetrievalTier::Bulk)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown tier '{0}', expected one of Expedited, Standard, Bulk, Fastest")]
pub struct ParseTierError(String);

impl FromStr for TierRequest {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expedited" => Ok(TierRequest::Fixed(RetrievalTier::Expedited)),
            "standard" => Ok(TierRequest::Fixed(RetrievalTier::Standard)),
            "bulk" => Ok(TierRequest::Fixed(RetrievalTier::Bulk)),
            "fastest" => Ok(TierRequest::Fastest),
            _ => Err(ParseTierError(s.to_string())),
        }
    }
}

impl TryFrom<String> for TierRequest {
    type Error = ParseTierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TierRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierRequest::Fixed(tier) => fmt::Display::fmt(tier, f),
            TierRequest::Fastest => f.write_str("Fastest"),
        }
    }
}

/// One entry of a container listing, as seen at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub key: String,
    pub storage_tier: StorageTier,
}

/// One page of a listing plus the cursor for the next one.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectDescriptor>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRequest {
    pub key: String,
    pub tier: RetrievalTier,
    pub retention_days: i32,
}

impl RestoreRequest {
    pub fn new(key: impl Into<String>, tier: RetrievalTier) -> Self {
        Self {
            key: key.into(),
            tier,
            retention_days: RESTORE_RETENTION_DAYS,
        }
    }
}

/// Error record embedded in an otherwise delivered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorRecord {
    pub code: String,
    pub message: String,
}

/// Envelope returned by the restore API when the call itself went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreResponse {
    pub http_status: u16,
    pub raw_response: String,
    pub error: Option<ApiErrorRecord>,
}
