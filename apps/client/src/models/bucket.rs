use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BucketStatus {
    Active,
    Inactive,
    Ingesting,
    Error,
}

/// A knowledge bucket: a toggleable document collection used as generation
/// context. Owned by exactly one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    /// Participates in generation when true.
    pub active: bool,
    #[serde(default)]
    pub doc_count: u32,
    pub status: BucketStatus,
    #[serde(default)]
    pub guidance: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateBucketRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploading,
    Complete,
    Error,
}

/// Incremental report for a multipart upload. `progress` is a percentage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadProgress {
    pub file_id: String,
    pub filename: String,
    pub progress: u8,
    pub status: UploadStatus,
}
