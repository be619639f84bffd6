use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Brainstorm,
    Write,
    Edit,
    Chat,
}

impl OutputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Brainstorm => "brainstorm",
            OutputKind::Write => "write",
            OutputKind::Edit => "edit",
            OutputKind::Chat => "chat",
        }
    }
}

/// What produced an output: buckets, prompt and source rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutputMetadata {
    #[serde(default)]
    pub buckets_used: Vec<String>,
    #[serde(default)]
    pub prompt_used: Option<String>,
    #[serde(default)]
    pub source_table: Option<String>,
    #[serde(default)]
    pub source_rows: Vec<i64>,
    #[serde(default)]
    pub tone: Option<String>,
}

/// A generation result. Immutable once created; `version` increases per kind
/// per project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationOutput {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OutputKind,
    pub content: String,
    pub project_id: String,
    #[serde(default)]
    pub version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: OutputMetadata,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TonePreset {
    #[default]
    Neutral,
    CheesyRomcom,
    RomanticDramedy,
    ShakespeareanRomance,
    Professional,
    Academic,
    Creative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainstormRequest {
    pub project_id: String,
    pub source_table: String,
    pub selected_rows: Vec<i64>,
    pub selected_buckets: Vec<String>,
    pub tone: TonePreset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easter_egg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteRequest {
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brainstorm_version: Option<u32>,
    pub source_table: String,
    pub selected_rows: Vec<i64>,
    pub tone: TonePreset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}
