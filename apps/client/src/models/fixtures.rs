//! Builders for model values used across unit tests.

use chrono::{TimeZone, Utc};

use super::*;

pub(crate) fn project(id: &str, name: &str) -> Project {
    let created = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        status: ProjectStatus::Active,
        created_at: created,
        updated_at: created,
        tables: vec!["characters".to_string(), "scenes".to_string()],
        bucket_count: 0,
    }
}

pub(crate) fn bucket(id: &str, active: bool) -> Bucket {
    Bucket {
        id: id.to_string(),
        name: format!("bucket-{id}"),
        active,
        doc_count: 4,
        status: if active {
            BucketStatus::Active
        } else {
            BucketStatus::Inactive
        },
        guidance: None,
        description: None,
        last_updated: None,
    }
}

pub(crate) fn prompt(id: &str, content: &str) -> PromptTemplate {
    PromptTemplate {
        id: id.to_string(),
        name: format!("prompt-{id}"),
        content: content.to_string(),
        tone: None,
        style: None,
        goal: None,
        project_id: None,
        created_at: None,
    }
}

pub(crate) fn table(id: &str, name: &str) -> ProjectTable {
    ProjectTable {
        id: id.to_string(),
        name: name.to_string(),
        columns: vec![ColumnDef {
            name: "name".to_string(),
            column_type: "text".to_string(),
        }],
        row_count: 0,
    }
}

pub(crate) fn output(id: &str, kind: OutputKind, version: u32) -> GenerationOutput {
    GenerationOutput {
        id: id.to_string(),
        kind,
        content: format!("draft {id}"),
        project_id: "p1".to_string(),
        version,
        created_at: Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
        metadata: OutputMetadata::default(),
    }
}
