pub mod bucket;
pub mod output;
pub mod project;
pub mod prompt;
pub mod table;

#[cfg(test)]
pub(crate) mod fixtures;

pub use bucket::{Bucket, BucketStatus, CreateBucketRequest, UploadProgress, UploadStatus};
pub use output::{
    BrainstormRequest, GenerationOutput, OutputKind, OutputMetadata, TonePreset, WriteRequest,
};
pub use project::{CreateProjectRequest, Project, ProjectStatus, UpdateProjectRequest};
pub use prompt::{CreatePromptRequest, PromptTemplate, UpdatePromptRequest};
pub use table::{ColumnDef, ProjectTable, TableRow};
