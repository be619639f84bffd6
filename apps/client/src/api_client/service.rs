//! The backend contract, one method per endpoint.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::upload::ProgressCallback;
use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{
    BrainstormRequest, Bucket, CreateBucketRequest, CreateProjectRequest, CreatePromptRequest,
    GenerationOutput, OutputKind, Project, ProjectTable, PromptTemplate, TableRow,
    UpdateProjectRequest, UpdatePromptRequest, WriteRequest,
};
use crate::settings::{Settings, SettingsPatch};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: String,
}

/// Everything the client asks of the backend. Implemented over HTTP by
/// [`ApiClient`]; tests substitute their own implementation.
#[async_trait]
pub trait ProjectService: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError>;
    async fn get_project(&self, id: &str) -> Result<Project, ClientError>;
    async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project, ClientError>;
    async fn update_project(
        &self,
        id: &str,
        request: &UpdateProjectRequest,
    ) -> Result<Project, ClientError>;
    async fn delete_project(&self, id: &str) -> Result<(), ClientError>;

    async fn list_buckets(&self, project_id: &str) -> Result<Vec<Bucket>, ClientError>;
    async fn create_bucket(
        &self,
        project_id: &str,
        request: &CreateBucketRequest,
    ) -> Result<Bucket, ClientError>;
    async fn toggle_bucket(&self, bucket_id: &str, active: bool) -> Result<Bucket, ClientError>;
    async fn update_bucket_guidance(
        &self,
        bucket_id: &str,
        guidance: &str,
    ) -> Result<Bucket, ClientError>;
    async fn upload_file_to_bucket(
        &self,
        bucket_id: &str,
        filename: &str,
        contents: Bytes,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Value, ClientError>;

    /// Project-scoped templates when `project_id` is given, global ones otherwise.
    async fn list_prompts(&self, project_id: Option<&str>)
        -> Result<Vec<PromptTemplate>, ClientError>;
    async fn create_prompt(&self, request: &CreatePromptRequest)
        -> Result<PromptTemplate, ClientError>;
    async fn update_prompt(
        &self,
        id: &str,
        request: &UpdatePromptRequest,
    ) -> Result<PromptTemplate, ClientError>;
    async fn delete_prompt(&self, id: &str) -> Result<(), ClientError>;

    async fn list_tables(&self, project_id: &str) -> Result<Vec<ProjectTable>, ClientError>;
    async fn list_table_rows(&self, table_id: &str) -> Result<Vec<TableRow>, ClientError>;
    async fn create_table_row(
        &self,
        table_id: &str,
        data: Map<String, Value>,
    ) -> Result<TableRow, ClientError>;
    async fn update_table_row(
        &self,
        row_id: &str,
        data: Map<String, Value>,
    ) -> Result<TableRow, ClientError>;
    async fn delete_table_row(&self, row_id: &str) -> Result<(), ClientError>;

    async fn generate_brainstorm(
        &self,
        request: &BrainstormRequest,
    ) -> Result<GenerationOutput, ClientError>;
    async fn generate_write(&self, request: &WriteRequest)
        -> Result<GenerationOutput, ClientError>;
    async fn list_outputs(
        &self,
        project_id: &str,
        kind: Option<OutputKind>,
    ) -> Result<Vec<GenerationOutput>, ClientError>;

    async fn get_user_settings(&self) -> Result<Settings, ClientError>;
    async fn update_user_settings(&self, patch: &SettingsPatch) -> Result<Settings, ClientError>;

    async fn health_check(&self) -> Result<HealthStatus, ClientError>;
}

impl ApiClient {
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.request::<T, ()>(Method::GET, endpoint, None).await
    }
}

#[async_trait]
impl ProjectService for ApiClient {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.get("/projects").await
    }

    async fn get_project(&self, id: &str) -> Result<Project, ClientError> {
        self.get(&format!("/projects/{id}")).await
    }

    async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project, ClientError> {
        self.request(Method::POST, "/projects", Some(request)).await
    }

    async fn update_project(
        &self,
        id: &str,
        request: &UpdateProjectRequest,
    ) -> Result<Project, ClientError> {
        self.request(Method::PUT, &format!("/projects/{id}"), Some(request))
            .await
    }

    async fn delete_project(&self, id: &str) -> Result<(), ClientError> {
        self.request_unit(Method::DELETE, &format!("/projects/{id}"))
            .await
    }

    async fn list_buckets(&self, project_id: &str) -> Result<Vec<Bucket>, ClientError> {
        self.get(&format!("/projects/{project_id}/buckets")).await
    }

    async fn create_bucket(
        &self,
        project_id: &str,
        request: &CreateBucketRequest,
    ) -> Result<Bucket, ClientError> {
        self.request(
            Method::POST,
            &format!("/projects/{project_id}/buckets"),
            Some(request),
        )
        .await
    }

    async fn toggle_bucket(&self, bucket_id: &str, active: bool) -> Result<Bucket, ClientError> {
        self.request(
            Method::POST,
            &format!("/buckets/{bucket_id}/toggle"),
            Some(&json!({ "active": active })),
        )
        .await
    }

    async fn update_bucket_guidance(
        &self,
        bucket_id: &str,
        guidance: &str,
    ) -> Result<Bucket, ClientError> {
        self.request(
            Method::PUT,
            &format!("/buckets/{bucket_id}/guidance"),
            Some(&json!({ "guidance": guidance })),
        )
        .await
    }

    async fn upload_file_to_bucket(
        &self,
        bucket_id: &str,
        filename: &str,
        contents: Bytes,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Value, ClientError> {
        self.upload_file(
            &format!("/buckets/{bucket_id}/upload"),
            filename,
            contents,
            on_progress,
        )
        .await
    }

    async fn list_prompts(
        &self,
        project_id: Option<&str>,
    ) -> Result<Vec<PromptTemplate>, ClientError> {
        let endpoint = match project_id {
            Some(id) => format!("/projects/{id}/prompts"),
            None => "/prompts".to_string(),
        };
        self.get(&endpoint).await
    }

    async fn create_prompt(
        &self,
        request: &CreatePromptRequest,
    ) -> Result<PromptTemplate, ClientError> {
        self.request(Method::POST, "/prompts", Some(request)).await
    }

    async fn update_prompt(
        &self,
        id: &str,
        request: &UpdatePromptRequest,
    ) -> Result<PromptTemplate, ClientError> {
        self.request(Method::PUT, &format!("/prompts/{id}"), Some(request))
            .await
    }

    async fn delete_prompt(&self, id: &str) -> Result<(), ClientError> {
        self.request_unit(Method::DELETE, &format!("/prompts/{id}"))
            .await
    }

    async fn list_tables(&self, project_id: &str) -> Result<Vec<ProjectTable>, ClientError> {
        self.get(&format!("/projects/{project_id}/tables")).await
    }

    async fn list_table_rows(&self, table_id: &str) -> Result<Vec<TableRow>, ClientError> {
        self.get(&format!("/tables/{table_id}/rows")).await
    }

    async fn create_table_row(
        &self,
        table_id: &str,
        data: Map<String, Value>,
    ) -> Result<TableRow, ClientError> {
        self.request(
            Method::POST,
            &format!("/tables/{table_id}/rows"),
            Some(&json!({ "data": data })),
        )
        .await
    }

    async fn update_table_row(
        &self,
        row_id: &str,
        data: Map<String, Value>,
    ) -> Result<TableRow, ClientError> {
        self.request(
            Method::PUT,
            &format!("/table-rows/{row_id}"),
            Some(&json!({ "data": data })),
        )
        .await
    }

    async fn delete_table_row(&self, row_id: &str) -> Result<(), ClientError> {
        self.request_unit(Method::DELETE, &format!("/table-rows/{row_id}"))
            .await
    }

    async fn generate_brainstorm(
        &self,
        request: &BrainstormRequest,
    ) -> Result<GenerationOutput, ClientError> {
        self.request(Method::POST, "/generate/brainstorm", Some(request))
            .await
    }

    async fn generate_write(
        &self,
        request: &WriteRequest,
    ) -> Result<GenerationOutput, ClientError> {
        self.request(Method::POST, "/generate/write", Some(request))
            .await
    }

    async fn list_outputs(
        &self,
        project_id: &str,
        kind: Option<OutputKind>,
    ) -> Result<Vec<GenerationOutput>, ClientError> {
        let endpoint = match kind {
            Some(kind) => format!("/projects/{project_id}/outputs?type={}", kind.as_str()),
            None => format!("/projects/{project_id}/outputs"),
        };
        self.get(&endpoint).await
    }

    async fn get_user_settings(&self) -> Result<Settings, ClientError> {
        self.get("/settings").await
    }

    async fn update_user_settings(&self, patch: &SettingsPatch) -> Result<Settings, ClientError> {
        self.request(Method::PUT, "/settings", Some(patch)).await
    }

    /// The health endpoint answers without an envelope.
    async fn health_check(&self) -> Result<HealthStatus, ClientError> {
        self.request_raw::<HealthStatus, ()>(Method::GET, "/health", None)
            .await
    }
}
