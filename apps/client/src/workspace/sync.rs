//! Runs backend calls through request trackers and merges the results into
//! the project store.
//!
//! Every call goes through a [`RequestTracker`], so only the latest call of
//! each kind writes state and failures land in notifications rather than in
//! the caller's lap.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::directory::ProjectStore;
use super::state::ProjectAction;
use crate::api_client::ProjectService;
use crate::models::{
    BrainstormRequest, Bucket, CreateProjectRequest, CreatePromptRequest, GenerationOutput,
    OutputKind, Project, ProjectTable, PromptTemplate, UpdateProjectRequest, UpdatePromptRequest,
    WriteRequest,
};
use crate::notifications::Notifier;
use crate::errors::error_message;
use crate::request::{RequestOptions, RequestTracker, Settled};

/// Tables, buckets, prompts and outputs fetched together for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceBundle {
    pub tables: Vec<ProjectTable>,
    pub buckets: Vec<Bucket>,
    pub prompts: Vec<PromptTemplate>,
    pub outputs: Vec<GenerationOutput>,
}

fn announced<T: Clone + Send + Sync + 'static>(
    label: &'static str,
    notifier: &Arc<dyn Notifier>,
    message: &str,
) -> RequestTracker<T> {
    RequestTracker::with_options(
        label,
        Some(notifier.clone()),
        RequestOptions::default().success_message(message),
    )
}

pub struct WorkspaceSync {
    service: Arc<dyn ProjectService>,
    store: Arc<ProjectStore>,
    projects: RequestTracker<Vec<Project>>,
    project: RequestTracker<Project>,
    deletion: RequestTracker<()>,
    workspace: RequestTracker<WorkspaceBundle>,
    bucket: RequestTracker<Bucket>,
    prompt: RequestTracker<PromptTemplate>,
    generation: RequestTracker<GenerationOutput>,
    outputs: RequestTracker<Vec<GenerationOutput>>,
}

impl WorkspaceSync {
    pub fn new(
        service: Arc<dyn ProjectService>,
        store: Arc<ProjectStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            projects: RequestTracker::new("projects", notifier.clone()),
            project: announced("project", &notifier, "Project saved"),
            deletion: announced("deletion", &notifier, "Project deleted"),
            workspace: RequestTracker::new("workspace", notifier.clone()),
            bucket: RequestTracker::new("bucket", notifier.clone()),
            prompt: announced("prompt", &notifier, "Prompt saved"),
            generation: announced("generation", &notifier, "Generation complete"),
            outputs: RequestTracker::new("outputs", notifier),
            service,
            store,
        }
    }

    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    pub fn generation_tracker(&self) -> &RequestTracker<GenerationOutput> {
        &self.generation
    }

    /// Fetches the project list, replaces the directory and restores the
    /// persisted current project if it is still present.
    pub async fn load_projects(&self) -> Option<Vec<Project>> {
        let service = self.service.clone();
        let projects = self
            .projects
            .execute(async move { service.list_projects().await })
            .await?;
        self.store.set_all(projects.clone());
        Some(projects)
    }

    pub async fn create_project(&self, request: CreateProjectRequest) -> Option<Project> {
        let service = self.service.clone();
        let project = self
            .project
            .execute(async move { service.create_project(&request).await })
            .await?;
        info!("Created project {}", project.id);
        self.store.add(project.clone());
        self.store.select_project(project.clone());
        Some(project)
    }

    pub async fn update_project(&self, id: &str, request: UpdateProjectRequest) -> Option<Project> {
        let service = self.service.clone();
        let id = id.to_string();
        let project = self
            .project
            .execute(async move { service.update_project(&id, &request).await })
            .await?;
        self.store.update(project.clone());
        Some(project)
    }

    pub async fn delete_project(&self, id: &str) -> bool {
        let service = self.service.clone();
        let target = id.to_string();
        let deleted = self
            .deletion
            .execute(async move { service.delete_project(&target).await })
            .await;
        if deleted.is_some() {
            self.store.remove(id);
        }
        deleted.is_some()
    }

    /// Selects `project` and loads its workspace. The workspace collections are
    /// cleared first, so a failed load leaves an empty, consistent workspace.
    pub async fn open_project(&self, project: Project) -> Option<WorkspaceBundle> {
        self.store.select_project(project.clone());
        self.load_workspace(&project.id).await
    }

    pub async fn load_workspace(&self, project_id: &str) -> Option<WorkspaceBundle> {
        self.store.dispatch(ProjectAction::SetLoading(true));
        self.store.dispatch(ProjectAction::SetError(None));

        let service = self.service.clone();
        let id = project_id.to_string();
        let settled = self
            .workspace
            .settle(async move {
                let (tables, buckets, prompts, outputs) = tokio::try_join!(
                    service.list_tables(&id),
                    service.list_buckets(&id),
                    service.list_prompts(Some(&id)),
                    service.list_outputs(&id, None),
                )?;
                Ok(WorkspaceBundle {
                    tables,
                    buckets,
                    prompts,
                    outputs,
                })
            })
            .await;

        // A newer load owns the loading and error flags now.
        let outcome = match settled {
            Settled::Latest(outcome) => outcome,
            Settled::Superseded(_) => {
                debug!("Workspace load for {project_id} superseded");
                return None;
            }
        };

        self.store.dispatch(ProjectAction::SetLoading(false));

        // The user may have switched projects without starting a new load.
        if self.store.with_state(|s| s.current_project_id() != Some(project_id)) {
            warn!("Discarding workspace for {project_id}: no longer current");
            return None;
        }

        let bundle = match outcome {
            Ok(bundle) => bundle,
            Err(e) => {
                self.store
                    .dispatch(ProjectAction::SetError(Some(error_message(&e))));
                return None;
            }
        };

        self.store
            .dispatch(ProjectAction::SetTables(bundle.tables.clone()));
        self.store
            .dispatch(ProjectAction::SetBuckets(bundle.buckets.clone()));
        self.store
            .dispatch(ProjectAction::SetPrompts(bundle.prompts.clone()));
        self.store
            .dispatch(ProjectAction::SetOutputs(bundle.outputs.clone()));
        info!(
            "Loaded workspace for {project_id}: {} tables, {} buckets, {} prompts, {} outputs",
            bundle.tables.len(),
            bundle.buckets.len(),
            bundle.prompts.len(),
            bundle.outputs.len()
        );
        Some(bundle)
    }

    pub async fn toggle_bucket(&self, bucket_id: &str, active: bool) -> Option<Bucket> {
        let service = self.service.clone();
        let id = bucket_id.to_string();
        let bucket = self
            .bucket
            .execute(async move { service.toggle_bucket(&id, active).await })
            .await?;
        self.store.dispatch(ProjectAction::UpdateBucket(bucket.clone()));
        Some(bucket)
    }

    pub async fn update_bucket_guidance(&self, bucket_id: &str, guidance: &str) -> Option<Bucket> {
        let service = self.service.clone();
        let id = bucket_id.to_string();
        let guidance = guidance.to_string();
        let bucket = self
            .bucket
            .execute(async move { service.update_bucket_guidance(&id, &guidance).await })
            .await?;
        self.store.dispatch(ProjectAction::UpdateBucket(bucket.clone()));
        Some(bucket)
    }

    pub async fn create_prompt(&self, request: CreatePromptRequest) -> Option<PromptTemplate> {
        let service = self.service.clone();
        let prompt = self
            .prompt
            .execute(async move { service.create_prompt(&request).await })
            .await?;
        self.store.dispatch(ProjectAction::AddPrompt(prompt.clone()));
        Some(prompt)
    }

    pub async fn update_prompt(
        &self,
        id: &str,
        request: UpdatePromptRequest,
    ) -> Option<PromptTemplate> {
        let service = self.service.clone();
        let id = id.to_string();
        let prompt = self
            .prompt
            .execute(async move { service.update_prompt(&id, &request).await })
            .await?;
        self.store.dispatch(ProjectAction::UpdatePrompt(prompt.clone()));
        Some(prompt)
    }

    pub async fn generate_brainstorm(&self, request: BrainstormRequest) -> Option<GenerationOutput> {
        let service = self.service.clone();
        let output = self
            .generation
            .execute(async move { service.generate_brainstorm(&request).await })
            .await?;
        self.admit_output(output.clone());
        Some(output)
    }

    pub async fn generate_write(&self, request: WriteRequest) -> Option<GenerationOutput> {
        let service = self.service.clone();
        let output = self
            .generation
            .execute(async move { service.generate_write(&request).await })
            .await?;
        self.admit_output(output.clone());
        Some(output)
    }

    /// Replaces the output list for the current project, optionally filtered
    /// to one kind.
    pub async fn refresh_outputs(&self, kind: Option<OutputKind>) -> Option<Vec<GenerationOutput>> {
        let project_id = self.store.with_state(|s| s.current_project_id().map(str::to_string))?;
        let service = self.service.clone();
        let id = project_id.clone();
        let outputs = self
            .outputs
            .execute(async move { service.list_outputs(&id, kind).await })
            .await?;
        if self.store.with_state(|s| s.current_project_id() == Some(project_id.as_str())) {
            self.store.dispatch(ProjectAction::SetOutputs(outputs.clone()));
        }
        Some(outputs)
    }

    /// Outputs for a project other than the current one are not admitted.
    fn admit_output(&self, output: GenerationOutput) {
        let belongs = self
            .store
            .with_state(|s| s.current_project_id() == Some(output.project_id.as_str()));
        if belongs {
            self.store.dispatch(ProjectAction::AddOutput(output));
        } else {
            warn!(
                "Output {} is for project {}, not the current one",
                output.id, output.project_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use serde_json::{Map, Value};

    use super::*;
    use crate::api_client::{HealthStatus, ProgressCallback};
    use crate::errors::ClientError;
    use crate::models::fixtures::{bucket, output, project, prompt, table};
    use crate::models::{CreateBucketRequest, TableRow, TonePreset};
    use crate::notifications::{NotificationCenter, NotificationKind};
    use crate::settings::{Settings, SettingsPatch};
    use crate::storage::{Persistence, CURRENT_PROJECT_KEY};

    /// Serves deterministic per-project data.
    #[derive(Default)]
    struct StubService {
        projects: Mutex<Vec<Project>>,
        fail_buckets: bool,
        /// Per-project latency for `list_tables`.
        delays: Vec<(String, Duration)>,
    }

    fn unsupported<T>() -> Result<T, ClientError> {
        Err(ClientError::Other("unsupported by stub".to_string()))
    }

    fn output_for(project_id: &str, id: &str, kind: OutputKind) -> GenerationOutput {
        GenerationOutput {
            project_id: project_id.to_string(),
            ..output(id, kind, 1)
        }
    }

    #[async_trait]
    impl ProjectService for StubService {
        async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
            Ok(self.projects.lock().clone())
        }
        async fn get_project(&self, id: &str) -> Result<Project, ClientError> {
            self.projects
                .lock()
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| ClientError::Service {
                    status: 404,
                    message: "Project not found".to_string(),
                    details: None,
                })
        }
        async fn create_project(
            &self,
            request: &CreateProjectRequest,
        ) -> Result<Project, ClientError> {
            let created = project(&format!("p{}", self.projects.lock().len() + 1), &request.name);
            self.projects.lock().push(created.clone());
            Ok(created)
        }
        async fn update_project(
            &self,
            id: &str,
            request: &UpdateProjectRequest,
        ) -> Result<Project, ClientError> {
            let mut updated = self.get_project(id).await?;
            if let Some(name) = &request.name {
                updated.name = name.clone();
            }
            Ok(updated)
        }
        async fn delete_project(&self, id: &str) -> Result<(), ClientError> {
            self.projects.lock().retain(|p| p.id != id);
            Ok(())
        }
        async fn list_buckets(&self, _project_id: &str) -> Result<Vec<Bucket>, ClientError> {
            if self.fail_buckets {
                return Err(ClientError::Network("Network error".to_string()));
            }
            Ok(vec![bucket("b1", true), bucket("b2", false)])
        }
        async fn create_bucket(
            &self,
            _project_id: &str,
            _request: &CreateBucketRequest,
        ) -> Result<Bucket, ClientError> {
            unsupported()
        }
        async fn toggle_bucket(&self, bucket_id: &str, active: bool) -> Result<Bucket, ClientError> {
            Ok(bucket(bucket_id, active))
        }
        async fn update_bucket_guidance(
            &self,
            bucket_id: &str,
            guidance: &str,
        ) -> Result<Bucket, ClientError> {
            Ok(Bucket {
                guidance: Some(guidance.to_string()),
                ..bucket(bucket_id, true)
            })
        }
        async fn upload_file_to_bucket(
            &self,
            _bucket_id: &str,
            _filename: &str,
            _contents: Bytes,
            _on_progress: Option<ProgressCallback>,
        ) -> Result<Value, ClientError> {
            unsupported()
        }
        async fn list_prompts(
            &self,
            project_id: Option<&str>,
        ) -> Result<Vec<PromptTemplate>, ClientError> {
            let id = project_id.unwrap_or("global");
            Ok(vec![prompt(&format!("{id}-pr"), "Keep it short")])
        }
        async fn create_prompt(
            &self,
            request: &CreatePromptRequest,
        ) -> Result<PromptTemplate, ClientError> {
            Ok(prompt("new-pr", &request.content))
        }
        async fn update_prompt(
            &self,
            id: &str,
            request: &UpdatePromptRequest,
        ) -> Result<PromptTemplate, ClientError> {
            Ok(prompt(id, request.content.as_deref().unwrap_or_default()))
        }
        async fn delete_prompt(&self, _id: &str) -> Result<(), ClientError> {
            unsupported()
        }
        async fn list_tables(&self, project_id: &str) -> Result<Vec<ProjectTable>, ClientError> {
            let delay = self
                .delays
                .iter()
                .find(|(id, _)| id == project_id)
                .map(|(_, delay)| *delay);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(vec![table(&format!("{project_id}-t1"), "characters")])
        }
        async fn list_table_rows(&self, _table_id: &str) -> Result<Vec<TableRow>, ClientError> {
            unsupported()
        }
        async fn create_table_row(
            &self,
            _table_id: &str,
            _data: Map<String, Value>,
        ) -> Result<TableRow, ClientError> {
            unsupported()
        }
        async fn update_table_row(
            &self,
            _row_id: &str,
            _data: Map<String, Value>,
        ) -> Result<TableRow, ClientError> {
            unsupported()
        }
        async fn delete_table_row(&self, _row_id: &str) -> Result<(), ClientError> {
            unsupported()
        }
        async fn generate_brainstorm(
            &self,
            request: &BrainstormRequest,
        ) -> Result<GenerationOutput, ClientError> {
            Ok(output_for(&request.project_id, "gen-1", OutputKind::Brainstorm))
        }
        async fn generate_write(
            &self,
            request: &WriteRequest,
        ) -> Result<GenerationOutput, ClientError> {
            Ok(output_for(&request.project_id, "gen-2", OutputKind::Write))
        }
        async fn list_outputs(
            &self,
            project_id: &str,
            kind: Option<OutputKind>,
        ) -> Result<Vec<GenerationOutput>, ClientError> {
            let all = vec![
                output_for(project_id, &format!("{project_id}-o1"), OutputKind::Brainstorm),
                output_for(project_id, &format!("{project_id}-o2"), OutputKind::Write),
            ];
            Ok(all
                .into_iter()
                .filter(|o| kind.map_or(true, |k| o.kind == k))
                .collect())
        }
        async fn get_user_settings(&self) -> Result<Settings, ClientError> {
            Ok(Settings::default())
        }
        async fn update_user_settings(
            &self,
            patch: &SettingsPatch,
        ) -> Result<Settings, ClientError> {
            Ok(Settings::default().merged(patch.clone()))
        }
        async fn health_check(&self) -> Result<HealthStatus, ClientError> {
            Ok(HealthStatus {
                status: "healthy".to_string(),
                version: "test".to_string(),
            })
        }
    }

    struct Harness {
        sync: WorkspaceSync,
        center: Arc<NotificationCenter>,
        persistence: Persistence,
    }

    fn harness(service: StubService) -> Harness {
        let persistence = Persistence::in_memory();
        let center = Arc::new(NotificationCenter::default());
        let store = Arc::new(ProjectStore::new(persistence.clone()));
        let sync = WorkspaceSync::new(Arc::new(service), store, center.clone());
        Harness {
            sync,
            center,
            persistence,
        }
    }

    fn brainstorm(project_id: &str) -> BrainstormRequest {
        BrainstormRequest {
            project_id: project_id.to_string(),
            source_table: "characters".to_string(),
            selected_rows: vec![1, 2],
            selected_buckets: vec!["b1".to_string()],
            tone: TonePreset::CheesyRomcom,
            easter_egg: None,
            custom_prompt: None,
        }
    }

    #[tokio::test]
    async fn test_open_project_loads_workspace() {
        let h = harness(StubService::default());

        let bundle = h.sync.open_project(project("p1", "Novel")).await.unwrap();

        let state = h.sync.store().snapshot();
        assert_eq!(state.current_project_id(), Some("p1"));
        assert_eq!(state.tables, bundle.tables);
        assert_eq!(state.tables[0].id, "p1-t1");
        assert_eq!(state.buckets.len(), 2);
        assert_eq!(state.prompts[0].id, "p1-pr");
        assert_eq!(state.outputs.len(), 2);
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(h.persistence.read(CURRENT_PROJECT_KEY).as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_failed_workspace_load_sets_error_and_notifies() {
        let h = harness(StubService {
            fail_buckets: true,
            ..Default::default()
        });

        let bundle = h.sync.open_project(project("p1", "Novel")).await;

        assert_eq!(bundle, None);
        let state = h.sync.store().snapshot();
        assert_eq!(state.error.as_deref(), Some("Network error"));
        assert!(!state.loading);
        assert!(state.tables.is_empty());
        let notes = h.center.snapshot();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_toggle_bucket_merges_by_id() {
        let h = harness(StubService::default());
        h.sync.open_project(project("p1", "Novel")).await.unwrap();

        h.sync.toggle_bucket("b2", true).await.unwrap();
        h.sync.update_bucket_guidance("b1", "Focus on dialogue").await.unwrap();

        let state = h.sync.store().snapshot();
        assert_eq!(state.buckets.len(), 2);
        assert!(state.buckets.iter().all(|b| b.active));
        assert_eq!(state.buckets[0].guidance.as_deref(), Some("Focus on dialogue"));
    }

    #[tokio::test]
    async fn test_generation_admitted_only_for_current_project() {
        let h = harness(StubService::default());
        h.sync.open_project(project("p1", "Novel")).await.unwrap();

        let own = h.sync.generate_brainstorm(brainstorm("p1")).await.unwrap();
        let foreign = h.sync.generate_brainstorm(brainstorm("p9")).await.unwrap();

        let state = h.sync.store().snapshot();
        assert_eq!(state.outputs[0].id, own.id);
        assert!(state.outputs.iter().all(|o| o.project_id == "p1"));
        assert_eq!(foreign.project_id, "p9");
        let successes = h
            .center
            .snapshot()
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Success)
            .count();
        assert_eq!(successes, 2);
    }

    #[tokio::test]
    async fn test_refresh_outputs_filters_by_kind() {
        let h = harness(StubService::default());
        assert_eq!(h.sync.refresh_outputs(None).await, None);
        h.sync.open_project(project("p1", "Novel")).await.unwrap();

        let outputs = h.sync.refresh_outputs(Some(OutputKind::Write)).await.unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(h.sync.store().snapshot().outputs, outputs);
    }

    #[tokio::test]
    async fn test_create_prompt_adds_to_workspace() {
        let h = harness(StubService::default());
        h.sync.open_project(project("p1", "Novel")).await.unwrap();

        h.sync
            .create_prompt(CreatePromptRequest {
                name: "Tight".to_string(),
                content: "Cut adverbs".to_string(),
                tone: None,
                style: None,
                goal: None,
                project_id: Some("p1".to_string()),
            })
            .await
            .unwrap();

        let state = h.sync.store().snapshot();
        assert_eq!(state.prompts.len(), 2);
        assert!(state.prompts.iter().any(|p| p.content == "Cut adverbs"));
    }

    #[tokio::test]
    async fn test_load_projects_restores_saved_selection() {
        let service = StubService::default();
        *service.projects.lock() = vec![project("p1", "Novel"), project("p2", "Essay")];
        let h = harness(service);
        h.persistence.write(CURRENT_PROJECT_KEY, "p2");

        let projects = h.sync.load_projects().await.unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(h.sync.store().snapshot().current_project_id(), Some("p2"));
    }

    #[tokio::test]
    async fn test_create_and_delete_current_project() {
        let h = harness(StubService::default());

        let created = h
            .sync
            .create_project(CreateProjectRequest {
                name: "Memoir".to_string(),
                description: None,
                tables: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(h.sync.store().snapshot().current_project_id(), Some(created.id.as_str()));

        assert!(h.sync.delete_project(&created.id).await);

        let state = h.sync.store().snapshot();
        assert!(state.projects.is_empty());
        assert_eq!(state.current_project, None);
        assert_eq!(h.persistence.read(CURRENT_PROJECT_KEY), None);
    }

    #[tokio::test]
    async fn test_workspace_for_previous_project_is_discarded() {
        let h = harness(StubService::default());
        h.sync.open_project(project("p2", "Essay")).await.unwrap();

        let stale = h.sync.load_workspace("p1").await;

        assert_eq!(stale, None);
        let state = h.sync.store().snapshot();
        assert_eq!(state.tables[0].id, "p2-t1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_loses_to_newer_selection() {
        let h = Arc::new(harness(StubService {
            delays: vec![("p1".to_string(), Duration::from_millis(500))],
            ..Default::default()
        }));

        let slow = {
            let h = h.clone();
            tokio::spawn(async move { h.sync.open_project(project("p1", "Novel")).await })
        };
        tokio::task::yield_now().await;

        let fast = h.sync.open_project(project("p2", "Essay")).await;

        assert!(fast.is_some());
        assert_eq!(slow.await.unwrap(), None);
        let state = h.sync.store().snapshot();
        assert_eq!(state.current_project_id(), Some("p2"));
        assert_eq!(state.tables[0].id, "p2-t1");
        assert!(h.center.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_load_finishing_first_leaves_newer_loading() {
        let h = Arc::new(harness(StubService {
            delays: vec![
                ("p3".to_string(), Duration::from_millis(50)),
                ("p1".to_string(), Duration::from_millis(500)),
            ],
            ..Default::default()
        }));

        let older = {
            let h = h.clone();
            tokio::spawn(async move { h.sync.open_project(project("p3", "Poems")).await })
        };
        tokio::task::yield_now().await;
        let newer = {
            let h = h.clone();
            tokio::spawn(async move { h.sync.open_project(project("p1", "Novel")).await })
        };
        tokio::task::yield_now().await;

        assert_eq!(older.await.unwrap(), None);
        let mid = h.sync.store().snapshot();
        assert_eq!(mid.current_project_id(), Some("p1"));
        assert!(mid.loading);
        assert_eq!(mid.error, None);
        assert!(mid.tables.is_empty());

        assert!(newer.await.unwrap().is_some());
        let done = h.sync.store().snapshot();
        assert!(!done.loading);
        assert_eq!(done.tables[0].id, "p1-t1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_for_cleared_project_stops_loading() {
        let h = Arc::new(harness(StubService {
            delays: vec![("p1".to_string(), Duration::from_millis(100))],
            ..Default::default()
        }));

        let load = {
            let h = h.clone();
            tokio::spawn(async move { h.sync.open_project(project("p1", "Novel")).await })
        };
        tokio::task::yield_now().await;
        h.sync.store().clear_current_project();

        assert_eq!(load.await.unwrap(), None);
        let state = h.sync.store().snapshot();
        assert!(!state.loading);
        assert_eq!(state.current_project, None);
        assert!(state.tables.is_empty());
    }
}
