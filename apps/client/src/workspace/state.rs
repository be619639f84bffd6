use serde::Serialize;

use crate::models::{Bucket, GenerationOutput, Project, ProjectTable, PromptTemplate};

/// Maximum number of generation outputs kept in the workspace.
pub const MAX_RECENT_OUTPUTS: usize = 50;

/// Directory and workspace state in one immutable snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectState {
    pub current_project: Option<Project>,
    pub projects: Vec<Project>,
    pub tables: Vec<ProjectTable>,
    pub buckets: Vec<Bucket>,
    pub prompts: Vec<PromptTemplate>,
    /// Newest first, at most [`MAX_RECENT_OUTPUTS`].
    pub outputs: Vec<GenerationOutput>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProjectState {
    pub fn current_project_id(&self) -> Option<&str> {
        self.current_project.as_ref().map(|p| p.id.as_str())
    }

    pub fn is_project_selected(&self) -> bool {
        self.current_project.is_some()
    }

    pub fn project_by_id(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Projects sorted by last update, most recent first.
    pub fn recent_projects(&self, limit: usize) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self.projects.iter().collect();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        projects.truncate(limit);
        projects
    }

    pub fn active_buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter().filter(|b| b.active)
    }

    pub fn project_data(&self) -> ProjectData<'_> {
        ProjectData {
            current_project: self.current_project.as_ref(),
            tables: &self.tables,
            buckets: &self.buckets,
            prompts: &self.prompts,
            outputs: &self.outputs,
        }
    }
}

/// Borrowed view of the workspace bundle for the current project.
#[derive(Debug, Clone, Copy)]
pub struct ProjectData<'a> {
    pub current_project: Option<&'a Project>,
    pub tables: &'a [ProjectTable],
    pub buckets: &'a [Bucket],
    pub prompts: &'a [PromptTemplate],
    pub outputs: &'a [GenerationOutput],
}

/// Every transition the reducer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectAction {
    SetCurrentProject(Option<Project>),
    SetProjects(Vec<Project>),
    AddProject(Project),
    UpdateProject(Project),
    RemoveProject(String),
    SetTables(Vec<ProjectTable>),
    SetBuckets(Vec<Bucket>),
    UpdateBucket(Bucket),
    SetPrompts(Vec<PromptTemplate>),
    AddPrompt(PromptTemplate),
    UpdatePrompt(PromptTemplate),
    SetOutputs(Vec<GenerationOutput>),
    AddOutput(GenerationOutput),
    SetLoading(bool),
    SetError(Option<String>),
    ClearProjectData,
}
