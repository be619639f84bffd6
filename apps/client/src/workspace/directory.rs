//! Shared handle over [`ProjectState`]: dispatch plus the directory
//! operations that also touch durable storage.

use parking_lot::RwLock;
use tracing::{debug, info};

use super::reducer::reduce;
use super::state::{ProjectAction, ProjectState};
use crate::models::Project;
use crate::storage::{Persistence, CURRENT_PROJECT_KEY};

pub struct ProjectStore {
    state: RwLock<ProjectState>,
    persistence: Persistence,
}

impl ProjectStore {
    pub fn new(persistence: Persistence) -> Self {
        Self {
            state: RwLock::new(ProjectState::default()),
            persistence,
        }
    }

    pub fn snapshot(&self) -> ProjectState {
        self.state.read().clone()
    }

    /// Runs `f` against the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&ProjectState) -> R) -> R {
        f(&*self.state.read())
    }

    pub fn dispatch(&self, action: ProjectAction) {
        let mut state = self.state.write();
        let current = std::mem::take(&mut *state);
        *state = reduce(current, action);
    }

    /// Dispatches several actions under one lock so no reader observes the
    /// intermediate states.
    fn dispatch_all(&self, actions: impl IntoIterator<Item = ProjectAction>) {
        let mut state = self.state.write();
        let mut next = std::mem::take(&mut *state);
        for action in actions {
            next = reduce(next, action);
        }
        *state = next;
    }

    /// Moves the current-project pointer and persists the choice.
    ///
    /// Switching to a different project, or to none, clears the workspace
    /// collections in the same transition. Re-selecting the current project
    /// only refreshes the pointer.
    pub fn set_current(&self, project: Option<Project>) {
        let same_project = {
            let state = self.state.read();
            match (&state.current_project, &project) {
                (Some(current), Some(next)) => current.id == next.id,
                _ => false,
            }
        };

        match &project {
            Some(p) => {
                info!("Selecting project {} ({})", p.id, p.name);
                self.persistence.write(CURRENT_PROJECT_KEY, &p.id);
            }
            None => {
                info!("Clearing current project");
                self.persistence.remove(CURRENT_PROJECT_KEY);
            }
        }

        if same_project {
            self.dispatch(ProjectAction::SetCurrentProject(project));
        } else {
            self.dispatch_all([
                ProjectAction::ClearProjectData,
                ProjectAction::SetCurrentProject(project),
            ]);
        }
    }

    pub fn select_project(&self, project: Project) {
        self.set_current(Some(project));
    }

    /// Selects a known project by id. Returns false if it is not in the list.
    pub fn select_project_by_id(&self, id: &str) -> bool {
        let found = self.with_state(|s| s.project_by_id(id).cloned());
        match found {
            Some(project) => {
                self.set_current(Some(project));
                true
            }
            None => false,
        }
    }

    pub fn clear_current_project(&self) {
        self.set_current(None);
    }

    /// Replaces the project list, then tries to restore the persisted
    /// current project against it.
    pub fn set_all(&self, projects: Vec<Project>) {
        debug!("Loaded {} projects", projects.len());
        self.dispatch(ProjectAction::SetProjects(projects));
        self.restore_current();
    }

    pub fn add(&self, project: Project) {
        self.dispatch(ProjectAction::AddProject(project));
    }

    pub fn update(&self, project: Project) {
        self.dispatch(ProjectAction::UpdateProject(project));
    }

    pub fn remove(&self, id: &str) {
        let was_current = self.with_state(|s| s.current_project_id() == Some(id));
        self.dispatch(ProjectAction::RemoveProject(id.to_string()));
        if was_current {
            self.persistence.remove(CURRENT_PROJECT_KEY);
        }
    }

    /// Resolves the persisted project id against the loaded list. Returns the
    /// restored project, if any. A missing or stale id is not an error.
    pub fn restore_current(&self) -> Option<Project> {
        let saved_id = self.persistence.read(CURRENT_PROJECT_KEY)?;
        let candidate = self.with_state(|s| {
            if s.projects.is_empty() || s.current_project_id() == Some(saved_id.as_str()) {
                return None;
            }
            s.project_by_id(&saved_id).cloned()
        });

        match candidate {
            Some(project) => {
                info!("Restored current project {}", project.id);
                self.dispatch_all([
                    ProjectAction::ClearProjectData,
                    ProjectAction::SetCurrentProject(Some(project.clone())),
                ]);
                Some(project)
            }
            None => {
                debug!("Saved project {saved_id} not restored");
                None
            }
        }
    }
}
