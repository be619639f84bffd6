use super::state::{ProjectAction, ProjectState, MAX_RECENT_OUTPUTS};

/// Applies one action and returns the next snapshot. Pure: no I/O, no clock.
pub fn reduce(mut state: ProjectState, action: ProjectAction) -> ProjectState {
    match action {
        ProjectAction::SetCurrentProject(project) => {
            state.current_project = project;
        }
        ProjectAction::SetProjects(projects) => {
            state.projects = projects;
        }
        ProjectAction::AddProject(project) => {
            state.projects.push(project);
        }
        ProjectAction::UpdateProject(project) => {
            if let Some(existing) = state.projects.iter_mut().find(|p| p.id == project.id) {
                *existing = project.clone();
            }
            if state.current_project_id() == Some(project.id.as_str()) {
                state.current_project = Some(project);
            }
        }
        ProjectAction::RemoveProject(id) => {
            state.projects.retain(|p| p.id != id);
            if state.current_project_id() == Some(id.as_str()) {
                clear_workspace(&mut state);
            }
        }
        ProjectAction::SetTables(tables) => {
            state.tables = tables;
        }
        ProjectAction::SetBuckets(buckets) => {
            state.buckets = buckets;
        }
        ProjectAction::UpdateBucket(bucket) => {
            if let Some(existing) = state.buckets.iter_mut().find(|b| b.id == bucket.id) {
                *existing = bucket;
            }
        }
        ProjectAction::SetPrompts(prompts) => {
            state.prompts = prompts;
        }
        ProjectAction::AddPrompt(prompt) => {
            // Ids are unique per scope; re-adding a known id replaces it.
            match state.prompts.iter_mut().find(|p| p.id == prompt.id) {
                Some(existing) => *existing = prompt,
                None => state.prompts.push(prompt),
            }
        }
        ProjectAction::UpdatePrompt(prompt) => {
            if let Some(existing) = state.prompts.iter_mut().find(|p| p.id == prompt.id) {
                *existing = prompt;
            }
        }
        ProjectAction::SetOutputs(outputs) => {
            state.outputs = outputs;
        }
        ProjectAction::AddOutput(output) => {
            state.outputs.insert(0, output);
            state.outputs.truncate(MAX_RECENT_OUTPUTS);
        }
        ProjectAction::SetLoading(loading) => {
            state.loading = loading;
        }
        ProjectAction::SetError(error) => {
            state.error = error;
        }
        ProjectAction::ClearProjectData => {
            clear_workspace(&mut state);
        }
    }
    state
}

/// Resets the current pointer and the four workspace collections together.
/// Loading and error flags are left alone.
fn clear_workspace(state: &mut ProjectState) {
    state.current_project = None;
    state.tables.clear();
    state.buckets.clear();
    state.prompts.clear();
    state.outputs.clear();
}
