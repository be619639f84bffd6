//! Project directory and workspace state.

pub mod directory;
pub mod reducer;
pub mod state;
pub mod sync;

pub use directory::ProjectStore;
pub use reducer::reduce;
pub use state::{ProjectAction, ProjectData, ProjectState, MAX_RECENT_OUTPUTS};
pub use sync::WorkspaceSync;
