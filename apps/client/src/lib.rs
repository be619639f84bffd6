//! Client-side state core for the Nell writing platform: settings,
//! notifications, project directory and workspace state, request tracking and
//! the backend client.

pub mod api_client;
pub mod app;
pub mod config;
pub mod errors;
pub mod models;
pub mod notifications;
pub mod request;
pub mod settings;
pub mod storage;
pub mod workspace;

pub use app::AppState;
pub use config::Config;
pub use errors::ClientError;
