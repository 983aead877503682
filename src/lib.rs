pub mod app;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod logs;
pub mod predict;
pub mod state;

pub use app::build_app;
pub use error::{AppError, AppResult};
pub use state::AppState;
