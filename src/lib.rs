pub mod admin;
pub mod analytics;
pub mod app;
pub mod config;
pub mod content;
pub mod errors;
pub mod export;
pub mod filters;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod state;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
