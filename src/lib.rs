pub mod application;
pub mod domain;
pub mod engine;
pub mod infrastructure;
pub mod shared;

pub use engine::SyncEngine;
pub use shared::config::AppConfig;
pub use shared::error::AppError;
