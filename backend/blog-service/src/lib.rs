/// Blog Service Library
///
/// A server-rendered social blog: users publish posts optionally tagged to
/// a group, comment on each other's posts and follow authors to build a
/// personal feed.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `routes`: URL table
/// - `models`: Users, groups, posts, comments and follow edges
/// - `services`: Feeds, pagination, access control, sessions and media
/// - `forms`: Form parsing and validation
/// - `templates`: HTML rendering
/// - `db`: Store trait with PostgreSQL and in-memory implementations
/// - `middleware`: Request actor extraction
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod templates;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
