use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod nullable;
pub mod repo;
#[cfg(test)]
pub(crate) mod repo_memory;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
