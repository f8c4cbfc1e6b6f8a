use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::repo_types::User,
};

/// Query string of `GET /user`. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct UserLookup {
    pub id: Option<String>,
    pub name: Option<String>,
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users)).route(
        "/user",
        get(get_user)
            .post(create_user)
            .put(update_user)
            .delete(delete_user),
    )
}

fn decode_body(payload: Result<Json<User>, JsonRejection>) -> AppResult<User> {
    payload
        .map(|Json(user)| user)
        .map_err(|rejection| AppError::Decode(rejection.body_text()))
}

fn require_id(user: &User) -> AppResult<i64> {
    user.id().ok_or_else(|| AppError::Validation("id required".into()))
}

/// `username` and `password` back NOT NULL columns.
fn require_credentials(user: &User) -> AppResult<()> {
    if user.username.is_present() && user.password.is_present() {
        Ok(())
    } else {
        Err(AppError::Validation("username and password required".into()))
    }
}

/// GET /users
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.users.list_all().await?;
    Ok(Json(users))
}

/// GET /user?id=ID or /user?name=NAME
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Query(lookup): Query<UserLookup>,
) -> AppResult<Json<User>> {
    let id = lookup.id.filter(|v| !v.is_empty());
    let name = lookup.name.filter(|v| !v.is_empty());

    let user = match (id, name) {
        (Some(raw), None) => {
            let id = raw
                .parse::<i64>()
                .map_err(|_| AppError::Validation(format!("invalid id {:?}", raw)))?;
            state.users.get_by_id(id).await?
        }
        (None, Some(name)) => state.users.get_by_username(&name).await?,
        (Some(_), Some(_)) => {
            return Err(AppError::Validation("id and name are mutually exclusive".into()))
        }
        (None, None) => return Err(AppError::Validation("id or name required".into())),
    };
    Ok(Json(user))
}

/// POST /user
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<User>, JsonRejection>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<User>)> {
    let user = decode_body(payload)?;
    require_credentials(&user)?;

    let saved = state.users.create(user).await?;
    let id = saved.id().unwrap_or_default();
    info!(user_id = id, "user created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/user?id={}", id))],
        Json(saved),
    ))
}

/// PUT /user
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    payload: Result<Json<User>, JsonRejection>,
) -> AppResult<Json<User>> {
    let user = decode_body(payload)?;
    let id = require_id(&user)?;
    require_credentials(&user)?;
    let saved = state.users.update(user).await?;
    info!(user_id = id, "user updated");
    Ok(Json(saved))
}

/// DELETE /user
#[instrument(skip(state, payload))]
pub async fn delete_user(
    State(state): State<AppState>,
    payload: Result<Json<User>, JsonRejection>,
) -> AppResult<&'static str> {
    let user = decode_body(payload)?;
    let id = require_id(&user)?;
    state.users.delete(&user).await?;
    info!(user_id = id, "user deleted");
    Ok("deleted")
}
