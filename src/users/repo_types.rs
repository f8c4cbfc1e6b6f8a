use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::nullable::Nullable;

/// User record, both as stored in the `user` table and as sent on the wire.
/// Columns are bound by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Assigned by the store on create.
    #[serde(default)]
    pub id: Nullable<i64>,
    #[serde(default)]
    pub username: Nullable<String>,
    #[serde(default)]
    pub password: Nullable<String>,
    #[serde(default)]
    pub email: Nullable<String>,
}

impl User {
    pub fn id(&self) -> Option<i64> {
        self.id.get().copied()
    }
}
