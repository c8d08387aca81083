use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use troika_core::ids::UserId;
use troika_core::settings::UserSettings;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRow {
    pub id: UserId,
    /// Opaque transport-level identity (e.g. a chat platform user ID).
    pub external_ref: String,
    pub settings: UserSettings,
    pub created_at: DateTime<Utc>,
}

pub struct UserRepo {
    db: Database,
}

impl UserRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get or create the user for an external reference.
    #[instrument(skip(self), fields(external_ref))]
    pub fn get_or_create(&self, external_ref: &str) -> Result<UserRow, StoreError> {
        self.db.with_conn(|conn| {
            // Only a genuinely missing row falls through to the insert;
            // any other read failure propagates as-is.
            let existing = conn
                .query_row(
                    "SELECT id, external_ref, settings, created_at FROM users WHERE external_ref = ?1",
                    [external_ref],
                    row_to_user_raw,
                )
                .optional()?;

            if let Some(raw) = existing {
                return finish_user(raw);
            }

            let id = UserId::new();
            let now = Utc::now();
            let settings = UserSettings::default();
            conn.execute(
                "INSERT INTO users (id, external_ref, settings, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    id.as_str(),
                    external_ref,
                    serde_json::to_string(&settings)?,
                    now.to_rfc3339(),
                ],
            )?;

            Ok(UserRow {
                id,
                external_ref: external_ref.to_string(),
                settings,
                created_at: now,
            })
        })
    }

    /// Get a user by ID.
    pub fn get(&self, id: &UserId) -> Result<UserRow, StoreError> {
        self.db.with_conn(|conn| {
            let raw = conn
                .query_row(
                    "SELECT id, external_ref, settings, created_at FROM users WHERE id = ?1",
                    [id.as_str()],
                    row_to_user_raw,
                )
                .map_err(|_| StoreError::NotFound(format!("user {id}")))?;
            finish_user(raw)
        })
    }

    /// Persist new settings. Out-of-range values are clamped before the
    /// write, never rejected.
    #[instrument(skip(self, settings), fields(user_id = %id))]
    pub fn update_settings(
        &self,
        id: &UserId,
        settings: UserSettings,
    ) -> Result<UserRow, StoreError> {
        let settings = settings.normalized();
        let affected = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET settings = ?2 WHERE id = ?1",
                rusqlite::params![id.as_str(), serde_json::to_string(&settings)?],
            )
            .map_err(StoreError::from)
        })?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("user {id}")));
        }
        self.get(id)
    }
}

/// Raw column values before settings JSON / timestamp parsing.
struct RawUser {
    id: String,
    external_ref: String,
    settings: String,
    created_at: String,
}

fn row_to_user_raw(row: &rusqlite::Row<'_>) -> Result<RawUser, rusqlite::Error> {
    Ok(RawUser {
        id: row.get(0)?,
        external_ref: row.get(1)?,
        settings: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn finish_user(raw: RawUser) -> Result<UserRow, StoreError> {
    let settings: UserSettings =
        serde_json::from_str(&raw.settings).map_err(|e| StoreError::CorruptRow {
            table: "users",
            column: "settings",
            detail: format!("invalid JSON: {e}"),
        })?;
    Ok(UserRow {
        id: UserId::from_raw(raw.id),
        external_ref: raw.external_ref,
        settings: settings.normalized(),
        created_at: row_helpers::parse_datetime(&raw.created_at, "users", "created_at")?,
    })
}
