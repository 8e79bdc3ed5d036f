use std::collections::HashSet;

use anyhow::Result;
use chrono::Duration;
use shared::domain::StudentId;
use storage::StateStore;
use tracing::warn;

pub const SELECTED_STUDENTS_KEY: &str = "selected_students";
pub const LAST_SELECTED_STUDENT_KEY: &str = "last_selected_student";

/// Effectively "until explicitly cleared"; the exact horizon is policy.
pub fn persist_ttl() -> Duration {
    Duration::days(10 * 365)
}

pub async fn load_selection(store: &dyn StateStore) -> Result<HashSet<StudentId>> {
    let Some(raw) = store.get(SELECTED_STUDENTS_KEY).await? else {
        return Ok(HashSet::new());
    };
    match serde_json::from_str(&raw) {
        Ok(selection) => Ok(selection),
        Err(error) => {
            warn!(%error, "ignoring unreadable persisted selection set");
            Ok(HashSet::new())
        }
    }
}

pub async fn save_selection(
    store: &dyn StateStore,
    selection: &HashSet<StudentId>,
) -> Result<()> {
    let encoded = serde_json::to_string(selection)?;
    store
        .set(SELECTED_STUDENTS_KEY, &encoded, Some(persist_ttl()))
        .await
}

pub async fn load_last_drawn(store: &dyn StateStore) -> Result<Option<StudentId>> {
    let Some(raw) = store.get(LAST_SELECTED_STUDENT_KEY).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(id) => Ok(Some(id)),
        Err(error) => {
            warn!(%error, "ignoring unreadable persisted last-drawn id");
            Ok(None)
        }
    }
}

pub async fn save_last_drawn(store: &dyn StateStore, id: StudentId) -> Result<()> {
    let encoded = serde_json::to_string(&id)?;
    store
        .set(LAST_SELECTED_STUDENT_KEY, &encoded, Some(persist_ttl()))
        .await
}
