use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{TaskId, UserId};

/// Urgency tier a task is bucketed into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Now,
    Soon,
    Someday,
}

impl Category {
    /// All tiers, in display order.
    pub const ALL: [Category; 3] = [Category::Now, Category::Soon, Category::Someday];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::Soon => "soon",
            Self::Someday => "someday",
        }
    }
}

impl Default for Category {
    /// New tasks land in `someday` until the user promotes them.
    fn default() -> Self {
        Self::Someday
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "now" => Ok(Self::Now),
            "soon" => Ok(Self::Soon),
            "someday" => Ok(Self::Someday),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// A single tracked task.
///
/// `shown_count` and `last_shown_at` are display statistics: they are only
/// mutated by the record-shown effect after a selection, never by user
/// actions. A task with `completed_at` set is excluded from every active
/// query and from selection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub content: String,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub shown_count: u32,
    pub last_shown_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// True if this task has never been surfaced to the user.
    pub fn never_shown(&self) -> bool {
        self.shown_count == 0
    }
}
