use serde::{Deserialize, Serialize};

/// Bounds for the NOW-view display limit. Values outside the range are
/// clamped, never rejected.
pub const NOW_LIMIT_MIN: u32 = 1;
pub const NOW_LIMIT_MAX: u32 = 5;
pub const NOW_LIMIT_DEFAULT: u32 = 3;

/// Page size for the paginated tiers (soon, someday, completed).
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Rendering theme. Opaque to the selection engine; stored so the
/// presentation layer can pick it up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Classic,
    Minimal,
    Monospace,
}

impl Default for Theme {
    fn default() -> Self {
        Self::Classic
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classic => f.write_str("classic"),
            Self::Minimal => f.write_str("minimal"),
            Self::Monospace => f.write_str("monospace"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classic" => Ok(Self::Classic),
            "minimal" => Ok(Self::Minimal),
            "monospace" => Ok(Self::Monospace),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Per-user preferences consulted by view callers.
///
/// The engine never mutates these; it only reads the display limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub now_display_limit: u32,
    pub theme: Theme,
    pub show_completed_button: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            now_display_limit: NOW_LIMIT_DEFAULT,
            theme: Theme::default(),
            show_completed_button: false,
        }
    }
}

impl UserSettings {
    /// Clamp out-of-range values into their allowed bounds.
    ///
    /// Applied on every read and write so a value that slipped into storage
    /// out of range can never reach the engine.
    pub fn normalized(mut self) -> Self {
        self.now_display_limit = self.now_display_limit.clamp(NOW_LIMIT_MIN, NOW_LIMIT_MAX);
        self
    }
}
