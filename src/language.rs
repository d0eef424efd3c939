//! Conversation languages

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language of a dialogue turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Bengali
    Bn,
}

impl Language {
    /// Wire tag used by the HTTP API (`"en"` / `"bn"`)
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Bn => "bn",
        }
    }

    /// BCP-47 locale used for speech recognition and synthesis
    #[must_use]
    pub const fn locale(self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Bn => "bn-IN",
        }
    }

    /// Parse a client-supplied tag, falling back to English for anything unknown
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "bn" | "bn-in" | "bn-bd" | "bengali" | "bangla" => Self::Bn,
            _ => Self::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
