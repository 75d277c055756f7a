//! Travel companion options offered by the optional-information step.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::MapzipError;

/// Fixed set of companion choices. The serialized labels are the ones the
/// schedule service stores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Companion {
    #[serde(rename = "혼자")]
    Alone,
    #[serde(rename = "부모님")]
    Parents,
    #[serde(rename = "연인")]
    Partner,
    #[serde(rename = "지인")]
    Friends,
    #[serde(rename = "자녀")]
    Children,
}

impl Companion {
    pub const ALL: [Companion; 5] = [
        Companion::Alone,
        Companion::Parents,
        Companion::Partner,
        Companion::Friends,
        Companion::Children,
    ];

    /// Label stored by the schedule service.
    pub fn label(&self) -> &'static str {
        match self {
            Companion::Alone => "혼자",
            Companion::Parents => "부모님",
            Companion::Partner => "연인",
            Companion::Friends => "지인",
            Companion::Children => "자녀",
        }
    }

    fn english(&self) -> &'static str {
        match self {
            Companion::Alone => "alone",
            Companion::Parents => "parents",
            Companion::Partner => "partner",
            Companion::Friends => "friends",
            Companion::Children => "children",
        }
    }
}

impl FromStr for Companion {
    type Err = MapzipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Companion::ALL
            .into_iter()
            .find(|c| c.label() == needle || c.english() == needle)
            .ok_or_else(|| {
                MapzipError::validation("companions")
                    .with_reason(format!("Unknown companion: {s}"))
            })
    }
}

impl fmt::Display for Companion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english())
    }
}
