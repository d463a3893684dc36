pub mod detail;
pub mod list;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use detail::{resolve_thread, ThreadDetail};
pub use list::{ListState, ThreadDraft, ThreadList};

/// Fixed set of category tabs. Defined client-side, independent of what the
/// backend stores; threads in any other category never show under a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Shooter,
    #[serde(rename = "RPG")]
    Rpg,
    Indie,
    Noticias,
    Retro,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Shooter,
        Category::Rpg,
        Category::Indie,
        Category::Noticias,
        Category::Retro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Shooter => "Shooter",
            Category::Rpg => "RPG",
            Category::Indie => "Indie",
            Category::Noticias => "Noticias",
            Category::Retro => "Retro",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
