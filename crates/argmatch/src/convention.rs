//! Naming conventions: which prefix + name spellings a command set accepts,
//! and how grouped short options are split.

use serde::{Deserialize, Serialize};

pub const SHORT_PREFIX: &str = "-";
pub const LONG_PREFIX: &str = "--";

/// Naming-convention toggles of a command set.
///
/// With every naming toggle off, any declared prefix pairs with any declared
/// name. Once one is on, spellings using `-` or `--` must satisfy at least
/// one enabled convention. Other prefixes are custom and always accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Conventions {
    /// `-` followed by a single character.
    pub posix: bool,
    /// `--` followed by a multi-character name.
    pub gnu: bool,
    /// `-` followed by any name, words split by `-` or `_`.
    pub multics: bool,
    /// Multics, plus `--` with grouped single-character names (`--abc`).
    pub rune_imp: bool,
    /// Expand `-abc` into `-a -b -c`.
    pub posix_groups: bool,
}

impl Conventions {
    /// Whether any spelling restriction is active.
    pub fn restricts_spelling(&self) -> bool {
        self.posix || self.gnu || self.multics || self.rune_imp
    }

    pub fn accepts(&self, prefix: &str, name: &str) -> bool {
        if !self.restricts_spelling() {
            return true;
        }
        let single = name.chars().count() == 1;
        match prefix {
            SHORT_PREFIX => (self.posix && single) || self.multics || self.rune_imp,
            LONG_PREFIX => (self.gnu && !single) || (self.rune_imp && single),
            _ => true,
        }
    }

    /// The prefix introducing a group of single-character names, if grouping
    /// is enabled.
    pub fn group_prefix(&self) -> Option<&'static str> {
        if self.rune_imp {
            Some(LONG_PREFIX)
        } else if self.posix_groups {
            Some(SHORT_PREFIX)
        } else {
            None
        }
    }

    /// Split `token` into its group body when it looks like a group: the
    /// group prefix followed by at least two characters.
    pub fn split_group<'a>(&self, token: &'a str) -> Option<&'a str> {
        let body = token.strip_prefix(self.group_prefix()?)?;
        if body.starts_with('-') || body.chars().count() < 2 {
            return None;
        }
        Some(body)
    }
}
