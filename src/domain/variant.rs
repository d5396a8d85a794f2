/// Game variants and their properties.
/// Properties are queried via methods, not stored as flags,
/// so variant semantics are centralized here.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Variant {
    /// Pure random decoys; New Game and Change Color actions.
    #[default]
    Classic,
    /// Two near-miss decoys around the target; New Game only.
    NearMiss,
}

impl Variant {
    /// Does the action bar offer "Change Color"?
    pub fn has_change_color(self) -> bool {
        matches!(self, Variant::Classic)
    }

    /// How many decoys are jittered copies of the target.
    pub fn near_miss_decoys(self) -> usize {
        match self {
            Variant::Classic => 0,
            Variant::NearMiss => 2,
        }
    }

    /// Are all options guaranteed pairwise distinct?
    pub fn distinct_options(self) -> bool {
        matches!(self, Variant::Classic)
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::NearMiss => "near_miss",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "classic" | "random" | "a" => Ok(Variant::Classic),
            "near_miss" | "nearmiss" | "b" => Ok(Variant::NearMiss),
            other => Err(format!("unknown variant {other:?} (expected classic or near_miss)")),
        }
    }
}
