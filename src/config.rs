// src/config.rs
//
// Roster configuration files.
// - RosterFile: serde image of a TOML roster
// - load_roster / parse_roster: read, deserialize and validate into a `Roster`
//
// Example:
//
//   picked = "England"
//   bins = ["A", "B"]
//
//   [[categories]]
//   name = "uefa"
//   quota = 2
//   expected = 14
//
//   [[teams]]
//   name = "Russia"
//   pot = 1
//   category = "uefa"
//
//   [[pre_placements]]
//   team = "Russia"
//   bin = "A"

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::draw::roster::Roster;
use crate::error::DrawResult;

/// A category with its per-bin quota and the roster count the integrity check expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub quota: u32,
    pub expected: usize,
}

/// A team; `pot` is 1-based as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub name: String,
    pub pot: usize,
    pub category: String,
}

/// Forces `team` into `bin` before randomization starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrePlacementEntry {
    pub team: String,
    pub bin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterFile {
    /// Default distinguished team; a `DrawConfig::picked` override wins.
    #[serde(default)]
    pub picked: Option<String>,
    pub bins: Vec<String>,
    pub categories: Vec<CategoryEntry>,
    pub teams: Vec<TeamEntry>,
    #[serde(default)]
    pub pre_placements: Vec<PrePlacementEntry>,
}

/// Parse and validate a roster from TOML text.
pub fn parse_roster(text: &str) -> DrawResult<Roster> {
    let file: RosterFile = toml::from_str(text)?;
    Roster::from_file(&file)
}

/// Read, parse and validate a roster file.
pub fn load_roster<P: AsRef<Path>>(path: P) -> DrawResult<Roster> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let roster = parse_roster(&text)?;
    info!(
        path = %path.display(),
        teams = roster.len(),
        bins = roster.bin_count(),
        "loaded roster"
    );
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DrawError;

    const SMALL: &str = r#"
picked = "Alpha"
bins = ["A", "B"]

[[categories]]
name = "north"
quota = 2
expected = 4

[[categories]]
name = "south"
quota = 2
expected = 4

[[teams]]
name = "Alpha"
pot = 1
category = "north"

[[teams]]
name = "Bravo"
pot = 1
category = "south"

[[teams]]
name = "Charlie"
pot = 2
category = "north"

[[teams]]
name = "Delta"
pot = 2
category = "south"

[[teams]]
name = "Echo"
pot = 3
category = "north"

[[teams]]
name = "Foxtrot"
pot = 3
category = "south"

[[teams]]
name = "Golf"
pot = 4
category = "north"

[[teams]]
name = "Hotel"
pot = 4
category = "south"

[[pre_placements]]
team = "Alpha"
bin = "A"
"#;

    #[test]
    fn test_parse_small_roster() {
        let roster = parse_roster(SMALL).expect("valid roster");
        assert_eq!(roster.len(), 8);
        assert_eq!(roster.bin_count(), 2);
        assert_eq!(roster.pre_placements().len(), 1);
        assert!(roster.default_picked().is_some());
    }

    #[test]
    fn test_pre_placements_default_to_empty() {
        let text = SMALL.split("[[pre_placements]]").next().unwrap_or_default();
        let roster = parse_roster(text).expect("valid roster");
        assert!(roster.pre_placements().is_empty());
    }

    #[test]
    fn test_bad_toml_is_reported() {
        let err = parse_roster("bins = [").unwrap_err();
        assert!(matches!(err, DrawError::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_roster("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, DrawError::Io(_)));
    }
}
