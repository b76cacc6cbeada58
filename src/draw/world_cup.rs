//! Built-in roster: the 2018 World Cup final draw
//!
//! 32 teams in four pots of eight, drawn into groups A–H. A group may hold at
//! most two UEFA teams and one from each other confederation. Russia, as
//! host, is fixed in position A1.
//!
//! | Confederation | Teams | Per-group quota |
//! |---------------|-------|-----------------|
//! | UEFA          | 14    | 2               |
//! | CAF           | 5     | 1               |
//! | AFC           | 5     | 1               |
//! | CONMEBOL      | 5     | 1               |
//! | CONCACAF      | 3     | 1               |

use crate::config::{CategoryEntry, PrePlacementEntry, RosterFile, TeamEntry};
use crate::draw::roster::Roster;
use crate::error::DrawResult;

pub const DEFAULT_PICKED: &str = "England";

const CONFEDERATIONS: [(&str, u32, usize); 5] = [
    ("uefa", 2, 14),
    ("caf", 1, 5),
    ("afc", 1, 5),
    ("conmebol", 1, 5),
    ("concacaf", 1, 3),
];

const GROUPS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

const TEAMS: [(&str, usize, &str); 32] = [
    ("Russia", 1, "uefa"),
    ("Germany", 1, "uefa"),
    ("Brazil", 1, "conmebol"),
    ("Portugal", 1, "uefa"),
    ("Argentina", 1, "conmebol"),
    ("Belgium", 1, "uefa"),
    ("Poland", 1, "uefa"),
    ("France", 1, "uefa"),
    ("Spain", 2, "uefa"),
    ("Peru", 2, "conmebol"),
    ("Switzerland", 2, "uefa"),
    ("England", 2, "uefa"),
    ("Colombia", 2, "conmebol"),
    ("Mexico", 2, "concacaf"),
    ("Uruguay", 2, "conmebol"),
    ("Croatia", 2, "uefa"),
    ("Denmark", 3, "uefa"),
    ("Iceland", 3, "uefa"),
    ("Costa Rica", 3, "concacaf"),
    ("Sweden", 3, "uefa"),
    ("Tunisia", 3, "caf"),
    ("Egypt", 3, "caf"),
    ("Senegal", 3, "caf"),
    ("Iran", 3, "afc"),
    ("Serbia", 4, "uefa"),
    ("Nigeria", 4, "caf"),
    ("Australia", 4, "afc"),
    ("Japan", 4, "afc"),
    ("Morocco", 4, "caf"),
    ("Panama", 4, "concacaf"),
    ("Korea Republic", 4, "afc"),
    ("Saudi Arabia", 4, "afc"),
];

/// The roster as a `RosterFile`, e.g. to dump it as a TOML template.
pub fn world_cup_2018_file() -> RosterFile {
    RosterFile {
        picked: Some(DEFAULT_PICKED.to_string()),
        bins: GROUPS.iter().map(|g| g.to_string()).collect(),
        categories: CONFEDERATIONS
            .iter()
            .map(|&(name, quota, expected)| CategoryEntry {
                name: name.to_string(),
                quota,
                expected,
            })
            .collect(),
        teams: TEAMS
            .iter()
            .map(|&(name, pot, category)| TeamEntry {
                name: name.to_string(),
                pot,
                category: category.to_string(),
            })
            .collect(),
        pre_placements: vec![PrePlacementEntry {
            team: "Russia".to_string(),
            bin: "A".to_string(),
        }],
    }
}

pub fn world_cup_2018() -> DrawResult<Roster> {
    Roster::from_file(&world_cup_2018_file())
}
