//! Team scores

use serde::{Deserialize, Serialize};
use super::roster::Team;

/// Points per team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
}

impl Score {
    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::A => self.a,
            Team::B => self.b,
        }
    }

    /// Award one point to `team`
    pub fn credit(&mut self, team: Team) {
        match team {
            Team::A => self.a = self.a.saturating_add(1),
            Team::B => self.b = self.b.saturating_add(1),
        }
    }

    /// Team ahead on points, `None` on a tie
    pub fn leader(&self) -> Option<Team> {
        match self.a.cmp(&self.b) {
            std::cmp::Ordering::Greater => Some(Team::A),
            std::cmp::Ordering::Less => Some(Team::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}
