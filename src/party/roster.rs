//! Players, teams and the party roster

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::{GameError, GameResult};

/// Player counts offered at setup
pub const PLAYER_COUNTS: [usize; 5] = [2, 4, 6, 8, 10];

/// One of the two competing teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// Team assigned to the player registered at `index`
    pub fn for_slot(index: usize) -> Self {
        if index % 2 == 0 { Team::A } else { Team::B }
    }

    pub fn opponent(&self) -> Self {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => f.write_str("A"),
            Team::B => f.write_str("B"),
        }
    }
}

/// A registered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub team: Team,
}

/// Check a requested player count
pub fn validate_player_count(count: usize) -> GameResult<()> {
    if count < 2 || count % 2 != 0 || count > PLAYER_COUNTS[PLAYER_COUNTS.len() - 1] {
        return Err(GameError::InvalidPlayerCount(count));
    }
    Ok(())
}

/// Ordered players of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Build a roster from registration-ordered names, alternating teams A and B
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> GameResult<Self> {
        validate_player_count(names.len())?;

        let players = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let name = name.as_ref().trim();
                if name.is_empty() {
                    return Err(GameError::BlankName { index });
                }
                Ok(Player {
                    name: name.to_string(),
                    team: Team::for_slot(index),
                })
            })
            .collect::<GameResult<Vec<_>>>()?;

        Ok(Self { players })
    }

    /// Build a roster from explicit players.
    ///
    /// Team balance is not enforced here; a one-sided roster is rejected
    /// later, when a round needs an opponent.
    pub fn from_players(players: Vec<Player>) -> GameResult<Self> {
        if players.is_empty() {
            return Err(GameError::InvalidPlayerCount(0));
        }
        if let Some(index) = players.iter().position(|p| p.name.trim().is_empty()) {
            return Err(GameError::BlankName { index });
        }
        Ok(Self { players })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Player whose turn it is for the given cursor
    pub fn asking(&self, cursor: u64) -> Option<&Player> {
        if self.players.is_empty() {
            return None;
        }
        let index = (cursor % self.players.len() as u64) as usize;
        self.players.get(index)
    }

    /// Roster indices of every member of `team`
    pub fn members_of(&self, team: Team) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.team == team)
            .map(|(i, _)| i)
            .collect()
    }

    /// Roster indices of the players opposing `player`
    pub fn opponents_of(&self, player: &Player) -> Vec<usize> {
        self.members_of(player.team.opponent())
    }

    /// Names of the members of `team`, in roster order
    pub fn team_names(&self, team: Team) -> Vec<&str> {
        self.players
            .iter()
            .filter(|p| p.team == team)
            .map(|p| p.name.as_str())
            .collect()
    }
}
