//! Role catalog, role configuration, and the error vocabulary.

use std::{
    fmt,
    str::FromStr
};
use serde::{
    Deserialize,
    Serialize
};
use thiserror::Error;
use crate::game::universe::EmptyUniverse;

/// A player role from the fixed catalog.
///
/// Roles are only hypotheses until the universe collapses far enough to pin
/// them down; a `Role` value on its own carries no claim about who holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A werewolf. Declares a fractional attack on a victim each night.
    Werewolf,
    /// The seer, part of the village. Learns one player's role each night.
    Seer,
    /// The hunter, part of the village. Shoots one player upon dying.
    Hunter,
    /// Cupid. Binds two players into a shared-fate pair on the first night.
    Cupid,
    /// A regular villager with no special abilities.
    Villager
}

impl Role {
    /// All role kinds, in display order. Villager last: its count is derived,
    /// never configured.
    pub const CATALOG: [Role; 5] = [Role::Werewolf, Role::Seer, Role::Hunter, Role::Cupid, Role::Villager];
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Role, ()> {
        match &s.to_lowercase()[..] {
            "werewolf" => Ok(Role::Werewolf),
            "seer" => Ok(Role::Seer),
            "hunter" => Ok(Role::Hunter),
            "cupid" => Ok(Role::Cupid),
            "villager" => Ok(Role::Villager),
            _ => Err(())
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Role::Werewolf => write!(f, "werewolf"),
            Role::Seer => write!(f, "seer"),
            Role::Hunter => write!(f, "hunter"),
            Role::Cupid => write!(f, "cupid"),
            Role::Villager => write!(f, "villager")
        }
    }
}

/// Requested number of players per role kind.
///
/// The villager count is not configured directly: `Game::start` derives it as
/// the number of players left over once all special roles are dealt out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts([usize; Role::CATALOG.len()]);

impl RoleCounts {
    /// The number of players requested for the given role kind.
    pub fn count(&self, role: Role) -> usize {
        self.0[role as usize]
    }

    pub(crate) fn set_count(&mut self, role: Role, count: usize) {
        self.0[role as usize] = count;
    }

    /// The total number of non-villager slots.
    pub(crate) fn specials(&self) -> usize {
        Role::CATALOG.iter()
            .filter(|&&role| role != Role::Villager)
            .map(|&role| self.count(role))
            .sum()
    }

    /// The full role multiset, one entry per player, in catalog order.
    pub(crate) fn pool(&self) -> Vec<Role> {
        Role::CATALOG.iter()
            .flat_map(|&role| std::iter::repeat(role).take(self.count(role)))
            .collect()
    }

    /// All role kinds with a nonzero count, in catalog order.
    pub(crate) fn used_roles(&self) -> Vec<Role> {
        Role::CATALOG.iter()
            .copied()
            .filter(|&role| self.count(role) > 0)
            .collect()
    }
}

impl Default for RoleCounts {
    /// The classic starting deck: two werewolves and the seer.
    fn default() -> RoleCounts {
        let mut counts = RoleCounts([0; Role::CATALOG.len()]);
        counts.set_count(Role::Werewolf, 2);
        counts.set_count(Role::Seer, 1);
        counts
    }
}

/// The faction (or lack of one) that a finished game is awarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// No living werewolf remains in any valid world.
    Villagers,
    /// No living non-werewolf remains in any valid world.
    Werewolves,
    /// Every living player is one of the bound pair in every valid world.
    Lovers,
    /// Everyone is dead. The game is a tie.
    Nobody
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Winner::Villagers => write!(f, "villagers"),
            Winner::Werewolves => write!(f, "werewolves"),
            Winner::Lovers => write!(f, "lovers"),
            Winner::Nobody => write!(f, "nobody")
        }
    }
}

/// The possible errors returned by game operations.
///
/// `NotStarted`, `AlreadyStarted`, and `EmptyUniverse` indicate driver bugs
/// and should end the session. The remaining variants are recoverable: the
/// driver is expected to re-prompt and retry.
#[derive(Debug, Error)]
pub enum GameError {
    /// The operation is only available while the game is running.
    #[error("operation requires a started game")]
    NotStarted,
    /// The operation is only available before the game has started.
    #[error("operation is only allowed during signups")]
    AlreadyStarted,
    /// A player name that is not part of the roster.
    #[error("no player named {0:?}")]
    UnknownPlayer(String),
    /// `start` was called on an empty roster.
    #[error("cannot start a game with no players")]
    NoPlayers,
    /// More special roles were configured than there are players.
    #[error("too many roles ({roles} special roles, {players} players)")]
    InvalidRoleCount {
        /// The number of non-villager slots configured.
        roles: usize,
        /// The number of players signed up.
        players: usize
    },
    /// The count for this role kind is derived, not configured.
    #[error("the {0} count is derived from the player count")]
    DerivedRole(Role),
    /// The acting player is already dead.
    #[error("{0} is dead and cannot act")]
    DeadActor(String),
    /// The targeted player is already dead.
    #[error("{0} is dead and cannot be targeted")]
    DeadTarget(String),
    /// The acting player holds the required role in no valid world.
    #[error("{actor} cannot act as {role}: the role probability is zero")]
    ImpossibleRole {
        /// The player the action was requested for.
        actor: String,
        /// The role the action requires.
        role: Role
    },
    /// A collapse was requested that would leave no valid world.
    #[error(transparent)]
    EmptyUniverse(#[from] EmptyUniverse)
}
