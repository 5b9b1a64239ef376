//! The probability engine.
//!
//! Everything in here is derived purely from the current universe, the attack
//! ledger, and the lover registry at the moment of the call. Nothing is
//! cached: a collapse between two queries must be visible in the second.

use std::collections::BTreeMap;
use serde::Serialize;
use crate::game::{
    Game,
    GameError,
    Role,
    universe::Universe
};

/// Fractional night-attack declarations, one weight per (target, actor) pair.
///
/// Written by the werewolf action, read by the death-probability computation.
/// Re-targeting overwrites; a confirmed werewolf's death retracts every weight
/// they declared.
#[derive(Debug, Clone, Default)]
pub(crate) struct AttackLedger {
    weights: Vec<Vec<f64>>
}

impl AttackLedger {
    pub(crate) fn new(player_count: usize) -> AttackLedger {
        AttackLedger {
            weights: vec![vec![0.0; player_count]; player_count]
        }
    }

    pub(crate) fn weight(&self, target: usize, actor: usize) -> f64 {
        self.weights[target][actor]
    }

    /// Records `actor`'s declared attack on `target`, replacing any earlier
    /// declaration by the same actor.
    pub(crate) fn declare(&mut self, target: usize, actor: usize, weight: f64) {
        for row in &mut self.weights {
            row[actor] = 0.0;
        }
        self.weights[target][actor] = weight;
    }

    /// Zeroes every weight attributed to `actor`. Used once a resolved kill
    /// confirms the actor was a werewolf: their pending declarations die with
    /// them.
    pub(crate) fn retract_actor(&mut self, actor: usize) {
        for row in &mut self.weights {
            row[actor] = 0.0;
        }
    }
}

/// The cupid-declared bound pairs, keyed by the acting player's index.
///
/// A binding is evidence, not observation: recording one never collapses the
/// universe. Whether it applies inside a given world depends on that world
/// assigning the cupid role to the acting player (see `partner_of`).
#[derive(Debug, Clone, Default)]
pub(crate) struct LoverRegistry {
    bonds: BTreeMap<usize, (usize, usize)>
}

impl LoverRegistry {
    pub(crate) fn clear(&mut self) {
        self.bonds.clear();
    }

    pub(crate) fn record(&mut self, actor: usize, lover1: usize, lover2: usize) {
        self.bonds.insert(actor, (lover1, lover2));
    }

    /// The pair bound in `world`, if any: the first registered binding whose
    /// acting player actually holds the cupid role there. Worlds that assign
    /// cupid to a player who never registered a binding carry no pair.
    pub(crate) fn bound_pair(&self, world: &[Role]) -> Option<(usize, usize)> {
        self.bonds.iter()
            .find(|&(&actor, _)| world[actor] == Role::Cupid)
            .map(|(_, &pair)| pair)
    }

    /// `player`'s lover under the binding consistent with `world`, if any.
    pub(crate) fn partner_of(&self, world: &[Role], player: usize) -> Option<usize> {
        let (lover1, lover2) = self.bound_pair(world)?;
        if player == lover1 {
            Some(lover2)
        } else if player == lover2 {
            Some(lover1)
        } else {
            None
        }
    }
}

/// One row of the probability table: a player's marginal for every role kind
/// in play, plus their probability of being dead.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerProbabilities {
    /// The player's display name.
    pub name: String,
    /// Marginal probability per used role kind, in catalog order. Sums to 1.
    pub roles: BTreeMap<Role, f64>,
    /// The player's death probability. Exactly 1 once they are killed.
    pub dead: f64
}

/// The fraction of valid worlds assigning `role` to `player`.
pub(crate) fn marginal(universe: &Universe, player: usize, role: Role) -> f64 {
    let supporting = universe.worlds().filter(|world| world[player] == role).count();
    supporting as f64 / universe.valid_count() as f64
}

impl Game {
    /// The full probability table: for every player, the fraction of valid
    /// worlds assigning them each role in play, and their death probability.
    ///
    /// Computed fresh from the universe on every call.
    pub fn role_probabilities(&self) -> Result<Vec<PlayerProbabilities>, GameError> {
        let universe = self.universe()?;
        let rows = self.players.iter()
            .enumerate()
            .map(|(idx, player)| PlayerProbabilities {
                name: player.name.clone(),
                roles: self.used_roles.iter()
                    .map(|&role| (role, marginal(universe, idx, role)))
                    .collect(),
                dead: self.death_probability_in(universe, idx)
            })
            .collect();
        Ok(rows)
    }

    /// The probability that the named player is dead.
    ///
    /// 1 exactly once they are marked killed; otherwise the average over valid
    /// worlds of the strongest claim on their life in each world, which is
    /// either the werewolf attacks declared against them or their lover's
    /// fate, whichever is larger.
    pub fn death_probability(&self, player: &str) -> Result<f64, GameError> {
        let universe = self.universe()?;
        let idx = self.index_of(player)?;
        Ok(self.death_probability_in(universe, idx))
    }

    pub(crate) fn death_probability_in(&self, universe: &Universe, player: usize) -> f64 {
        if self.players[player].killed {
            return 1.0;
        }
        let mut total = 0.0;
        let mut worlds = 0;
        for world in universe.worlds() {
            let direct = self.werewolf_attack(world, player);
            let lover = match self.lovers.partner_of(world, player) {
                Some(partner) if self.players[partner].killed => 1.0,
                Some(partner) => self.werewolf_attack(world, partner),
                None => 0.0
            };
            total += direct.max(lover);
            worlds += 1;
        }
        total / worlds as f64
    }

    /// The summed attack weight against `target` in `world`.
    ///
    /// Only players who are werewolves in this world contribute, and a target
    /// who is themself a werewolf here is immune to the tally entirely.
    fn werewolf_attack(&self, world: &[Role], target: usize) -> f64 {
        if world[target] == Role::Werewolf {
            return 0.0;
        }
        world.iter()
            .enumerate()
            .filter(|&(_, &role)| role == Role::Werewolf)
            .map(|(actor, _)| self.ledger.weight(target, actor))
            .sum()
    }

    /// For every player, the probability that they are a werewolf *given* that
    /// `actor` is one: the werewolf marginal within the actor-is-werewolf
    /// restriction of the universe.
    ///
    /// Empty if the restriction is empty, i.e. the actor's own werewolf
    /// probability has already collapsed to 0.
    pub fn other_werewolves(&self, actor: &str) -> Result<Vec<(String, f64)>, GameError> {
        let universe = self.universe()?;
        let actor_idx = self.index_of(actor)?;
        let restricted = universe.worlds()
            .filter(|world| world[actor_idx] == Role::Werewolf)
            .collect::<Vec<_>>();
        if restricted.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.players.iter()
            .enumerate()
            .map(|(idx, player)| {
                let supporting = restricted.iter().filter(|world| world[idx] == Role::Werewolf).count();
                (player.name.clone(), supporting as f64 / restricted.len() as f64)
            })
            .collect();
        Ok(rows)
    }

    /// For every player, the fraction of valid worlds whose binding pairs them
    /// with the named player. All zeroes when no cupid is in play or no
    /// world-consistent binding exists.
    pub fn other_lover(&self, player: &str) -> Result<Vec<(String, f64)>, GameError> {
        let universe = self.universe()?;
        let player_idx = self.index_of(player)?;
        let mut counts = vec![0; self.players.len()];
        if self.config.count(Role::Cupid) > 0 {
            for world in universe.worlds() {
                if let Some(partner) = self.lovers.partner_of(world, player_idx) {
                    counts[partner] += 1;
                }
            }
        }
        let total = universe.valid_count() as f64;
        let rows = self.players.iter()
            .zip(counts)
            .map(|(player, count)| (player.name.clone(), count as f64 / total))
            .collect();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaring_replaces_the_old_target() {
        let mut ledger = AttackLedger::new(3);
        ledger.declare(1, 0, 0.5);
        ledger.declare(2, 0, 0.5);
        assert_eq!(ledger.weight(1, 0), 0.0);
        assert_eq!(ledger.weight(2, 0), 0.5);
    }

    #[test]
    fn retraction_only_touches_one_actor() {
        let mut ledger = AttackLedger::new(3);
        ledger.declare(2, 0, 0.5);
        ledger.declare(2, 1, 0.5);
        ledger.retract_actor(0);
        assert_eq!(ledger.weight(2, 0), 0.0);
        assert_eq!(ledger.weight(2, 1), 0.5);
    }

    #[test]
    fn bindings_apply_only_in_consistent_worlds() {
        let mut lovers = LoverRegistry::default();
        lovers.record(0, 1, 2);
        let consistent = [Role::Cupid, Role::Werewolf, Role::Villager];
        assert_eq!(lovers.partner_of(&consistent, 1), Some(2));
        assert_eq!(lovers.partner_of(&consistent, 2), Some(1));
        assert_eq!(lovers.partner_of(&consistent, 0), None);
        // same binding, but here player 0 is not the cupid
        let inconsistent = [Role::Villager, Role::Cupid, Role::Werewolf];
        assert_eq!(lovers.partner_of(&inconsistent, 1), None);
        assert_eq!(lovers.bound_pair(&inconsistent), None);
    }
}
