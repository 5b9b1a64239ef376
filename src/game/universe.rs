//! The permutation universe: every role assignment still consistent with
//! everything observed so far.

use rand::Rng;
use thiserror::Error;
use crate::{
    game::types::Role,
    util::SwwIteratorExt
};

/// Returned when a collapse would invalidate every remaining world.
///
/// This never happens under correct call sequencing. Its appearance means the
/// universe has been asked to absorb contradictory evidence, and the session
/// should be aborted rather than continued on corrupted state.
#[derive(Debug, Error)]
#[error("collapse would leave no valid world")]
pub struct EmptyUniverse;

/// One fully specified hypothetical assignment of roles to players, plus the
/// flag recording whether it is still consistent with all observations.
///
/// The flag only ever flips true to false.
#[derive(Debug, Clone, PartialEq, Eq)]
struct World {
    roles: Vec<Role>,
    valid: bool
}

/// The full set of distinct role assignments for a game, generated once at
/// start and narrowed monotonically as information leaks.
#[derive(Debug, Clone)]
pub(crate) struct Universe {
    worlds: Vec<World>
}

impl Universe {
    /// Generates every distinct ordering of the role multiset `pool`.
    ///
    /// Repeated role kinds are indistinguishable, so orderings are produced by
    /// backtracking over per-kind counts: each multiset ordering appears
    /// exactly once, in lexicographic catalog order. Callers must pass one
    /// role per player; `Game::start` derives the villager count, so the
    /// lengths agree by construction.
    pub(crate) fn generate(pool: &[Role]) -> Universe {
        let mut remaining = [0; Role::CATALOG.len()];
        for &role in pool {
            remaining[role as usize] += 1;
        }
        let mut worlds = Vec::new();
        let mut prefix = Vec::with_capacity(pool.len());
        fill(&mut remaining, &mut prefix, pool.len(), &mut worlds);
        Universe { worlds }
    }

    /// Iterates over the currently-valid role assignments.
    ///
    /// Every probability computation is a scan of this view; at catalog scale
    /// no secondary index is worth maintaining.
    pub(crate) fn worlds(&self) -> impl Iterator<Item = &[Role]> {
        self.worlds.iter()
            .filter(|world| world.valid)
            .map(|world| &world.roles[..])
    }

    /// The number of currently-valid worlds.
    pub(crate) fn valid_count(&self) -> usize {
        self.worlds.iter().filter(|world| world.valid).count()
    }

    /// The total number of worlds generated at start, valid or not.
    pub(crate) fn total_count(&self) -> usize {
        self.worlds.len()
    }

    /// Invalidates every still-valid world failing `keep` and returns how many
    /// were invalidated. Worlds are never re-validated.
    ///
    /// If no world would survive, nothing is flipped and `EmptyUniverse` is
    /// returned: the universe must stay inspectable for the post-mortem.
    pub(crate) fn collapse<F: FnMut(&[Role]) -> bool>(&mut self, mut keep: F) -> Result<usize, EmptyUniverse> {
        let mut survivors = 0;
        let mut doomed = Vec::new();
        for (idx, world) in self.worlds.iter().enumerate() {
            if !world.valid { continue; }
            if keep(&world.roles) {
                survivors += 1;
            } else {
                doomed.push(idx);
            }
        }
        if survivors == 0 {
            return Err(EmptyUniverse);
        }
        for &idx in &doomed {
            self.worlds[idx].valid = false;
        }
        Ok(doomed.len())
    }

    /// Picks one world uniformly at random among the valid ones.
    ///
    /// Uniformity over valid worlds is the correctness core of the whole
    /// model: reading an attribute off the sampled world is then exactly a
    /// draw from that attribute's posterior.
    pub(crate) fn sample_uniform<R: Rng>(&self, rng: &mut R) -> Option<&[Role]> {
        self.worlds().choose_uniform(rng)
    }
}

fn fill(remaining: &mut [usize; Role::CATALOG.len()], prefix: &mut Vec<Role>, len: usize, out: &mut Vec<World>) {
    if prefix.len() == len {
        out.push(World { roles: prefix.clone(), valid: true });
        return;
    }
    for &role in &Role::CATALOG {
        if remaining[role as usize] > 0 {
            remaining[role as usize] -= 1;
            prefix.push(role);
            fill(remaining, prefix, len, out);
            prefix.pop();
            remaining[role as usize] += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use rand::{
        SeedableRng,
        rngs::StdRng
    };
    use super::*;

    fn sample_pool() -> Vec<Role> {
        vec![Role::Werewolf, Role::Werewolf, Role::Seer, Role::Villager]
    }

    #[test]
    fn generation_counts_multisets_once() {
        let universe = Universe::generate(&sample_pool());
        // 4! / 2! orderings of {werewolf, werewolf, seer, villager}
        assert_eq!(universe.total_count(), 12);
        let distinct = universe.worlds().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), 12);
    }

    #[test]
    fn collapse_is_monotonic() {
        let mut universe = Universe::generate(&sample_pool());
        let dropped = universe.collapse(|world| world[0] == Role::Werewolf).unwrap();
        assert_eq!(universe.valid_count(), 12 - dropped);
        assert!(universe.worlds().all(|world| world[0] == Role::Werewolf));
        // the same predicate again removes nothing
        assert_eq!(universe.collapse(|world| world[0] == Role::Werewolf).unwrap(), 0);
    }

    #[test]
    fn collapse_refuses_to_empty() {
        let mut universe = Universe::generate(&sample_pool());
        assert!(universe.collapse(|_| false).is_err());
        assert_eq!(universe.valid_count(), 12);
    }

    #[test]
    fn keep_all_collapse_is_a_noop() {
        let mut universe = Universe::generate(&sample_pool());
        assert_eq!(universe.collapse(|_| true).unwrap(), 0);
        assert_eq!(universe.valid_count(), 12);
    }

    #[test]
    fn sample_draws_from_the_valid_subset() {
        let mut universe = Universe::generate(&sample_pool());
        universe.collapse(|world| world[3] == Role::Seer).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let world = universe.sample_uniform(&mut rng).unwrap();
            assert_eq!(world[3], Role::Seer);
        }
    }
}
