//! Property-based tests for the probability engine.

use std::collections::HashSet;
use proptest::prelude::*;
use rand::{
    SeedableRng,
    rngs::StdRng
};
use schroedingers_wolves::{
    Game,
    game::{
        GameError,
        Role
    }
};

const NAMES: [&str; 6] = ["p0", "p1", "p2", "p3", "p4", "p5"];

/// Strategy: engine seed plus a role configuration that fits the roster.
fn config_strategy() -> impl Strategy<Value = (u64, usize, usize, bool, bool)> {
    (any::<u64>(), 3usize..=6, 1usize..=2, any::<bool>(), any::<bool>())
        .prop_filter("roles must fit the roster", |&(_, players, wolves, seer, cupid)| {
            wolves + usize::from(seer) + usize::from(cupid) <= players
        })
}

fn build(seed: u64, players: usize, wolves: usize, seer: bool, cupid: bool) -> Game {
    let mut game = Game::with_rng(StdRng::seed_from_u64(seed));
    game.add_players(NAMES[..players].iter().copied()).unwrap();
    game.set_role_count(Role::Werewolf, wolves).unwrap();
    game.set_role_count(Role::Seer, usize::from(seer)).unwrap();
    game.set_role_count(Role::Cupid, usize::from(cupid)).unwrap();
    game.start().unwrap();
    game
}

/// Issues attack declarations, tolerating the outcomes arbitrary input can
/// legitimately produce: an actor whose werewolf probability has collapsed to
/// zero, or declarations that would contradict every remaining world.
fn declare_attacks(game: &mut Game, players: usize, attacks: &[(usize, usize)]) {
    for &(actor, target) in attacks {
        match game.werewolf(NAMES[actor % players], NAMES[target % players]) {
            Ok(()) | Err(GameError::ImpossibleRole { .. }) => {}
            Err(GameError::EmptyUniverse(_)) => break,
            Err(err) => panic!("unexpected error: {}", err)
        }
    }
}

proptest! {
    // 1. Every player's marginals over the roles in play sum to 1, no matter
    //    what has been declared.
    #[test]
    fn rows_sum_to_one(
        (seed, players, wolves, seer, cupid) in config_strategy(),
        attacks in prop::collection::vec((0usize..6, 0usize..6), 0..4)
    ) {
        let mut game = build(seed, players, wolves, seer, cupid);
        declare_attacks(&mut game, players, &attacks);
        for row in game.role_probabilities().unwrap() {
            let sum = row.roles.values().sum::<f64>();
            prop_assert!((sum - 1.0).abs() < 1e-9, "row for {} sums to {}", row.name, sum);
        }
    }

    // 2. With the evidence rule off, attack declarations only ever add
    //    weight, so nobody's death probability can go down.
    #[test]
    fn attacks_only_raise_death_probability(
        (seed, players, wolves, seer, cupid) in config_strategy(),
        targets in prop::collection::vec(0usize..6, 1..5)
    ) {
        let mut game = build(seed, players, wolves, seer, cupid);
        game.set_wolves_spare_wolves(false);
        let mut previous = NAMES[..players].iter()
            .map(|name| game.death_probability(name).unwrap())
            .collect::<Vec<_>>();
        for (actor, target) in targets.iter().enumerate().take(players) {
            // one declaration per actor: re-targeting may legitimately move
            // weight away from a victim
            game.werewolf(NAMES[actor], NAMES[target % players]).unwrap();
            let current = NAMES[..players].iter()
                .map(|name| game.death_probability(name).unwrap())
                .collect::<Vec<_>>();
            for (before, after) in previous.iter().zip(&current) {
                prop_assert!(after + 1e-9 >= *before, "{} dropped to {}", before, after);
            }
            previous = current;
        }
    }

    // 3. check_deaths never reports a player twice, never reports anyone
    //    short of certainty, and never reports the already-killed.
    #[test]
    fn reported_deaths_are_certain_and_unique(
        (seed, players, wolves, seer, cupid) in config_strategy(),
        attacks in prop::collection::vec((0usize..6, 0usize..6), 0..6)
    ) {
        let mut game = build(seed, players, wolves, seer, cupid);
        declare_attacks(&mut game, players, &attacks);
        let reported = game.check_deaths().unwrap();
        let mut seen = HashSet::new();
        for name in &reported {
            prop_assert!(seen.insert(name.clone()), "{} reported twice", name);
            prop_assert!(game.death_probability(name).unwrap() >= 1.0 - 1e-9);
            prop_assert!(game.is_alive(name).unwrap());
        }
    }

    // 4. A kill reveals a role that is certain in the collapsed universe and
    //    pins the death probability at exactly 1; a second kill is rejected
    //    without touching anything.
    #[test]
    fn kill_resolves_and_is_not_repeatable(
        (seed, players, wolves, seer, cupid) in config_strategy(),
        pick in 0usize..6
    ) {
        let mut game = build(seed, players, wolves, seer, cupid);
        let target = NAMES[pick % players];
        let revealed = game.kill(target).unwrap();
        let row = game.role_probabilities().unwrap()
            .into_iter()
            .find(|row| row.name == target)
            .unwrap();
        prop_assert_eq!(row.roles[&revealed], 1.0);
        prop_assert_eq!(row.dead, 1.0);
        prop_assert_eq!(game.death_probability(target).unwrap(), 1.0);
        let survivors = game.living_players().len();
        prop_assert!(matches!(game.kill(target), Err(GameError::DeadTarget(_))));
        prop_assert_eq!(game.living_players().len(), survivors);
    }
}
