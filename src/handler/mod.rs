//! The driver seam: the `Interface` trait the moderation loop talks through,
//! and the loop itself.
//!
//! Everything here is presentation and sequencing. Game facts only ever
//! change through the public `Game` handlers, and recoverable input problems
//! (unknown names, dead targets) are prevented by prompting from live option
//! lists rather than handled after the fact.

pub mod cli;

use std::mem;
use crate::game::{
    Game,
    GameError,
    PlayerProbabilities,
    Role,
    Winner
};
pub use self::cli::CliInterface;

/// The moderation loop uses this trait for all input and output.
pub trait Interface {
    /// Called once when moderation begins, with the roster in signup order.
    fn begin(&mut self, _names: &[String]) {}

    /// Clears the screen between private turn segments.
    fn clear(&mut self) {}

    /// Prints a public game message.
    fn announce(&mut self, message: &str);

    /// Blocks until the operator confirms, e.g. before handing the terminal
    /// to the next player.
    fn pause(&mut self, message: &str);

    /// Asks for one of `options`, re-asking until the answer is valid.
    ///
    /// Returns `None` only when there is nothing to choose from or the
    /// implementation supports declining.
    fn choose_player(&mut self, prompt: &str, options: &[String]) -> Option<String>;

    /// Shows a player their own role superposition.
    fn show_role_profile(&mut self, row: &PlayerProbabilities);

    /// Shows a conditional-probability table (fellow werewolves, lover
    /// candidates), skipping the player's own row.
    fn show_conditional_table(&mut self, header: &str, rows: &[(String, f64)], skip: &str, role: Role);

    /// Shows the public probability table. With `reveal`, all names are
    /// uncovered for the post-game reveal.
    fn show_probability_table(&mut self, rows: &[PlayerProbabilities], reveal: bool);

    /// Announces a resolved death and the role it uncovered.
    fn announce_kill(&mut self, name: &str, role: Role, cause: &str);

    /// Announces the end of the game.
    fn announce_winner(&mut self, winner: Winner);
}

/// The article to put before a role name: unique roles get "the".
pub(crate) fn preposition(role: Role) -> &'static str {
    match role {
        Role::Werewolf | Role::Villager => "a ",
        Role::Seer | Role::Hunter => "the ",
        Role::Cupid => ""
    }
}

fn living(game: &Game) -> Vec<String> {
    game.living_players().into_iter().map(String::from).collect()
}

/// Moderates a started game to completion and returns the winner.
///
/// Each turn: one private night segment per living player (cupid's binding on
/// the first night, then seer inspections and werewolf attacks as the live
/// marginals permit), then the day: night deaths, the lynch vote, and a win
/// check after each resolution step.
///
/// Errors reaching the caller from here are driver contract violations or an
/// `EmptyUniverse`; both end the session.
pub fn run<I: Interface>(game: &mut Game, interface: &mut I) -> Result<Winner, GameError> {
    let names = game.player_names().map(String::from).collect::<Vec<_>>();
    interface.begin(&names);
    loop {
        let turn = game.next_turn()?;
        interface.clear();
        interface.announce("night falls and all players take their actions in turns, privately");
        let cupid_used = game.used_roles().contains(&Role::Cupid);
        // conditional tables are snapshotted before anyone acts, so that one
        // player's night action cannot leak through another player's display
        let fellow_wolves = names.iter()
            .map(|name| game.other_werewolves(name))
            .collect::<Result<Vec<_>, _>>()?;
        let lover_tables = if cupid_used && turn > 1 {
            Some(names.iter()
                .map(|name| game.other_lover(name))
                .collect::<Result<Vec<_>, _>>()?)
        } else {
            None
        };
        for (idx, name) in names.iter().enumerate() {
            if !game.is_alive(name)? { continue; }
            interface.pause(&format!("{}'s turn (press ENTER to continue)", name));
            interface.clear();
            interface.announce(&format!("{}'s turn", name));
            // gating reads the live table: an earlier action tonight may
            // already have collapsed this player's options
            let row = game.role_probabilities()?.swap_remove(idx);
            interface.show_role_profile(&row);
            let chance = |role: Role| row.roles.get(&role).copied().unwrap_or(0.0);
            if cupid_used {
                if turn == 1 && chance(Role::Cupid) > 0.0 {
                    let options = living(game);
                    if let Some(first) = interface.choose_player("[CUPID] who do you choose as first lover?", &options) {
                        let rest = options.into_iter().filter(|option| *option != first).collect::<Vec<_>>();
                        if let Some(second) = interface.choose_player("[CUPID] who do you choose as second lover?", &rest) {
                            game.cupid(name, &first, &second)?;
                            interface.announce(&format!("{} and {} are now lovers", first, second));
                        }
                    }
                } else if let Some(tables) = &lover_tables {
                    interface.show_conditional_table("[CUPID] your lover is:", &tables[idx], name, Role::Cupid);
                }
            }
            if chance(Role::Seer) > 0.0 {
                if let Some(target) = interface.choose_player("[SEER] whose role do you inspect?", &living(game)) {
                    let revealed = game.seer(name, &target)?;
                    interface.announce(&format!("{} is {}{}", target, preposition(revealed), revealed));
                }
            }
            // the player's own seer revelation may just have collapsed their
            // werewolf marginal to zero, so this gate re-reads the live table
            let wolf_chance = game.role_probabilities()?
                .swap_remove(idx)
                .roles
                .get(&Role::Werewolf)
                .copied()
                .unwrap_or(0.0);
            if wolf_chance > 0.0 {
                interface.show_conditional_table("[WEREWOLF] your fellow werewolves are:", &fellow_wolves[idx], name, Role::Werewolf);
                if let Some(target) = interface.choose_player("[WEREWOLF] who do you attack?", &living(game)) {
                    game.werewolf(name, &target)?;
                }
            }
            interface.pause("(press ENTER to continue)");
            interface.clear();
        }
        interface.pause("all players have had their turn (press ENTER to continue)");
        interface.clear();
        interface.announce("the day begins");
        let overnight = game.check_deaths()?;
        process_deaths(game, interface, overnight, "during the night")?;
        if let Some(winner) = finish_if_won(game, interface)? {
            return Ok(winner);
        }
        interface.show_probability_table(&game.role_probabilities()?, false);
        if let Some(target) = interface.choose_player("[ALL VILLAGERS] who do you lynch?", &living(game)) {
            process_deaths(game, interface, vec![target], "by the vote")?;
        }
        if let Some(winner) = finish_if_won(game, interface)? {
            return Ok(winner);
        }
        interface.pause("(press ENTER to continue)");
    }
}

/// Resolves a batch of deaths, the hunter shots they trigger, and the chain
/// of lover deaths that certainty propagation uncovers, until no further
/// death is certain.
fn process_deaths<I: Interface>(game: &mut Game, interface: &mut I, queue: Vec<String>, cause: &str) -> Result<(), GameError> {
    let mut queue = queue;
    let mut cause = cause;
    while !queue.is_empty() {
        for name in mem::take(&mut queue) {
            // a hunter shot earlier in this batch may have got there first
            if !game.is_alive(&name)? { continue; }
            let mut victim = name;
            let mut revealed = game.kill(&victim)?;
            interface.announce_kill(&victim, revealed, cause);
            while revealed == Role::Hunter {
                let options = living(game);
                let Some(target) = interface.choose_player(&format!("[HUNTER] {}, who do you shoot?", victim), &options) else { break };
                revealed = game.kill(&target)?;
                interface.announce_kill(&target, revealed, "by the hunter");
                victim = target;
            }
        }
        queue = game.check_deaths()?;
        cause = "of a broken heart";
    }
    Ok(())
}

fn finish_if_won<I: Interface>(game: &mut Game, interface: &mut I) -> Result<Option<Winner>, GameError> {
    let winner = game.check_win()?;
    if let Some(winner) = winner {
        interface.announce_winner(winner);
        interface.show_probability_table(&game.role_probabilities()?, true);
        game.stop()?;
    }
    Ok(winner)
}
