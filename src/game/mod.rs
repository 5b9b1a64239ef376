//! Core game logic: lifecycle, action handlers, and the win checker.

mod probability;
mod types;
mod universe;

use log::{
    info,
    warn
};
use rand::{
    RngCore,
    SeedableRng,
    rngs::StdRng
};
use crate::{
    game::{
        probability::{
            AttackLedger,
            LoverRegistry,
            marginal
        },
        universe::Universe
    },
    util::SwwIteratorExt
};
pub use crate::game::{
    probability::PlayerProbabilities,
    types::{
        GameError,
        Role,
        RoleCounts,
        Winner
    },
    universe::EmptyUniverse
};

/// Death probabilities at least this close to 1 count as certain.
///
/// The averaged attack sums are rational (multiples of `1 / werewolf_count`
/// over the world count) but accumulate in floating point, so an exact-1
/// comparison can miss a certainty by one ulp.
const CERTAIN: f64 = 1.0 - 1e-9;

/// One signed-up player. The index into the roster is the player's identity
/// for the lifetime of the game; `killed` flips false to true exactly once.
#[derive(Debug, Clone)]
struct Player {
    name: String,
    killed: bool
}

/// A game of quantum werewolf.
///
/// Roles are never dealt out. The game tracks every assignment consistent
/// with the configuration and collapses that set as players act and
/// information leaks; all probabilities shown to players are marginals over
/// it. Drivers interact exclusively through the methods here; there is no
/// way to reach the universe, the attack ledger, or the lover registry
/// directly.
///
/// All calls are synchronous and must be serialized by the owning driver.
pub struct Game {
    players: Vec<Player>,
    config: RoleCounts,
    used_roles: Vec<Role>,
    universe: Option<Universe>,
    ledger: AttackLedger,
    lovers: LoverRegistry,
    werewolf_count: usize,
    started: bool,
    turn: u32,
    wolves_spare_wolves: bool,
    rng: Box<dyn RngCore>
}

impl Default for Game {
    fn default() -> Game {
        Game::with_rng(StdRng::from_entropy())
    }
}

impl Game {
    /// Creates an empty game with an OS-seeded random source.
    pub fn new() -> Game {
        Game::default()
    }

    /// Creates an empty game drawing all resolution randomness from `rng`.
    ///
    /// A seeded source replays a game deterministically, which is how the
    /// test suite pins down sampled outcomes.
    pub fn with_rng(rng: impl RngCore + 'static) -> Game {
        Game {
            players: Vec::default(),
            config: RoleCounts::default(),
            used_roles: Vec::default(),
            universe: None,
            ledger: AttackLedger::default(),
            lovers: LoverRegistry::default(),
            werewolf_count: 0,
            started: false,
            turn: 0,
            wolves_spare_wolves: true,
            rng: Box::new(rng)
        }
    }

    fn ensure_started(&self) -> Result<(), GameError> {
        if self.started { Ok(()) } else { Err(GameError::NotStarted) }
    }

    fn ensure_signups(&self) -> Result<(), GameError> {
        if self.started { Err(GameError::AlreadyStarted) } else { Ok(()) }
    }

    /// The universe of a game that has started at least once. Read-only
    /// queries keep working after `stop` so the final reveal can be rendered.
    pub(crate) fn universe(&self) -> Result<&Universe, GameError> {
        self.universe.as_ref().ok_or(GameError::NotStarted)
    }

    pub(crate) fn index_of(&self, name: &str) -> Result<usize, GameError> {
        self.players.iter()
            .position(|player| player.name == name)
            .ok_or_else(|| GameError::UnknownPlayer(name.to_owned()))
    }

    /// Signs up players. Names must be unique; duplicates are skipped with a
    /// warning rather than rejected, so a whole list can be submitted at once.
    pub fn add_players<I, S>(&mut self, names: I) -> Result<(), GameError>
    where I: IntoIterator<Item = S>, S: Into<String> {
        self.ensure_signups()?;
        for name in names {
            let name = name.into();
            if self.players.iter().any(|player| player.name == name) {
                warn!("player {:?} already exists", name);
                continue;
            }
            self.players.push(Player { name, killed: false });
        }
        Ok(())
    }

    /// Sets the requested count for a role kind.
    ///
    /// The villager count cannot be set: it is derived at `start` from
    /// whatever the special roles leave over.
    pub fn set_role_count(&mut self, role: Role, count: usize) -> Result<(), GameError> {
        self.ensure_signups()?;
        if role == Role::Villager {
            return Err(GameError::DerivedRole(role));
        }
        self.config.set_count(role, count);
        Ok(())
    }

    /// Starts the game: freezes the roster, derives the villager count, and
    /// generates the universe of all consistent role assignments.
    ///
    /// Fails without starting if the roster is empty or the special roles
    /// outnumber the players; the configuration stays editable for a retry.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.ensure_signups()?;
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        let specials = self.config.specials();
        if specials > self.players.len() {
            return Err(GameError::InvalidRoleCount { roles: specials, players: self.players.len() });
        }
        self.config.set_count(Role::Villager, self.players.len() - specials);
        self.used_roles = self.config.used_roles();
        self.werewolf_count = self.config.count(Role::Werewolf);
        let universe = Universe::generate(&self.config.pool());
        info!("game started: {} players, {} possible worlds", self.players.len(), universe.total_count());
        self.universe = Some(universe);
        self.ledger = AttackLedger::new(self.players.len());
        self.lovers.clear();
        for player in &mut self.players {
            player.killed = false;
        }
        self.turn = 0;
        self.started = true;
        Ok(())
    }

    /// Stops the game. History is kept: probability queries and the win check
    /// still answer, only mutation is frozen.
    pub fn stop(&mut self) -> Result<(), GameError> {
        self.ensure_started()?;
        self.started = false;
        info!("game stopped");
        Ok(())
    }

    /// Returns the game to its pre-signup defaults, stopping it first if
    /// necessary. The random source and optional-rule settings survive.
    pub fn reset(&mut self) {
        self.players.clear();
        self.config = RoleCounts::default();
        self.used_roles.clear();
        self.universe = None;
        self.ledger = AttackLedger::default();
        self.lovers.clear();
        self.werewolf_count = 0;
        self.started = false;
        self.turn = 0;
        info!("game reset");
    }

    /// Whether the game is currently running.
    pub fn started(&self) -> bool {
        self.started
    }

    /// The current turn number. 0 until the first `next_turn` call.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Advances to the next turn and returns its number (1-based).
    pub fn next_turn(&mut self) -> Result<u32, GameError> {
        self.ensure_started()?;
        self.turn += 1;
        Ok(self.turn)
    }

    /// All signed-up player names, in signup order.
    pub fn player_names(&self) -> impl Iterator<Item = &str> {
        self.players.iter().map(|player| &player.name[..])
    }

    /// The names of all players not yet killed, in signup order.
    pub fn living_players(&self) -> Vec<&str> {
        self.players.iter()
            .filter(|player| !player.killed)
            .map(|player| &player.name[..])
            .collect()
    }

    /// Whether the named player is still alive.
    pub fn is_alive(&self, name: &str) -> Result<bool, GameError> {
        Ok(!self.players[self.index_of(name)?].killed)
    }

    /// The role kinds in play, in catalog order. Frozen at `start`.
    pub fn used_roles(&self) -> &[Role] {
        &self.used_roles
    }

    /// The configured count for a role kind. The villager entry is only
    /// meaningful once `start` has derived it.
    pub fn role_count(&self, role: Role) -> usize {
        self.config.count(role)
    }

    /// The number of werewolves not yet confirmed dead.
    pub fn werewolf_count(&self) -> usize {
        self.werewolf_count
    }

    /// Sets the optional rule that werewolves never target their own kind
    /// (default: on). Under it, an attack declaration is itself evidence: all
    /// worlds where actor and target are both werewolves are eliminated.
    pub fn set_wolves_spare_wolves(&mut self, spare: bool) {
        self.wolves_spare_wolves = spare;
    }

    /// Performs the seer action: reveals the target's role in one world drawn
    /// uniformly from those where the actor is the seer, then eliminates
    /// every world (seer-consistent or not) that disagrees with the
    /// revelation.
    ///
    /// The actor must plausibly be the seer (`ImpossibleRole` otherwise, a
    /// driver contract violation) and both players must be alive. Failed
    /// preconditions mutate nothing.
    pub fn seer(&mut self, actor: &str, target: &str) -> Result<Role, GameError> {
        self.ensure_started()?;
        let actor_idx = self.index_of(actor)?;
        let target_idx = self.index_of(target)?;
        if self.players[actor_idx].killed {
            return Err(GameError::DeadActor(actor.to_owned()));
        }
        if self.players[target_idx].killed {
            return Err(GameError::DeadTarget(target.to_owned()));
        }
        let universe = self.universe.as_mut().ok_or(GameError::NotStarted)?;
        if marginal(universe, actor_idx, Role::Seer) == 0.0 {
            return Err(GameError::ImpossibleRole { actor: actor.to_owned(), role: Role::Seer });
        }
        let revealed = universe.worlds()
            .filter(|world| world[actor_idx] == Role::Seer)
            .choose_uniform(&mut self.rng)
            .ok_or(EmptyUniverse)?
            [target_idx];
        let dropped = universe.collapse(|world| world[target_idx] == revealed)?;
        info!("{} saw that {} is a {} ({} worlds eliminated)", actor, target, revealed, dropped);
        Ok(revealed)
    }

    /// Performs the werewolf action: records a fractional attack of
    /// `1 / werewolf_count` by the actor against the target.
    ///
    /// Every player whose werewolf probability is nonzero declares each
    /// night; in any one world exactly `werewolf_count` of them are real
    /// werewolves, so unanimous true werewolves sum to weight 1 on their
    /// victim. A re-declaration replaces the actor's previous target.
    pub fn werewolf(&mut self, actor: &str, target: &str) -> Result<(), GameError> {
        self.ensure_started()?;
        let actor_idx = self.index_of(actor)?;
        let target_idx = self.index_of(target)?;
        if self.players[actor_idx].killed {
            return Err(GameError::DeadActor(actor.to_owned()));
        }
        if self.players[target_idx].killed {
            return Err(GameError::DeadTarget(target.to_owned()));
        }
        let universe = self.universe.as_mut().ok_or(GameError::NotStarted)?;
        if marginal(universe, actor_idx, Role::Werewolf) == 0.0 {
            return Err(GameError::ImpossibleRole { actor: actor.to_owned(), role: Role::Werewolf });
        }
        self.ledger.declare(target_idx, actor_idx, 1.0 / self.werewolf_count as f64);
        info!("{} marked an attack on {}", actor, target);
        if self.wolves_spare_wolves && actor_idx != target_idx {
            let dropped = universe.collapse(|world| {
                !(world[actor_idx] == Role::Werewolf && world[target_idx] == Role::Werewolf)
            })?;
            if dropped > 0 {
                info!("attack rules out shared werewolfhood ({} worlds eliminated)", dropped);
            }
        }
        Ok(())
    }

    /// Performs the cupid action: binds two players into a shared-fate pair.
    ///
    /// No collapse happens here. The binding only becomes evidence through
    /// later death-probability computation, and only inside worlds that
    /// assign the cupid role to the acting player.
    pub fn cupid(&mut self, actor: &str, lover1: &str, lover2: &str) -> Result<(), GameError> {
        self.ensure_started()?;
        let actor_idx = self.index_of(actor)?;
        let lover1_idx = self.index_of(lover1)?;
        let lover2_idx = self.index_of(lover2)?;
        self.lovers.record(actor_idx, lover1_idx, lover2_idx);
        info!("{} bound {} and {} together", actor, lover1, lover2);
        Ok(())
    }

    /// Kills a player: samples one valid world uniformly, fixes the target's
    /// role to what it is there, and eliminates every disagreeing world.
    ///
    /// A target revealed as werewolf decrements the live werewolf count and
    /// retracts all attacks they had declared. Returns the revealed role.
    pub fn kill(&mut self, target: &str) -> Result<Role, GameError> {
        self.ensure_started()?;
        let target_idx = self.index_of(target)?;
        if self.players[target_idx].killed {
            return Err(GameError::DeadTarget(target.to_owned()));
        }
        let universe = self.universe.as_mut().ok_or(GameError::NotStarted)?;
        let revealed = universe.sample_uniform(&mut self.rng)
            .ok_or(EmptyUniverse)?
            [target_idx];
        let dropped = universe.collapse(|world| world[target_idx] == revealed)?;
        if revealed == Role::Werewolf {
            self.werewolf_count -= 1;
            self.ledger.retract_actor(target_idx);
        }
        self.players[target_idx].killed = true;
        info!("{} died and was a {} ({} worlds eliminated)", target, revealed, dropped);
        Ok(revealed)
    }

    /// The players whose death has become certain but who have not yet been
    /// put through `kill`.
    ///
    /// Death certainty and role identity are separate facts: a player can be
    /// dead in every world while their role is still in superposition, so the
    /// caller must follow up with `kill` on each name to resolve it.
    pub fn check_deaths(&self) -> Result<Vec<String>, GameError> {
        self.ensure_started()?;
        let universe = self.universe()?;
        Ok(self.players.iter()
            .enumerate()
            .filter(|(_, player)| !player.killed)
            .filter(|&(idx, _)| self.death_probability_in(universe, idx) >= CERTAIN)
            .map(|(_, player)| player.name.clone())
            .collect())
    }

    /// Checks whether any faction has won.
    ///
    /// A faction wins only when its condition holds in every valid world;
    /// mere probability is not enough. Living players are determined by the
    /// kill flags, not by the worlds. Returns `None` while the game is
    /// undecided.
    pub fn check_win(&self) -> Result<Option<Winner>, GameError> {
        let universe = self.universe()?;
        let mut all_dead = true;
        let mut villagers = true;
        let mut werewolves = true;
        let mut lovers = true;
        for world in universe.worlds() {
            let pair = self.lovers.bound_pair(world);
            for (idx, &role) in world.iter().enumerate() {
                if self.players[idx].killed { continue; }
                all_dead = false;
                if role == Role::Werewolf {
                    villagers = false;
                } else {
                    werewolves = false;
                }
                if pair.map_or(true, |(lover1, lover2)| idx != lover1 && idx != lover2) {
                    lovers = false;
                }
            }
        }
        Ok(if all_dead {
            Some(Winner::Nobody)
        } else if villagers {
            Some(Winner::Villagers)
        } else if werewolves {
            Some(Winner::Werewolves)
        } else if lovers {
            Some(Winner::Lovers)
        } else {
            None
        })
    }
}
