//! A [Quantum Werewolf](http://puzzle.cisra.com.au/2008/quantumwerewolf.html) engine.
//!
//! Roles are never secretly dealt: the game holds every assignment still
//! consistent with the configuration and the actions taken so far, and
//! collapses that superposition as players act and information leaks. All
//! probabilities shown to players are exact marginals over the surviving
//! assignments.

#![cfg_attr(test, deny(warnings))]
#![warn(trivial_casts)]
#![deny(missing_docs)]
#![deny(unused, unused_extern_crates, unused_import_braces)]

pub mod game;
pub mod handler;
mod util;

pub use game::Game;
