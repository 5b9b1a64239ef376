#![warn(trivial_casts)]
#![deny(unused)]
#![forbid(unused_extern_crates, unused_import_braces)]

use std::process::exit;
use clap::Parser;
use rand::{
    SeedableRng,
    rngs::StdRng
};
use schroedingers_wolves::{
    Game,
    game::Role,
    handler::{
        self,
        CliInterface
    }
};

/// Moderate a game of quantum werewolf at a shared terminal.
#[derive(Parser)]
#[command(name = "sww")]
struct Args {
    /// Role configuration, e.g. "werewolf=2,seer=1,cupid=1".
    #[arg(long)]
    roles: Option<String>,
    /// Seed the engine's randomness for a reproducible session.
    #[arg(long)]
    seed: Option<u64>,
    /// Allow werewolves to attack each other.
    #[arg(long)]
    friendly_fire: bool
}

fn parse_roles(arg: &str) -> Result<Vec<(Role, usize)>, String> {
    arg.split(',')
        .map(|entry| {
            let (role, count) = entry.split_once('=').ok_or_else(|| format!("expected role=count, got {:?}", entry))?;
            let role = role.trim().parse::<Role>().map_err(|()| format!("no such role: {:?}", role.trim()))?;
            let count = count.trim().parse::<usize>().map_err(|err| format!("bad count for {}: {}", role, err))?;
            Ok((role, count))
        })
        .collect()
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let mut game = match args.seed {
        Some(seed) => Game::with_rng(StdRng::seed_from_u64(seed)),
        None => Game::new()
    };
    if args.friendly_fire {
        game.set_wolves_spare_wolves(false);
    }
    let mut interface = CliInterface::new();
    println!("[ ** ] enter player names one at a time; leave blank to finish");
    loop {
        let name = interface.prompt("player name");
        if name.is_empty() {
            break;
        }
        game.add_players([name]).expect("signups are still open");
    }
    if let Some(arg) = &args.roles {
        let counts = parse_roles(arg).unwrap_or_else(|err| {
            eprintln!("[ !! ] {}", err);
            exit(2);
        });
        for (role, count) in counts {
            if let Err(err) = game.set_role_count(role, count) {
                eprintln!("[ !! ] {}", err);
                exit(2);
            }
        }
    }
    if let Err(err) = game.start() {
        eprintln!("[ !! ] failed to start game: {}", err);
        exit(2);
    }
    println!("[ ** ] playing with:");
    for &role in game.used_roles() {
        let count = game.role_count(role);
        println!("[ ** ]   {} {}{}", count, role, if count == 1 { "" } else { "s" });
    }
    if let Err(err) = handler::run(&mut game, &mut interface) {
        eprintln!("[ !! ] fatal: {}", err);
        exit(1);
    }
}
