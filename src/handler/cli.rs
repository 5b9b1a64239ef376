//! Terminal implementation of the driver interface: one shared screen,
//! handed from player to player by the moderator.

use std::io::{
    prelude::*,
    stdin,
    stdout
};
use console::{
    Style,
    Term
};
use rand::{
    seq::SliceRandom,
    thread_rng
};
use crate::{
    game::{
        PlayerProbabilities,
        Role,
        Winner
    },
    handler::{
        Interface,
        preposition
    }
};

const BAR_LENGTH: usize = 24;

/// A driver interface for the command line.
pub struct CliInterface {
    term: Term,
    display_order: Vec<usize>
}

impl CliInterface {
    /// Creates an interface on the standard terminal.
    pub fn new() -> CliInterface {
        CliInterface {
            term: Term::stdout(),
            display_order: Vec::default()
        }
    }

    /// Prompts for one line of input and returns it without the newline.
    pub fn prompt(&self, msg: &str) -> String {
        print!("[ ?? ] {}: ", msg);
        stdout().flush().expect("failed to flush stdout");
        let mut result = String::new();
        stdin().read_line(&mut result).expect("failed to read input");
        assert_eq!(result.pop(), Some('\n'));
        result
    }

    fn style(role: Role) -> Style {
        match role {
            Role::Werewolf => Style::new().red(),
            Role::Seer => Style::new().magenta(),
            Role::Hunter => Style::new().green(),
            Role::Cupid => Style::new().blue(),
            Role::Villager => Style::new().yellow()
        }
    }

    fn letter(role: Role) -> char {
        match role {
            Role::Werewolf => 'W',
            Role::Seer => 'S',
            Role::Hunter => 'H',
            Role::Cupid => 'C',
            Role::Villager => 'V'
        }
    }

    fn bar(chance: f64, role: Role) -> String {
        let length = (chance * BAR_LENGTH as f64).round() as usize;
        Self::letter(role).to_string().repeat(length)
    }
}

impl Default for CliInterface {
    fn default() -> CliInterface {
        CliInterface::new()
    }
}

impl Interface for CliInterface {
    fn begin(&mut self, names: &[String]) {
        // the public table prints in a shuffled order so that row position
        // gives nothing away
        self.display_order = (0..names.len()).collect();
        self.display_order.shuffle(&mut thread_rng());
    }

    fn clear(&mut self) {
        self.term.clear_screen().expect("failed to clear screen");
    }

    fn announce(&mut self, message: &str) {
        println!("[ ** ] {}", message);
    }

    fn pause(&mut self, message: &str) {
        print!("[ ?? ] {}", message);
        stdout().flush().expect("failed to flush stdout");
        let mut scratch = String::new();
        stdin().read_line(&mut scratch).expect("failed to read input");
    }

    fn choose_player(&mut self, prompt: &str, options: &[String]) -> Option<String> {
        if options.is_empty() {
            return None;
        }
        loop {
            let answer = self.prompt(prompt);
            if options.contains(&answer) {
                return Some(answer);
            }
            println!("[ !! ] {:?} is not a valid choice", answer);
            println!("[ !! ] valid choices are: {}", options.join(", "));
        }
    }

    fn show_role_profile(&mut self, row: &PlayerProbabilities) {
        println!("[ __ ] your role:");
        for (&role, &chance) in &row.roles {
            let style = Self::style(role);
            println!(
                "[ __ ]   {}: {:3.0}% |{}|",
                style.apply_to(format!("{:>8}", role)),
                chance * 100.0,
                style.apply_to(format!("{:<width$}", Self::bar(chance, role), width = BAR_LENGTH))
            );
        }
    }

    fn show_conditional_table(&mut self, header: &str, rows: &[(String, f64)], skip: &str, role: Role) {
        println!("[ __ ] {}", header);
        let style = Self::style(role).bold();
        for (name, chance) in rows {
            if name == skip { continue; }
            println!(
                "[ __ ]   {:>12}: {:3.0}% {}",
                name,
                chance * 100.0,
                style.apply_to(Self::bar(*chance, role))
            );
        }
    }

    fn show_probability_table(&mut self, rows: &[PlayerProbabilities], reveal: bool) {
        let order = if self.display_order.len() == rows.len() {
            self.display_order.clone()
        } else {
            (0..rows.len()).collect()
        };
        for idx in order {
            let row = &rows[idx];
            let name = if reveal || row.dead >= 1.0 { &row.name[..] } else { "???" };
            let mut line = format!("[ ** ] {:>12}    ", name);
            for (&role, &chance) in &row.roles {
                line.push_str(&Self::style(role).bold().apply_to(Self::bar(chance, role)).to_string());
            }
            line.push_str(&format!(" {:3.0}% dead", row.dead * 100.0));
            println!("{}", line);
        }
    }

    fn announce_kill(&mut self, name: &str, role: Role, cause: &str) {
        println!("[ ** ] {} was killed {}", name, cause);
        println!("[ ** ] {} was {}{}", name, preposition(role), Self::style(role).bold().apply_to(role));
    }

    fn announce_winner(&mut self, winner: Winner) {
        let bold = Style::new().bold();
        match winner {
            Winner::Nobody => println!("[ ** ] {}", bold.apply_to("EVERYONE IS DEAD. THE GAME IS A TIE")),
            _ => println!("[ ** ] {}", bold.apply_to(format!("THE {} WIN!", winner.to_string().to_uppercase())))
        }
    }
}
