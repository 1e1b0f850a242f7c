use crate::error::Result;
use colored::Colorize;
use std::io::{self, Write};

/// Asks whether a finished update branch should be pushed.
pub trait PushConfirmation {
    fn confirm_push(&mut self, branch: &str, commits: &[String]) -> Result<bool>;
}

/// Interpretation of one line typed at the push prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Yes,
    No,
    Unrecognized,
}

/// Empty input means yes.
pub fn parse_answer(input: &str) -> PromptAnswer {
    match input.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => PromptAnswer::Yes,
        "n" | "no" => PromptAnswer::No,
        _ => PromptAnswer::Unrecognized,
    }
}

/// Terminal prompt on stdin/stdout. Blocks until the user answers.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl PushConfirmation for ConsolePrompt {
    fn confirm_push(&mut self, branch: &str, commits: &[String]) -> Result<bool> {
        println!("\n{} {}", "Commits on".cyan().bold(), branch.white().bold());
        for commit in commits {
            println!("\t{}", commit);
        }
        println!();

        loop {
            print!("{}", "push these changes? [Y/n]: ".bold());
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                // stdin closed: nobody can confirm
                println!();
                return Ok(false);
            }

            match parse_answer(&input) {
                PromptAnswer::Yes => return Ok(true),
                PromptAnswer::No => {
                    println!("{}", "Leaving branch local.".dimmed());
                    return Ok(false);
                }
                PromptAnswer::Unrecognized => {
                    println!("{}", "Please answer with y(es) or n(o).".red());
                }
            }
        }
    }
}
