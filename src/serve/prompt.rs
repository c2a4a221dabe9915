//! Interactive yes/no confirmation.

use std::io::{self, BufRead, Write};

/// Answers yes/no questions.
///
/// Anything other than an explicit yes is a decline.
pub trait Confirm {
    fn confirm(&self, question: &str) -> bool;
}

/// Declines every question.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl Confirm for Decline {
    fn confirm(&self, question: &str) -> bool {
        tracing::debug!("Declining: {}", question);
        false
    }
}

/// Asks on stderr and reads one line from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str) -> bool {
        eprint!("{} [y/N]: ", question);
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                tracing::debug!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

/// Whether an answer counts as yes (`y` or `yes`, any case).
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
