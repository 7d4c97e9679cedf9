//! # Operator confirmation channel.
//!
//! [`ConfirmPrompt`] is a blocking, line-based question/answer abstraction.
//! The signal listener always calls it through `spawn_blocking`, so
//! implementations are free to block on stdin, a socket or a channel.

use std::io::{BufRead, Write};

use crate::error::PromptError;

/// Operator's answer to a confirmation question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// Go ahead.
    Yes,
    /// Keep running.
    No,
}

impl Confirmation {
    /// Interprets a typed answer: `y`, `ye`, `yes` (any case) are [`Confirmation::Yes`].
    ///
    /// ```
    /// use missionvisor::Confirmation;
    ///
    /// assert_eq!(Confirmation::from_answer(" YES\n"), Confirmation::Yes);
    /// assert_eq!(Confirmation::from_answer("nah"), Confirmation::No);
    /// ```
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "ye" | "yes" => Confirmation::Yes,
            _ => Confirmation::No,
        }
    }
}

/// Blocking yes/no prompt.
pub trait ConfirmPrompt: Send + Sync + 'static {
    /// Asks `question` and blocks until an answer is available.
    ///
    /// Returns [`PromptError::Closed`] when the channel ends before an answer.
    fn confirm(&self, question: &str) -> Result<Confirmation, PromptError>;
}

/// Prompt on the process's stdin/stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, question: &str) -> Result<Confirmation, PromptError> {
        let mut out = std::io::stdout().lock();
        write!(out, "{question} ")?;
        out.flush()?;
        drop(out);

        read_answer(&mut std::io::stdin().lock())
    }
}

fn read_answer(input: &mut impl BufRead) -> Result<Confirmation, PromptError> {
    let mut line = String::new();
    match input.read_line(&mut line)? {
        0 => Err(PromptError::Closed),
        _ => Ok(Confirmation::from_answer(&line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_one_answer_line() {
        let mut input = std::io::Cursor::new("ye\nno\n");
        assert_eq!(read_answer(&mut input).unwrap(), Confirmation::Yes);
        assert_eq!(read_answer(&mut input).unwrap(), Confirmation::No);
    }

    #[test]
    fn eof_means_closed() {
        let mut input = std::io::Cursor::new("");
        assert!(matches!(read_answer(&mut input), Err(PromptError::Closed)));
    }

    #[test]
    fn empty_line_is_a_decline() {
        let mut input = std::io::Cursor::new("\n");
        assert_eq!(read_answer(&mut input).unwrap(), Confirmation::No);
    }
}
