//! Operator prompts
//!
//! The slicing pipeline never talks to the terminal itself; it receives
//! answers through the [`Prompter`] trait. `TerminalPrompter` reads lines
//! from stdin and writes questions to stderr so stdout stays reserved for
//! the rendered document.

use std::io::{BufRead, Write};

use crate::error::Result;

/// Ask a question, get a line back
pub trait Prompter {
    /// Returns the trimmed answer, or `default` (or "") when the answer is empty
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String>;
}

/// Line-based prompter over arbitrary reader/writer pairs
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompts on stderr, answers from stdin
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(default) => write!(self.output, "{} [{}]: ", question, default)?,
            None => write!(self.output, "{}: ", question)?,
        }
        self.output.flush()?;

        let mut line = String::new();
        // EOF reads as an empty answer
        self.input.read_line(&mut line)?;

        Ok(answer_or_default(&line, default))
    }
}

/// Answers every question with its default, without asking
#[derive(Debug, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn ask(&mut self, _question: &str, default: Option<&str>) -> Result<String> {
        Ok(default.unwrap_or_default().to_string())
    }
}

/// Replays canned answers; records the questions it was asked
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        self.asked.push(question.to_string());
        let answer = self.answers.pop_front().unwrap_or_default();
        Ok(answer_or_default(&answer, default))
    }
}

fn answer_or_default(answer: &str, default: Option<&str>) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        default.unwrap_or_default().to_string()
    } else {
        answer.to_string()
    }
}
