//! Interactive prompts for the deploy scripts.
//!
//! Workflows talk to the operator through the [`Prompter`] trait. The
//! [`TerminalPrompter`] re-asks until a value passes validation, while the
//! [`ScriptedPrompter`] replays canned answers and fails on the first
//! invalid one.

use alloy_primitives::{Address, B256};
use eyre::{eyre, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

/// Checks a prompted value, returning the message to show on rejection
pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), String>;

/// One entry of a single-choice selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    /// The text shown to the operator
    pub label: String,
    /// The value returned when the entry is selected
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Collects validated values from the operator
pub trait Prompter {
    /// Prompt for a text value, using `default` when the answer is empty
    fn input(&mut self, message: &str, default: Option<&str>, validate: Validator<'_>)
        -> Result<String>;

    /// Prompt for a secret value
    fn password(&mut self, message: &str, validate: Validator<'_>) -> Result<String>;

    /// Prompt for one of `choices`, returning the selected value
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<String>;

    /// Prompt for a yes/no answer
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
}

// --------------
// | Validators |
// --------------

/// Accept a hex-encoded Ethereum address
pub fn validate_address(value: &str) -> Result<(), String> {
    if is_valid_eth_address_format(value) {
        Ok(())
    } else {
        Err("Pass a valid address value (0x followed by 40 hex characters)".to_string())
    }
}

/// Accept a hex-encoded 32-byte private key
pub fn validate_private_key(value: &str) -> Result<(), String> {
    B256::from_str(value.trim())
        .map(|_| ())
        .map_err(|_| "Pass a valid Private Key value".to_string())
}

/// Accept a non-negative integer
pub fn validate_u64(value: &str) -> Result<(), String> {
    value
        .trim()
        .parse::<u64>()
        .map(|_| ())
        .map_err(|_| "Pass a valid non-negative integer".to_string())
}

/// Accept a non-negative integer that fits in 128 bits
pub fn validate_u128(value: &str) -> Result<(), String> {
    value
        .trim()
        .parse::<u128>()
        .map(|_| ())
        .map_err(|_| "Pass a valid non-negative integer".to_string())
}

/// Function to validate an Ethereum address format
/// This is a simple check for the 0x prefix and length
pub fn is_valid_eth_address_format(address: &str) -> bool {
    let address = address.trim();
    address.len() == 42 && address.starts_with("0x") && Address::from_str(address).is_ok()
}

// ------------
// | Terminal |
// ------------

/// A prompter reading answers line by line, re-asking until a value is valid
pub struct TerminalPrompter<R, W> {
    /// The source of answers
    reader: R,
    /// Where prompts and rejections are printed
    writer: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// A prompter on the process's standard input and output
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// General function to prompt for input with a specific message
    fn prompt_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{}: ", prompt)?;
        self.writer.flush()?;

        let mut input = String::new();
        if self.reader.read_line(&mut input)? == 0 {
            return Err(eyre!("input closed while waiting for: {}", prompt));
        }

        Ok(input.trim().to_string())
    }

    fn reject(&mut self, reason: &str) -> Result<()> {
        writeln!(self.writer, "{}", reason)?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn input(
        &mut self,
        message: &str,
        default: Option<&str>,
        validate: Validator<'_>,
    ) -> Result<String> {
        let prompt = match default {
            Some(default) => format!("{} [{}]", message, default),
            None => message.to_string(),
        };

        loop {
            let mut answer = self.prompt_line(&prompt)?;
            // Use the default value if the input is empty
            if answer.is_empty() {
                if let Some(default) = default {
                    answer = default.to_string();
                }
            }

            match validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(reason) => self.reject(&reason)?,
            }
        }
    }

    fn password(&mut self, message: &str, validate: Validator<'_>) -> Result<String> {
        loop {
            let answer = self.prompt_line(message)?;
            match validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(reason) => self.reject(&reason)?,
            }
        }
    }

    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<String> {
        if choices.is_empty() {
            return Err(eyre!("nothing to select for: {}", message));
        }

        writeln!(self.writer, "{}", message)?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.writer, "  {}) {}", i + 1, choice.label)?;
        }

        loop {
            let answer = self.prompt_line("Select")?;
            if let Some(choice) = find_choice(choices, &answer) {
                return Ok(choice.value.clone());
            }
            self.reject(&format!(
                "Invalid selection. Please enter a number between 1 and {}.",
                choices.len()
            ))?;
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        let prompt = format!("{} ({})", message, hint);

        loop {
            let answer = self.prompt_line(&prompt)?;
            match parse_yes_no(&answer, default) {
                Some(answer) => return Ok(answer),
                None => self.reject("Please answer y or n.")?,
            }
        }
    }
}

// ------------
// | Scripted |
// ------------

/// A prompter replaying a fixed list of answers, for tests and
/// non-interactive runs.
///
/// An empty answer selects the prompt's default.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    /// The answers still to be given
    answers: VecDeque<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    /// The number of answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self, message: &str) -> Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| eyre!("no scripted answer for: {}", message))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(
        &mut self,
        message: &str,
        default: Option<&str>,
        validate: Validator<'_>,
    ) -> Result<String> {
        let mut answer = self.next_answer(message)?;
        if answer.is_empty() {
            answer = default.unwrap_or_default().to_string();
        }

        validate(&answer).map_err(|reason| eyre!("{}: {}", message, reason))?;
        Ok(answer)
    }

    fn password(&mut self, message: &str, validate: Validator<'_>) -> Result<String> {
        let answer = self.next_answer(message)?;
        validate(&answer).map_err(|reason| eyre!("{}: {}", message, reason))?;
        Ok(answer)
    }

    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<String> {
        let answer = self.next_answer(message)?;
        find_choice(choices, &answer)
            .map(|choice| choice.value.clone())
            .ok_or_else(|| eyre!("{}: `{}` is not one of the choices", message, answer))
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let answer = self.next_answer(message)?;
        parse_yes_no(&answer, default)
            .ok_or_else(|| eyre!("{}: `{}` is not a yes/no answer", message, answer))
    }
}

// -----------
// | Helpers |
// -----------

/// Find a choice by its 1-based position or its value
fn find_choice<'a>(choices: &'a [Choice], answer: &str) -> Option<&'a Choice> {
    if let Ok(index) = answer.parse::<usize>() {
        if (1..=choices.len()).contains(&index) {
            return Some(&choices[index - 1]);
        }
    }

    choices.iter().find(|c| c.value == answer)
}

fn parse_yes_no(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
