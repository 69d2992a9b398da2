//! Interactive prompts.
//!
//! The orchestrator only talks to the [`Prompter`] trait; the terminal
//! implementation uses rustyline with tab completion over the valid answers.

use crate::error::SeedError;
use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::path::PathBuf;

/// Source of answers for the interactive flow
pub trait Prompter {
    /// Free-form answer; `suggestions` feed tab completion only
    fn ask(&mut self, question: &str, suggestions: &[String]) -> Result<String>;

    /// One of `options`, asked again until the answer matches
    fn choose(&mut self, question: &str, options: &[&str]) -> Result<String>;

    /// Yes/no question
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
}

/// Match an answer against a menu: by text (case-insensitive) or 1-based number
pub fn match_option(answer: &str, options: &[&str]) -> Option<String> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        if (1..=options.len()).contains(&n) {
            return Some(options[n - 1].to_string());
        }
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(answer))
        .map(|o| o.to_string())
}

/// Parse a yes/no answer; empty input takes the default
pub fn parse_confirm(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Completes the current line against the answers of the active prompt
#[derive(Default)]
pub struct ChoiceHelper {
    choices: Vec<String>,
}

impl Completer for ChoiceHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = line[..pos].to_lowercase();
        let candidates = self
            .choices
            .iter()
            .filter(|c| c.to_lowercase().starts_with(&prefix))
            .map(|c| Pair {
                display: c.clone(),
                replacement: c.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for ChoiceHelper {
    type Hint = String;
}

impl Highlighter for ChoiceHelper {}

impl Validator for ChoiceHelper {}

impl Helper for ChoiceHelper {}

/// Terminal prompter backed by rustyline
pub struct LinePrompter {
    editor: Editor<ChoiceHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl LinePrompter {
    pub fn new() -> Result<Self> {
        let mut editor = Editor::<ChoiceHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(ChoiceHelper::default()));

        let history_path = dirs::cache_dir()
            .map(|d| d.join("cli-seeder").join("prompt_history"))
            .unwrap_or_else(|| PathBuf::from(".cli_seeder_history"));
        let _ = editor.load_history(&history_path);

        Ok(Self {
            editor,
            history_path,
        })
    }

    fn read_line(&mut self, prompt: &str, choices: Vec<String>) -> Result<String> {
        if let Some(helper) = self.editor.helper_mut() {
            helper.choices = choices;
        }

        match self.editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(trimmed.as_str());
                }
                Ok(trimmed)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                Err(SeedError::Aborted.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for LinePrompter {
    fn drop(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);
    }
}

impl Prompter for LinePrompter {
    fn ask(&mut self, question: &str, suggestions: &[String]) -> Result<String> {
        println!("{}", question);
        self.read_line("> ", suggestions.to_vec())
    }

    fn choose(&mut self, question: &str, options: &[&str]) -> Result<String> {
        let choices: Vec<String> = options.iter().map(|o| o.to_string()).collect();
        loop {
            println!("{}", question);
            for (i, option) in options.iter().enumerate() {
                println!("  [{}] {}", i + 1, option);
            }
            let answer = self.read_line("> ", choices.clone())?;
            if let Some(choice) = match_option(&answer, options) {
                return Ok(choice);
            }
            eprintln!("Value \"{}\" is invalid", answer);
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.read_line(&format!("{} {} ", question, hint), Vec::new())?;
            if let Some(yes) = parse_confirm(&answer, default) {
                return Ok(yes);
            }
            eprintln!("Please answer yes or no.");
        }
    }
}
