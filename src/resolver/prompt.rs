use dialoguer::{Input, Password, Select};
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Terminal not available: {0}")]
    Terminal(#[from] dialoguer::Error),

    #[error("No answer available for prompt '{0}'")]
    NoAnswer(String),

    #[error("Selection cancelled")]
    Cancelled,
}

/// Interactive capability used to obtain unresolved values
pub trait Prompter {
    /// Free-text answer, empty allowed
    fn input(&self, prompt: &str) -> Result<String, PromptError>;

    /// Free-text answer that is not echoed
    fn secret(&self, prompt: &str) -> Result<String, PromptError>;

    /// Pick one of `labels`, returning its index
    fn choose(&self, prompt: &str, labels: &[String]) -> Result<usize, PromptError>;
}

/// Terminal prompts via dialoguer
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn input(&self, prompt: &str) -> Result<String, PromptError> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn secret(&self, prompt: &str) -> Result<String, PromptError> {
        let answer = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(answer)
    }

    fn choose(&self, prompt: &str, labels: &[String]) -> Result<usize, PromptError> {
        Select::new()
            .with_prompt(prompt)
            .items(labels)
            .default(0)
            .interact_opt()?
            .ok_or(PromptError::Cancelled)
    }
}

/// Answer recorded by [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Choice(usize),
}

/// Fixed-answer prompter that replays answers in order and records every
/// prompt it was asked
///
/// Public so integration tests and non-interactive callers can drive the
/// workflow without a terminal.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
    menus: RefCell<Vec<Vec<String>>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Prompts shown so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    /// Label lists offered by `choose`, in call order
    pub fn menus(&self) -> Vec<Vec<String>> {
        self.menus.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, prompt: &str) -> Result<Answer, PromptError> {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| PromptError::NoAnswer(prompt.to_string()))
    }

    fn next_text(&self, prompt: &str) -> Result<String, PromptError> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(text),
            Answer::Choice(_) => Err(PromptError::NoAnswer(prompt.to_string())),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str) -> Result<String, PromptError> {
        self.next_text(prompt)
    }

    fn secret(&self, prompt: &str) -> Result<String, PromptError> {
        self.next_text(prompt)
    }

    fn choose(&self, prompt: &str, labels: &[String]) -> Result<usize, PromptError> {
        self.menus.borrow_mut().push(labels.to_vec());
        match self.next(prompt)? {
            Answer::Choice(index) if index < labels.len() => Ok(index),
            _ => Err(PromptError::NoAnswer(prompt.to_string())),
        }
    }
}
