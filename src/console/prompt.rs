//! Operator input

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use crate::error::Result;

#[async_trait]
pub trait UserPrompter: Send + Sync {
    /// Print `message` and read one trimmed line
    async fn prompt_text(&self, message: &str) -> Result<String>;

    /// `yes`/`y` in any case confirm; anything else, including an empty
    /// answer, declines
    async fn prompt_yes_no(&self, message: &str) -> Result<bool> {
        let answer = self.prompt_text(&format!("{message} (yes/no): ")).await?;
        Ok(is_yes(&answer))
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y")
}

fn end_of_input() -> crate::error::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "end of input").into()
}

/// Reads answers from stdin
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserPrompter for StdinPrompter {
    async fn prompt_text(&self, message: &str) -> Result<String> {
        print!("{message}");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Err(end_of_input());
        }
        Ok(input.trim().to_string())
    }
}

/// Replays a fixed script of answers, front to back. Running out of
/// answers behaves like a closed stdin.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every message shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or_default()
    }
}

#[async_trait]
impl UserPrompter for ScriptedPrompter {
    async fn prompt_text(&self, message: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(message.to_string());
        }
        let next = self.answers.lock().ok().and_then(|mut a| a.pop_front());
        match next {
            Some(answer) => Ok(answer.trim().to_string()),
            None => Err(end_of_input()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_scripted_answers_in_order() {
        let prompter = ScriptedPrompter::new(["first", "  second  "]);
        assert_eq!(prompter.prompt_text("a: ").await.unwrap(), "first");
        assert_eq!(prompter.prompt_text("b: ").await.unwrap(), "second");
        assert_eq!(prompter.prompts(), vec!["a: ", "b: "]);
        assert_eq!(prompter.remaining(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_script_is_end_of_input() {
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let result = prompter.prompt_text("? ").await;
        assert!(matches!(result, Err(Error::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_yes_no() {
        let prompter = ScriptedPrompter::new(["Y", "yes", "", "no", "sure"]);
        assert!(prompter.prompt_yes_no("Proceed?").await.unwrap());
        assert!(prompter.prompt_yes_no("Proceed?").await.unwrap());
        assert!(!prompter.prompt_yes_no("Proceed?").await.unwrap());
        assert!(!prompter.prompt_yes_no("Proceed?").await.unwrap());
        assert!(!prompter.prompt_yes_no("Proceed?").await.unwrap());
        assert_eq!(prompter.prompts()[0], "Proceed? (yes/no): ");
    }
}
