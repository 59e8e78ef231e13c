use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

/// The human (or stand-in) a request can ask for missing information.
///
/// Whether a session is interactive is a property of the operator, so the
/// pipeline never carries a separate mode flag.
#[async_trait]
pub trait Operator: Send + Sync {
    fn is_interactive(&self) -> bool;

    /// Shows `prompt` and waits, without timeout, for one line of input.
    async fn ask(&self, prompt: &str) -> anyhow::Result<String>;

    async fn say(&self, message: &str);

    /// Asks a yes/no question; only an explicit yes counts.
    async fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        let answer = self.ask(prompt).await?;
        Ok(is_affirmative(&answer))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "yes" | "y" | "oui" | "o"
    )
}

/// Operator for sessions nobody is watching: it cannot answer anything.
pub struct Headless;

#[async_trait]
impl Operator for Headless {
    fn is_interactive(&self) -> bool {
        false
    }

    async fn ask(&self, prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("no operator available to answer {prompt:?}")
    }

    async fn say(&self, message: &str) {
        tracing::debug!(message, "operator notice dropped in headless session");
    }
}

/// Terminal operator reading answers from stdin.
pub struct ConsoleOperator {
    stdin: tokio::sync::Mutex<BufReader<Stdin>>,
}

impl ConsoleOperator {
    pub fn new() -> Self {
        Self {
            stdin: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }
}

impl Default for ConsoleOperator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Operator for ConsoleOperator {
    fn is_interactive(&self) -> bool {
        true
    }

    async fn ask(&self, prompt: &str) -> anyhow::Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let mut line = String::new();
        let read = self
            .stdin
            .lock()
            .await
            .read_line(&mut line)
            .await
            .context("failed to read from stdin")?;
        if read == 0 {
            anyhow::bail!("stdin closed");
        }
        Ok(line.trim().to_string())
    }

    async fn say(&self, message: &str) {
        println!("{message}");
    }
}

/// Operator that replays queued answers and records everything it was told.
/// Running out of answers behaves like a closed terminal.
pub struct ScriptedOperator {
    answers: Mutex<VecDeque<String>>,
    transcript: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            transcript: Mutex::new(Vec::new()),
        }
    }

    /// Prompts and notices in the order they were shown.
    pub fn transcript(&self) -> Vec<String> {
        self.transcript
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    pub fn remaining_answers(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or_default()
    }

    fn record(&self, line: &str) {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.push(line.to_string());
        }
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    fn is_interactive(&self) -> bool {
        true
    }

    async fn ask(&self, prompt: &str) -> anyhow::Result<String> {
        self.record(prompt);
        let next = self
            .answers
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted answers poisoned"))?
            .pop_front();
        next.map(|a| a.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("no scripted answer left for {prompt:?}"))
    }

    async fn say(&self, message: &str) {
        self.record(message);
    }
}
