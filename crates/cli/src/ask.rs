//! Question answering over the index through a local `ollama` model.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use script_index_store::{is_sentinel, IndexDocument};
use std::collections::HashSet;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

pub const NO_RELEVANT_SCRIPTS: &str = "No relevant scripts found.";

// Replies this short carry no usable answer.
const MIN_REPLY_CHARS: usize = 5;

static SCRIPT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9_][A-Za-z0-9_-]*\.[A-Za-z0-9]{1,5}\b")
        .expect("script name pattern compiles")
});

/// One numbered line per script: `1. Name.cs: description [functions: a, b]`.
/// At most `max_functions` function names are listed; the placeholder
/// function is never listed.
#[must_use]
pub fn build_context(document: &IndexDocument, max_functions: usize) -> String {
    document
        .scripts()
        .iter()
        .enumerate()
        .map(|(i, script)| {
            let functions: Vec<&str> = script
                .functions
                .iter()
                .filter(|f| !is_sentinel(f))
                .take(max_functions)
                .map(|f| f.name.as_str())
                .collect();
            if functions.is_empty() {
                format!("{}. {}: {}", i + 1, script.name, script.description)
            } else {
                format!(
                    "{}. {}: {} [functions: {}]",
                    i + 1,
                    script.name,
                    script.description,
                    functions.join(", ")
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn build_prompt(context: &str, question: &str, top: usize) -> String {
    format!(
        "You are a SenseGlove SDK expert.\n\
         Here are the available scripts with their descriptions:\n\
         {context}\n\
         \n\
         Question: \"{question}\"\n\
         \n\
         List up to {top} relevant script names with one-line explanations.\n\
         Plain text format please.\n"
    )
}

/// Trimmed reply, or [`NO_RELEVANT_SCRIPTS`] when it is too short to mean
/// anything.
#[must_use]
pub fn normalize_reply(reply: &str) -> String {
    let reply = reply.trim();
    if reply.chars().count() <= MIN_REPLY_CHARS {
        NO_RELEVANT_SCRIPTS.to_string()
    } else {
        reply.to_string()
    }
}

/// Indexed script names mentioned in `reply`, in order of first mention.
#[must_use]
pub fn referenced_scripts<'a>(reply: &str, document: &'a IndexDocument) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    SCRIPT_NAME
        .find_iter(reply)
        .filter_map(|m| document.get(m.as_str()))
        .map(|script| script.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect()
}

/// Runs a model command with the prompt on stdin
pub struct LlmRunner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl LlmRunner {
    /// `ollama run <model>`
    pub fn ollama(model: &str, timeout: Duration) -> Self {
        Self::with_command("ollama", ["run", model], timeout)
    }

    pub fn with_command<I, S>(program: &str, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    /// Raw trimmed stdout of the model.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .context("Failed to send prompt")?;
        }

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.context("Model process failed")?,
            Err(_) => bail!(
                "{} did not answer within {}s",
                self.program,
                self.timeout.as_secs()
            ),
        };
        if !output.status.success() {
            bail!("{} exited with {}", self.program, output.status);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Ask `question` about the indexed scripts.
    pub async fn ask(&self, document: &IndexDocument, question: &str, top: usize) -> Result<String> {
        let prompt = build_prompt(&build_context(document, 0), question, top);
        log::debug!("Prompt is {} bytes", prompt.len());
        let reply = self.complete(&prompt).await?;
        Ok(normalize_reply(&reply))
    }
}
