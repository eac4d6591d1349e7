use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "script-index.toml";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const DEFAULT_EXTENSION: &str = "cs";
const DEFAULT_REPO: &str = "Adjuvo/SenseGlove-Unity";
const DEFAULT_BRANCH: &str = "master";
const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_TOP: usize = 3;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Scripts under a local directory
    #[default]
    Local,
    /// Scripts on a GitHub branch
    Github,
}

/// Contents of `script-index.toml`; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub index: IndexSection,
    pub source: SourceSection,
    pub llm: LlmSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSection {
    pub kind: Option<SourceKind>,
    pub dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSection {
    pub model: Option<String>,
    pub top: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Read an explicit config file, or `script-index.toml` in the working
    /// directory when present. No file means all defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = PathBuf::from(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    #[must_use]
    pub fn index_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.index.path.clone())
            .unwrap_or_else(|| PathBuf::from(script_index_store::DEFAULT_INDEX_FILE_NAME))
    }

    /// Source settings with command-line values taking precedence.
    #[must_use]
    pub fn source(&self, flags: SourceFlags) -> SourceSettings {
        let section = &self.source;
        SourceSettings {
            kind: flags.kind.or(section.kind).unwrap_or_default(),
            dir: flags
                .dir
                .or_else(|| section.dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            extension: flags
                .extension
                .or_else(|| section.extension.clone())
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
            repo: flags
                .repo
                .or_else(|| section.repo.clone())
                .unwrap_or_else(|| DEFAULT_REPO.to_string()),
            branch: flags
                .branch
                .or_else(|| section.branch.clone())
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            token: std::env::var(TOKEN_ENV).ok(),
        }
    }

    #[must_use]
    pub fn llm(&self, model: Option<String>, top: Option<usize>) -> LlmSettings {
        LlmSettings {
            model: model
                .or_else(|| self.llm.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            top: top.or(self.llm.top).unwrap_or(DEFAULT_TOP),
            timeout: Duration::from_secs(self.llm.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

/// Source values given on the command line
#[derive(Debug, Clone, Default)]
pub struct SourceFlags {
    pub kind: Option<SourceKind>,
    pub dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub dir: PathBuf,
    pub extension: String,
    pub repo: String,
    pub branch: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub model: String,
    pub top: usize,
    pub timeout: Duration,
}
