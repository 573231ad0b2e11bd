use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Optional config file looked up in the working directory.
pub const CONFIG_FILE: &str = "packsync.toml";

const DEFAULT_IGNORE_FILE: &str = "ignored-ids.json";

/// The subset of settings `packsync.toml` may provide. Flags and
/// environment variables take precedence over every field here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub list_name: Option<String>,
    pub starter_pack_name: Option<String>,
    pub search_terms: Option<Vec<String>>,
    pub ignore_file: Option<PathBuf>,
}

impl FileConfig {
    /// Read the config file if present; a missing file is just defaults,
    /// a malformed one is fatal.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Fully resolved runtime configuration, built once at startup and passed
/// by reference from then on. Precedence: flag > environment variable >
/// config file > built-in default.
#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub list_name: String,
    pub starter_pack_name: String,
    pub search_terms: Vec<String>,
    pub ignore_file: PathBuf,
    pub debug: bool,
}

impl Config {
    pub fn resolve(cli: Cli) -> Result<Self> {
        let file = FileConfig::read(Path::new(CONFIG_FILE))?;
        Self::merge(cli, file)
    }

    /// Merge the already-parsed flag/env values with the config file.
    /// Clap resolves the env fallbacks, so by the time we are here a
    /// `None` credential means neither source supplied it.
    pub fn merge(cli: Cli, file: FileConfig) -> Result<Self> {
        let Some(username) = cli.username else {
            bail!("neither --username nor BLUESKY_USERNAME was set");
        };
        let Some(password) = cli.password else {
            bail!("neither --password nor BLUESKY_PASSWORD was set");
        };
        let Some(list_name) = cli.list_name.or(file.list_name) else {
            bail!("no list name: pass --list-name or set list_name in {CONFIG_FILE}");
        };
        let Some(starter_pack_name) = cli.starter_pack_name.or(file.starter_pack_name) else {
            bail!(
                "no starter pack name: pass --starter-pack-name or set starter_pack_name in {CONFIG_FILE}"
            );
        };

        let search_terms = if cli.search_terms.is_empty() {
            file.search_terms.unwrap_or_default()
        } else {
            cli.search_terms
        };
        let ignore_file = cli
            .ignore_file
            .or(file.ignore_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IGNORE_FILE));

        Ok(Self {
            username,
            password,
            list_name,
            starter_pack_name,
            search_terms,
            ignore_file,
            debug: cli.debug,
        })
    }
}
