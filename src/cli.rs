use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "packsync")]
#[command(version)]
#[command(about = "Reconcile a Bluesky list with its starter pack and curate new members")]
#[command(long_about = "Packsync compares the member sets of a list and a starter pack owned \
by the same account, reports accounts missing from either side, and walks an interactive \
review of search results so new members can be added to both resources or parked on a \
persistent ignore list.")]
pub struct Cli {
    /// Account handle used to log in
    #[arg(long, env = "BLUESKY_USERNAME")]
    pub username: Option<String>,

    /// App password for the account
    #[arg(long, env = "BLUESKY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Name of the list to reconcile
    #[arg(short, long)]
    pub list_name: Option<String>,

    /// Name of the starter pack to reconcile
    #[arg(short, long)]
    pub starter_pack_name: Option<String>,

    /// Search term for discovering candidates (repeatable)
    #[arg(short = 't', long = "search-term")]
    pub search_terms: Vec<String>,

    /// Path of the ignored-users file
    #[arg(short, long)]
    pub ignore_file: Option<PathBuf>,

    /// Dump intermediate structures as JSON
    #[arg(long)]
    pub debug: bool,
}
