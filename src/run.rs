use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use crate::api::{self, AtpClient};
use crate::cli::Cli;
use crate::config::Config;
use crate::curate::Curator;
use crate::ignore::IgnoreList;
use crate::membership;
use crate::reconcile;
use crate::report;

/// End-to-end run: resolve and authenticate, fetch both member sets,
/// report the reconciliation, then review search candidates and persist
/// the ignore list. Everything is sequential; one remote call at a time.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli)?;

    let http = reqwest::Client::new();
    let account = api::resolve_account(&http, &config.username)
        .await
        .context("Failed to resolve account")?;
    if config.debug {
        dump(&account)?;
    }

    let mut client = AtpClient::new(account.pds.clone());
    client
        .login(&config.username, &config.password)
        .await
        .context("Unable to connect")?;

    let (pack_record, starter_pack) =
        membership::fetch_starter_pack(&client, &account.did, &config.starter_pack_name)
            .await
            .context("Failed to get starter pack members")?;
    if config.debug {
        dump(&pack_record)?;
        dump(&starter_pack)?;
    }

    let main_list = membership::fetch_list(&client, &account.did, &config.list_name)
        .await
        .context("Failed to get list members")?;
    if config.debug {
        dump(&main_list)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let diff = reconcile::diff(&main_list, &starter_pack);
    report::render_diff(&mut out, &diff, &main_list, &starter_pack)?;
    report::rule(&mut out, '-')?;
    report::render_members(&mut out, &main_list)?;
    report::rule(&mut out, '-')?;

    let mut ignored = IgnoreList::load(&config.ignore_file)
        .with_context(|| format!("Failed to load {}", config.ignore_file.display()))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut curator = Curator::new(&client, &main_list, &starter_pack, &ignored);
    curator
        .run(&config.search_terms, &mut ignored, &mut input, &mut out)
        .await?;
    drop(out);

    ignored
        .save(&config.ignore_file)
        .with_context(|| format!("Failed to save {}", config.ignore_file.display()))?;
    println!(
        "{}",
        format!(
            "Saved {} ignored users to {}",
            ignored.len(),
            config.ignore_file.display()
        )
        .dimmed()
    );
    Ok(())
}

/// Pretty-print an intermediate structure for `--debug`.
fn dump<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    report::rule(&mut out, '-')?;
    Ok(())
}
