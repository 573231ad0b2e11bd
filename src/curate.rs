use std::collections::HashSet;
use std::io::{BufRead, Write};

use colored::*;

use crate::api::{AtpClient, ProfileView};
use crate::error::Result;
use crate::ignore::{IgnoreList, IgnoredUser};
use crate::membership::Membership;
use crate::report;

pub const SEARCH_PAGE_SIZE: u32 = 50;

const HELP: &str = "Action: add to list & starter pack (a), add to ignore file (i), skip (s), quit (q)";

/// The remote calls the curation loop performs, split out so tests can
/// substitute a scripted double for the live client.
#[allow(async_fn_in_trait)]
pub trait Network {
    /// One page of candidate profiles for a search query.
    async fn search_actors(&self, query: &str, limit: u32) -> Result<Vec<ProfileView>>;

    /// Create a membership record for `subject_did` on the list at
    /// `list_uri`, written into `repo_did`'s repo.
    async fn add_list_member(&self, repo_did: &str, list_uri: &str, subject_did: &str)
        -> Result<()>;
}

impl Network for AtpClient {
    async fn search_actors(&self, query: &str, limit: u32) -> Result<Vec<ProfileView>> {
        Ok(AtpClient::search_actors(self, query, limit).await?.actors)
    }

    async fn add_list_member(
        &self,
        repo_did: &str,
        list_uri: &str,
        subject_did: &str,
    ) -> Result<()> {
        self.create_list_item(repo_did, list_uri, subject_did).await
    }
}

/// What the operator chose for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Ignore,
    Skip,
    Quit,
}

/// Add the candidate to the main list, then to the starter pack's list,
/// each record attributed to that resource creator's repo. If the second
/// add fails the first is not rolled back: the candidate stays a member
/// of the main list only, and the error goes back to the caller.
pub async fn add_to_both<N: Network, W: Write>(
    network: &N,
    main_list: &Membership,
    starter_pack: &Membership,
    candidate: &ProfileView,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Adding {} to list & starter pack", candidate.handle)?;
    network
        .add_list_member(&main_list.creator_did, &main_list.uri, &candidate.did)
        .await?;
    writeln!(out, "Added {} to the list", candidate.handle)?;
    network
        .add_list_member(
            &starter_pack.creator_did,
            &starter_pack.uri,
            &candidate.did,
        )
        .await?;
    writeln!(out, "Added {} to the starter pack", candidate.handle)?;
    Ok(())
}

/// Prompt until the operator enters a valid action token. Unknown input
/// reprints the help text and asks again; end of input counts as quit.
fn prompt_action<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Action> {
    writeln!(out, "{HELP}")?;
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Action::Quit);
        }
        match line.trim() {
            "a" => return Ok(Action::Add),
            "i" => return Ok(Action::Ignore),
            "s" => return Ok(Action::Skip),
            "q" => return Ok(Action::Quit),
            _ => writeln!(out, "{HELP}")?,
        }
    }
}

/// Drives the interactive review of search results. Tracks the union of
/// every DID known this run (both memberships, the ignore list, and each
/// candidate already resolved) so no account is offered twice.
pub struct Curator<'a, N: Network> {
    network: &'a N,
    main_list: &'a Membership,
    starter_pack: &'a Membership,
    known: HashSet<String>,
}

impl<'a, N: Network> Curator<'a, N> {
    pub fn new(
        network: &'a N,
        main_list: &'a Membership,
        starter_pack: &'a Membership,
        ignored: &IgnoreList,
    ) -> Self {
        let known = main_list
            .members
            .iter()
            .chain(starter_pack.members.iter())
            .map(|m| m.did.clone())
            .chain(ignored.iter().map(|r| r.did.clone()))
            .collect();
        Self {
            network,
            main_list,
            starter_pack,
            known,
        }
    }

    /// Iterate the search terms, offering each unknown candidate to the
    /// operator. A failed search logs and skips that term; quit abandons
    /// the remaining candidates of the current term only. New ignore
    /// records accumulate in `ignored`; the caller persists them.
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        terms: &[String],
        ignored: &mut IgnoreList,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        report::rule(out, '#')?;
        for term in terms {
            let candidates = match self.network.search_actors(term, SEARCH_PAGE_SIZE).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    eprintln!("{}", format!("Search for '{term}' failed: {e}").red());
                    continue;
                }
            };

            writeln!(out, "Search term '{term}' results:")?;
            report::rule(out, '#')?;
            'candidates: for candidate in candidates {
                if self.known.contains(&candidate.did) {
                    continue;
                }
                report::render_profile(out, &candidate)?;

                let action = prompt_action(input, out)?;
                self.known.insert(candidate.did.clone());
                match action {
                    Action::Add => {
                        if let Err(e) = add_to_both(
                            self.network,
                            self.main_list,
                            self.starter_pack,
                            &candidate,
                            out,
                        )
                        .await
                        {
                            // Aborts this candidate only; no ignore record,
                            // and a partial add stays as-is.
                            eprintln!("{}", e.to_string().red());
                        }
                    }
                    Action::Ignore => {
                        writeln!(out, "Adding {} to ignore file", candidate.handle)?;
                        ignored.push(IgnoredUser {
                            did: candidate.did.clone(),
                            handle: candidate.handle.clone(),
                        });
                    }
                    Action::Skip => {
                        writeln!(out, "Skipping {}", candidate.handle)?;
                    }
                    Action::Quit => {
                        writeln!(out, "Quitting")?;
                        break 'candidates;
                    }
                }
                report::rule(out, '-')?;
            }
            report::rule(out, '#')?;
        }
        Ok(())
    }
}
