use std::io::{self, Write};

use colored::*;

use crate::api::ProfileView;
use crate::membership::Membership;
use crate::reconcile::Diff;

const RULE_WIDTH: usize = 80;
const GUTTER: usize = 3;

pub fn rule<W: Write>(out: &mut W, ch: char) -> io::Result<()> {
    writeln!(out, "{}", ch.to_string().repeat(RULE_WIDTH))
}

/// Print the reconciliation result: one handle per line for each side
/// that has missing members, or a count-based message when a side is
/// already complete.
pub fn render_diff<W: Write>(
    out: &mut W,
    diff: &Diff,
    main: &Membership,
    pack: &Membership,
) -> io::Result<()> {
    if !diff.only_in_main.is_empty() {
        writeln!(out, "{}", "Missing from starter pack:".bold())?;
        for member in &diff.only_in_main {
            writeln!(out, "{}", member.handle)?;
        }
    } else {
        writeln!(
            out,
            "Starter pack includes all of the main list ({} members)",
            pack.members.len()
        )?;
    }

    if !diff.only_in_pack.is_empty() {
        writeln!(out, "{}", "Missing from main list:".bold())?;
        for member in &diff.only_in_pack {
            writeln!(out, "{}", member.handle)?;
        }
    } else {
        writeln!(
            out,
            "Main list includes all of the starter pack ({} members)",
            main.members.len()
        )?;
    }
    Ok(())
}

/// Print the membership as a two-column table. The handle column is
/// padded to its widest entry with a 3-space gutter; exact widths are an
/// implementation detail.
pub fn render_members<W: Write>(out: &mut W, membership: &Membership) -> io::Result<()> {
    let width = membership
        .members
        .iter()
        .map(|m| m.handle.len())
        .chain(std::iter::once("Handle".len()))
        .max()
        .unwrap_or(0)
        + GUTTER;

    writeln!(out, "{:<width$}{}", "Handle", "Name")?;
    for member in &membership.members {
        writeln!(
            out,
            "{:<width$}{}",
            member.handle,
            member.display_name.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

/// Print a candidate's profile ahead of the curation prompt.
pub fn render_profile<W: Write>(out: &mut W, profile: &ProfileView) -> io::Result<()> {
    writeln!(out, "{}", profile.handle.bold().cyan())?;
    if let Some(name) = &profile.display_name {
        writeln!(out, "Name: {name}")?;
    }
    if let Some(description) = &profile.description {
        writeln!(out, "{description}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::Member;
    use crate::reconcile;

    fn member(did: &str, handle: &str, name: Option<&str>) -> Member {
        Member {
            did: did.to_string(),
            handle: handle.to_string(),
            display_name: name.map(|n| n.to_string()),
        }
    }

    fn membership(name: &str, members: Vec<Member>) -> Membership {
        Membership {
            uri: format!("at://did:plc:owner/app.bsky.graph.list/{name}"),
            name: name.to_string(),
            creator_did: "did:plc:owner".to_string(),
            declared_count: Some(members.len() as u32),
            members,
        }
    }

    fn render_to_string(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_diff_report_lists_missing_handles() {
        let main = membership(
            "main",
            vec![
                member("did:plc:1", "alice.bsky.social", None),
                member("did:plc:2", "bob.bsky.social", None),
            ],
        );
        let pack = membership("pack", vec![member("did:plc:1", "alice.bsky.social", None)]);
        let diff = reconcile::diff(&main, &pack);

        let output = render_to_string(|out| render_diff(out, &diff, &main, &pack));
        assert!(output.contains("Missing from starter pack:"));
        assert!(output.contains("bob.bsky.social"));
        assert!(output.contains("Main list includes all of the starter pack (2 members)"));
    }

    #[test]
    fn test_diff_report_settled_sides_use_counts() {
        let members = vec![member("did:plc:1", "alice.bsky.social", None)];
        let main = membership("main", members.clone());
        let pack = membership("pack", members);
        let diff = reconcile::diff(&main, &pack);

        let output = render_to_string(|out| render_diff(out, &diff, &main, &pack));
        assert!(output.contains("Starter pack includes all of the main list (1 members)"));
        assert!(output.contains("Main list includes all of the starter pack (1 members)"));
        assert!(!output.contains("Missing from"));
    }

    #[test]
    fn test_member_table_aligns_name_column() {
        let m = membership(
            "main",
            vec![
                member("did:plc:1", "a.bsky.social", Some("Alice")),
                member("did:plc:2", "much-longer-handle.bsky.social", Some("Bob")),
            ],
        );
        let output = render_to_string(|out| render_members(out, &m));
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("Handle"));
        let name_col = lines[0].find("Name").unwrap();
        assert_eq!(lines[1].find("Alice").unwrap(), name_col);
        assert_eq!(lines[2].find("Bob").unwrap(), name_col);
        // Widest handle still gets the minimum gutter.
        assert!(lines[2].contains("much-longer-handle.bsky.social   Bob"));
    }

    #[test]
    fn test_member_table_handles_missing_display_name() {
        let m = membership("main", vec![member("did:plc:1", "alice.bsky.social", None)]);
        let output = render_to_string(|out| render_members(out, &m));
        assert!(output.contains("alice.bsky.social"));
    }
}
