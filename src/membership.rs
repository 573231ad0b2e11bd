use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::api::{AtpClient, ListDetail};
use crate::error::{Error, Result};

const RESOURCE_PAGE_SIZE: u32 = 10;
const MEMBER_PAGE_SIZE: u32 = 100;

/// One account belonging to a list or starter pack. The DID is the only
/// stable key; handles and display names drift over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub did: String,
    pub handle: String,
    pub display_name: Option<String>,
}

/// The member set of one named resource, fetched fresh each run and
/// read-only afterwards. `uri` and `creator_did` identify where new
/// membership records are written: additions go into the creator's repo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub uri: String,
    pub name: String,
    pub creator_did: String,
    pub declared_count: Option<u32>,
    pub members: Vec<Member>,
}

/// The concrete shape of a starter pack's lexicon record payload: its
/// name plus the URI of the list that holds its members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarterPackRecord {
    pub name: String,
    pub list: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Membership {
    fn from_detail(detail: ListDetail) -> Self {
        let members = detail
            .items
            .into_iter()
            .map(|item| Member {
                did: item.subject.did,
                handle: item.subject.handle,
                display_name: item.subject.display_name,
            })
            .collect();
        Self {
            uri: detail.list.uri,
            name: detail.list.name,
            creator_did: detail.list.creator.did,
            declared_count: detail.list.list_item_count,
            members,
        }
    }

    pub fn contains(&self, did: &str) -> bool {
        self.members.iter().any(|m| m.did == did)
    }

    /// Handle for a member DID, for display in reports.
    pub fn handle_for(&self, did: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.did == did)
            .map(|m| m.handle.as_str())
    }

    pub fn did_set(&self) -> HashSet<&str> {
        self.members.iter().map(|m| m.did.as_str()).collect()
    }
}

/// Resolve a list by name among the owner's lists and fetch its member
/// page, sorted by handle. Only the first page of lists is scanned.
pub async fn fetch_list(client: &AtpClient, owner_did: &str, name: &str) -> Result<Membership> {
    let page = client.get_lists(owner_did, RESOURCE_PAGE_SIZE).await?;
    let found = page
        .lists
        .into_iter()
        .find(|list| list.name == name)
        .ok_or_else(|| Error::NotFound {
            kind: "list",
            name: name.to_string(),
        })?;

    let detail = client.get_list(&found.uri, MEMBER_PAGE_SIZE).await?;
    let mut membership = Membership::from_detail(detail);
    membership.members.sort_by(|a, b| a.handle.cmp(&b.handle));
    Ok(membership)
}

/// Resolve a starter pack by name among the owner's packs and fetch the
/// member page of its underlying list, in server order. Each pack's raw
/// record payload is decoded directly into `StarterPackRecord`.
pub async fn fetch_starter_pack(
    client: &AtpClient,
    owner_did: &str,
    name: &str,
) -> Result<(StarterPackRecord, Membership)> {
    let page = client
        .get_actor_starter_packs(owner_did, RESOURCE_PAGE_SIZE)
        .await?;

    let mut found = None;
    for pack in page.starter_packs {
        let record: StarterPackRecord = serde_json::from_value(pack.record)
            .map_err(|e| Error::decode("starter pack record", e))?;
        if record.name == name {
            found = Some(record);
            break;
        }
    }
    let record = found.ok_or_else(|| Error::NotFound {
        kind: "starter pack",
        name: name.to_string(),
    })?;

    let detail = client.get_list(&record.list, MEMBER_PAGE_SIZE).await?;
    Ok((record, Membership::from_detail(detail)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(did: &str, handle: &str) -> Member {
        Member {
            did: did.to_string(),
            handle: handle.to_string(),
            display_name: None,
        }
    }

    fn membership(members: Vec<Member>) -> Membership {
        Membership {
            uri: "at://did:plc:owner/app.bsky.graph.list/abc".to_string(),
            name: "Test List".to_string(),
            creator_did: "did:plc:owner".to_string(),
            declared_count: Some(members.len() as u32),
            members,
        }
    }

    #[test]
    fn test_starter_pack_record_decodes() {
        let raw = serde_json::json!({
            "$type": "app.bsky.graph.starterpack",
            "name": "Rustaceans",
            "list": "at://did:plc:owner/app.bsky.graph.list/xyz",
            "createdAt": "2024-11-01T00:00:00Z"
        });
        let record: StarterPackRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.name, "Rustaceans");
        assert_eq!(record.list, "at://did:plc:owner/app.bsky.graph.list/xyz");
        assert!(record.description.is_none());
    }

    #[test]
    fn test_starter_pack_record_rejects_wrong_shape() {
        let raw = serde_json::json!({ "name": "no list uri here" });
        let result: Result<StarterPackRecord> = serde_json::from_value::<StarterPackRecord>(raw)
            .map_err(|e| Error::decode("starter pack record", e));
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_membership_lookups() {
        let m = membership(vec![
            member("did:plc:a", "alice.bsky.social"),
            member("did:plc:b", "bob.bsky.social"),
        ]);
        assert!(m.contains("did:plc:a"));
        assert!(!m.contains("did:plc:c"));
        assert_eq!(m.handle_for("did:plc:b"), Some("bob.bsky.social"));
        assert_eq!(m.handle_for("did:plc:c"), None);
        assert_eq!(m.did_set().len(), 2);
    }
}
