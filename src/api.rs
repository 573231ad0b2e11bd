use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

const PUBLIC_APPVIEW_URL: &str = "https://public.api.bsky.app";
const PLC_DIRECTORY_URL: &str = "https://plc.directory";

/// NSID of the record collection that holds list memberships.
pub const LISTITEM_COLLECTION: &str = "app.bsky.graph.listitem";

/// An account resolved from a handle: its DID plus the PDS host that
/// serves its repo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAccount {
    pub did: String,
    pub pds: String,
}

/// Authenticated session returned by `com.atproto.server.createSession`.
/// The access token authenticates requests; the refresh token is kept so
/// a longer-lived caller could mint a new access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub did: String,
    pub handle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub did: String,
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub uri: String,
    pub name: String,
    pub creator: ProfileView,
    #[serde(default)]
    pub list_item_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemView {
    pub uri: String,
    pub subject: ProfileView,
}

/// Output of `app.bsky.graph.getList`: the list header plus one page of
/// member items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDetail {
    pub list: ListView,
    pub items: Vec<ListItemView>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListsPage {
    pub lists: Vec<ListView>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// A starter pack summary. `record` is the raw lexicon record payload;
/// callers decode it into a concrete shape with one typed decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarterPackView {
    pub uri: String,
    pub creator: ProfileView,
    pub record: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarterPacksPage {
    pub starter_packs: Vec<StarterPackView>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub actors: Vec<ProfileView>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Deserialize)]
struct ResolveHandleOutput {
    did: String,
}

#[derive(Deserialize)]
struct DidDocument {
    #[serde(default)]
    service: Vec<DidService>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DidService {
    id: String,
    #[serde(rename = "type")]
    service_type: String,
    service_endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListItemRecord {
    #[serde(rename = "$type")]
    record_type: &'static str,
    subject: String,
    list: String,
    created_at: String,
}

#[derive(Serialize)]
struct CreateRecordInput {
    repo: String,
    collection: &'static str,
    record: ListItemRecord,
}

/// Resolve a handle to its DID and PDS endpoint: the handle goes through
/// the public AppView, the PDS comes from the DID's plc.directory document.
pub async fn resolve_account(http: &Client, handle: &str) -> Result<ResolvedAccount> {
    let resolution = |message: String| Error::Resolution {
        handle: handle.to_string(),
        message,
    };

    let url = format!(
        "{}/xrpc/com.atproto.identity.resolveHandle",
        PUBLIC_APPVIEW_URL
    );
    let response = http
        .get(&url)
        .query(&[("handle", handle)])
        .send()
        .await
        .map_err(|e| resolution(e.to_string()))?;
    if !response.status().is_success() {
        return Err(resolution(format!("HTTP {}", response.status())));
    }
    let resolved: ResolveHandleOutput = response
        .json()
        .await
        .map_err(|e| resolution(e.to_string()))?;

    let doc_url = format!("{}/{}", PLC_DIRECTORY_URL, resolved.did);
    let response = http
        .get(&doc_url)
        .send()
        .await
        .map_err(|e| resolution(e.to_string()))?;
    if !response.status().is_success() {
        return Err(resolution(format!(
            "DID document lookup returned HTTP {}",
            response.status()
        )));
    }
    let doc: DidDocument = response
        .json()
        .await
        .map_err(|e| resolution(e.to_string()))?;

    let pds = doc
        .service
        .iter()
        .find(|s| s.id.ends_with("#atproto_pds") || s.service_type == "AtprotoPersonalDataServer")
        .map(|s| s.service_endpoint.clone())
        .ok_or_else(|| resolution("DID document has no PDS service entry".to_string()))?;

    Ok(ResolvedAccount {
        did: resolved.did,
        pds,
    })
}

/// XRPC client bound to one PDS. Holds the authenticated session after
/// `login`; every call goes through this value, nothing is global. One
/// request is in flight at a time and no call is retried.
pub struct AtpClient {
    http: Client,
    pds: String,
    session: Option<Session>,
}

impl AtpClient {
    pub fn new(pds: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            pds: pds.into(),
            session: None,
        }
    }

    /// Create a session on the PDS and store its tokens for subsequent
    /// authenticated calls.
    pub async fn login(&mut self, identifier: &str, password: &str) -> Result<&Session> {
        let url = format!("{}/xrpc/com.atproto.server.createSession", self.pds);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "identifier": identifier,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| Error::Authentication(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Authentication(format!(
                "HTTP {}",
                response.status()
            )));
        }
        let session: Session = response
            .json()
            .await
            .map_err(|e| Error::Authentication(e.to_string()))?;
        Ok(self.session.insert(session))
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn access_token(&self) -> Result<&str> {
        self.session
            .as_ref()
            .map(|s| s.access_jwt.as_str())
            .ok_or_else(|| Error::Authentication("no active session".to_string()))
    }

    /// Authenticated GET of one XRPC query endpoint, decoded as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        nsid: &str,
        what: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/xrpc/{}", self.pds, nsid);
        let response = self
            .http
            .get(&url)
            .query(query)
            .bearer_auth(self.access_token()?)
            .send()
            .await
            .map_err(|e| Error::fetch(what, e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::fetch(what, format!("HTTP {status} {body}")));
        }
        let body = response.text().await.map_err(|e| Error::fetch(what, e))?;
        serde_json::from_str(&body).map_err(|e| Error::decode(what, e))
    }

    /// One page of the actor's starter packs.
    pub async fn get_actor_starter_packs(
        &self,
        actor: &str,
        limit: u32,
    ) -> Result<StarterPacksPage> {
        self.get_json(
            "app.bsky.graph.getActorStarterPacks",
            "starter packs",
            &[
                ("actor", actor.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// One page of the actor's lists.
    pub async fn get_lists(&self, actor: &str, limit: u32) -> Result<ListsPage> {
        self.get_json(
            "app.bsky.graph.getLists",
            "lists",
            &[
                ("actor", actor.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// The list header plus one page of its member items.
    pub async fn get_list(&self, list_uri: &str, limit: u32) -> Result<ListDetail> {
        self.get_json(
            "app.bsky.graph.getList",
            "list detail",
            &[
                ("list", list_uri.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// One page of actor search results for a query.
    pub async fn search_actors(&self, query: &str, limit: u32) -> Result<SearchPage> {
        self.get_json(
            "app.bsky.actor.searchActors",
            "actor search",
            &[
                ("q", query.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Create a listitem record adding `subject_did` to the list at
    /// `list_uri`, written into `repo_did`'s repo (the list creator's,
    /// not necessarily the operator's).
    pub async fn create_list_item(
        &self,
        repo_did: &str,
        list_uri: &str,
        subject_did: &str,
    ) -> Result<()> {
        let remote_write = |message: String| Error::RemoteWrite {
            handle: subject_did.to_string(),
            message,
        };

        let url = format!("{}/xrpc/com.atproto.repo.createRecord", self.pds);
        let input = CreateRecordInput {
            repo: repo_did.to_string(),
            collection: LISTITEM_COLLECTION,
            record: ListItemRecord {
                record_type: LISTITEM_COLLECTION,
                subject: subject_did.to_string(),
                list: list_uri.to_string(),
                created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            },
        };
        let token = self
            .access_token()
            .map_err(|e| remote_write(e.to_string()))?
            .to_string();
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&input)
            .send()
            .await
            .map_err(|e| remote_write(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(remote_write(format!("HTTP {status} {body}")));
        }
        Ok(())
    }
}
