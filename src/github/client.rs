use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Credential, UpstreamConfig};
use crate::error::{Result, UpdaterError};
use crate::github::{TagPage, TagSource, PAGE_SIZE};

/// User agent sent with every request; GitHub rejects anonymous agents.
pub const USER_AGENT: &str = concat!("docker-swift-updater/", env!("CARGO_PKG_VERSION"));

/// Blocking GitHub GraphQL client
///
/// Holds the credential for the lifetime of one run.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    endpoint: String,
    credential: Credential,
    client: reqwest::blocking::Client,
}

impl GitHubClient {
    /// Create a client for the given GraphQL endpoint
    pub fn new(endpoint: impl Into<String>, credential: Credential) -> Result<Self> {
        let endpoint = endpoint.into();
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| UpdaterError::remote(&endpoint, e.to_string()))?;

        Ok(GitHubClient {
            endpoint,
            credential,
            client,
        })
    }

    /// Handle on a repository's tags
    pub fn repository(&self, owner: impl Into<String>, name: impl Into<String>) -> RemoteRepository<'_> {
        RemoteRepository {
            client: self,
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Handle on the configured upstream repository
    pub fn upstream(&self, upstream: &UpstreamConfig) -> RemoteRepository<'_> {
        self.repository(upstream.owner.clone(), upstream.name.clone())
    }

    fn query_tags(&self, owner: &str, name: &str, cursor: &str) -> Result<TagPage> {
        let body = TagsQuery {
            query: tags_query(),
            variables: Variables {
                owner,
                name,
                cursor,
            },
        };

        debug!(endpoint = %self.endpoint, owner, name, cursor, "fetching tag page");

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, self.credential.authorization())
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .json(&body)
            .send()
            .map_err(|e| self.error(format!("failed with error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.error(format!("server error status: {}", status.as_u16())));
        }

        let payload: Payload = response
            .json()
            .map_err(|e| self.error(format!("failed to decode payload with error: {}", e)))?;

        let refs = match payload.data {
            Some(Data {
                repository: Some(repository),
            }) => repository.refs,
            _ => {
                let messages: Vec<String> = payload
                    .errors
                    .unwrap_or_default()
                    .into_iter()
                    .map(|e| e.message)
                    .collect();
                return Err(self.error(if messages.is_empty() {
                    format!("repository {}/{} not found in response", owner, name)
                } else {
                    messages.join("; ")
                }));
            }
        };

        debug!(
            count = refs.tags.len(),
            has_next_page = refs.page_info.has_next_page,
            "received tag page"
        );

        let end_cursor = match refs.page_info.end_cursor {
            Some(cursor) => cursor,
            None if refs.page_info.has_next_page => {
                return Err(self.error("hasNextPage without endCursor".to_string()));
            }
            None => String::new(),
        };

        Ok(TagPage {
            tags: refs.tags.into_iter().map(|r| r.name).collect(),
            has_next_page: refs.page_info.has_next_page,
            end_cursor,
        })
    }

    fn error(&self, message: String) -> UpdaterError {
        UpdaterError::remote(&self.endpoint, message)
    }
}

/// A repository on the remote, listing its tags newest first
pub struct RemoteRepository<'a> {
    client: &'a GitHubClient,
    owner: String,
    name: String,
}

impl RemoteRepository<'_> {
    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl TagSource for RemoteRepository<'_> {
    fn fetch_page(&self, cursor: &str) -> Result<TagPage> {
        self.client.query_tags(&self.owner, &self.name, cursor)
    }
}

fn tags_query() -> String {
    format!(
        r#"query($owner:String!, $name:String!, $cursor:String = "") {{
    repository(owner: $owner, name: $name) {{
        refs(refPrefix: "refs/tags/", first: {}, after: $cursor, orderBy: {{field: TAG_COMMIT_DATE, direction: DESC}}) {{
            pageInfo {{
                endCursor
                hasNextPage
                startCursor
            }}
            tags: nodes {{
                name
            }}
        }}
    }}
}}"#,
        PAGE_SIZE
    )
}

#[derive(Serialize)]
struct TagsQuery<'a> {
    query: String,
    variables: Variables<'a>,
}

#[derive(Serialize)]
struct Variables<'a> {
    owner: &'a str,
    name: &'a str,
    cursor: &'a str,
}

#[derive(Deserialize)]
struct Payload {
    data: Option<Data>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct Data {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
struct RepositoryNode {
    refs: RefConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefConnection {
    page_info: PageInfo,
    tags: Vec<Ref>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Deserialize)]
struct Ref {
    name: String,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}
