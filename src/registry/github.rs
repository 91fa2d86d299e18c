use reqwest::header::{ACCEPT, CONTENT_LENGTH};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;

use super::RegistryError;
use crate::models::{LicenseInfo, RepositoryIdentity};

#[derive(Debug, Deserialize)]
struct LicenseResponse {
    /// Base64 license body (GitHub wraps it at 60 columns).
    content: Option<String>,
    license: Option<LicenseField>,
}

#[derive(Debug, Deserialize)]
struct LicenseField {
    key: String,
    name: String,
    spdx_id: Option<String>,
}

/// Thin client for the GitHub REST API endpoints the scanner needs.
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(client: Client, api_base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// `GET /repos/{owner}/{repo}/license`.
    pub async fn fetch_license(
        &self,
        repo: &RepositoryIdentity,
    ) -> Result<LicenseInfo, RegistryError> {
        ensure_github(repo)?;

        let response = self
            .request(
                Method::GET,
                &format!("/repos/{}/{}/license", repo.author, repo.project),
            )
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(RegistryError::NotFound(repo.to_string())),
            StatusCode::UNAUTHORIZED => return Err(RegistryError::BadCredentials),
            StatusCode::FORBIDDEN => {
                let exhausted = response
                    .headers()
                    .get("x-ratelimit-remaining")
                    .is_some_and(|v| v.as_bytes() == b"0");
                return Err(if exhausted {
                    RegistryError::RateLimited
                } else {
                    RegistryError::BadCredentials
                });
            }
            status if !status.is_success() => {
                return Err(RegistryError::Status {
                    status,
                    repo: repo.to_string(),
                })
            }
            _ => {}
        }

        let body: LicenseResponse = response.json().await?;
        let license = body
            .license
            .ok_or_else(|| RegistryError::NotFound(repo.to_string()))?;

        Ok(LicenseInfo {
            key: license.key,
            name: license.name,
            // GitHub reports "NOASSERTION" for licenses it cannot identify.
            spdx_id: license.spdx_id.filter(|id| id != "NOASSERTION"),
            text: body.content.filter(|c| !c.is_empty()),
        })
    }

    /// `PUT /user/starred/{owner}/{repo}`. Requires a token.
    pub async fn star(&self, repo: &RepositoryIdentity) -> Result<(), RegistryError> {
        ensure_github(repo)?;
        if self.token.is_none() {
            return Err(RegistryError::MissingToken);
        }

        let response = self
            .request(
                Method::PUT,
                &format!("/user/starred/{}/{}", repo.author, repo.project),
            )
            .header(CONTENT_LENGTH, 0)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RegistryError::BadCredentials),
            StatusCode::NOT_FOUND => Err(RegistryError::NotFound(repo.to_string())),
            status => Err(RegistryError::Status {
                status,
                repo: repo.to_string(),
            }),
        }
    }
}

fn ensure_github(repo: &RepositoryIdentity) -> Result<(), RegistryError> {
    if repo.host != "github.com" {
        return Err(RegistryError::UnsupportedHost(repo.host.clone()));
    }
    if repo.project.is_empty() {
        return Err(RegistryError::NotFound(repo.to_string()));
    }
    Ok(())
}
