// API client module: a small blocking HTTP client for the three Supabase
// management endpoints this tool needs. Calls are synchronous and made one
// at a time; failures are returned to the caller untouched so the UI can
// show the operator the exact status and body.

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Public host of the management API.
pub const DEFAULT_API_URL: &str = "https://api.supabase.com";

/// Every project created by this tool goes on the free tier.
pub const FREE_PLAN: &str = "free";

/// Errors returned by [`ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a status other than the expected one.
    #[error("HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("access token contains characters not allowed in a header")]
    InvalidToken,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// Project record returned by the create endpoint. Only `id` and `ref` are
/// relied upon; the rest is informational.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default = "unknown_status")]
    pub status: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn unknown_status() -> String {
    "unknown".into()
}

impl Project {
    /// Public URL clients use to reach the project.
    pub fn url(&self) -> String {
        project_url(&self.reference)
    }

    pub fn dashboard_url(&self) -> String {
        format!("https://supabase.com/dashboard/project/{}", self.reference)
    }

    /// Dashboard page listing the project's API keys.
    pub fn api_settings_url(&self) -> String {
        format!("{}/settings/api", self.dashboard_url())
    }
}

/// Builds `https://<ref>.supabase.co`.
pub fn project_url(reference: &str) -> String {
    format!("https://{}.supabase.co", reference)
}

/// One entry of the project's key list. Newer secret keys come back with a
/// null `api_key`, so neither field is required.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ApiKey {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[cfg(test)]
impl ApiKey {
    pub fn new(name: &str, api_key: &str) -> Self {
        ApiKey {
            name: Some(name.to_string()),
            api_key: Some(api_key.to_string()),
        }
    }
}

/// Returns the key of the first `anon` or `public` entry that has one; that
/// is the key safe to ship to browsers.
pub fn find_public_key(keys: &[ApiKey]) -> Option<&str> {
    keys.iter()
        .filter(|k| matches!(k.name.as_deref(), Some("anon") | Some("public")))
        .find_map(|k| k.api_key.as_deref())
}

/// Payload for `POST /v1/projects`.
#[derive(Serialize, Clone)]
pub struct CreateProjectRequest {
    pub name: String,
    pub organization_id: String,
    pub region: String,
    pub database_password: String,
    pub plan: String,
}

impl CreateProjectRequest {
    pub fn free(name: &str, organization_id: &str, region: &str, database_password: &str) -> Self {
        CreateProjectRequest {
            name: name.to_string(),
            organization_id: organization_id.to_string(),
            region: region.to_string(),
            database_password: database_password.to_string(),
            plan: FREE_PLAN.to_string(),
        }
    }
}

impl fmt::Debug for CreateProjectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateProjectRequest")
            .field("name", &self.name)
            .field("organization_id", &self.organization_id)
            .field("region", &self.region)
            .field("database_password", &"<redacted>")
            .field("plan", &self.plan)
            .finish()
    }
}

/// The management calls the setup flow depends on. Implemented by
/// [`ApiClient`] for real use and by fakes in tests.
pub trait ManagementApi {
    fn list_organizations(&self, token: &str) -> ApiResult<Vec<Organization>>;
    fn create_project(&self, token: &str, req: &CreateProjectRequest) -> ApiResult<Project>;
    fn list_api_keys(&self, token: &str, project_id: &str) -> ApiResult<Vec<ApiKey>>;
}

/// Blocking client bound to one API base URL. The bearer token is passed
/// per call so the client itself never holds a secret.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    /// Headers sent with every management call.
    fn auth_headers(&self, token: &str) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let val = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidToken)?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Reads the body and fails unless the status matches `expected`.
    fn expect_status(res: Response, expected: StatusCode) -> ApiResult<String> {
        let status = res.status();
        let txt = res.text().unwrap_or_else(|_| "".into());
        if status != expected {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: txt,
            });
        }
        Ok(txt)
    }
}

impl ManagementApi for ApiClient {
    fn list_organizations(&self, token: &str) -> ApiResult<Vec<Organization>> {
        let url = self.endpoint("organizations");
        debug!(%url, "listing organizations");
        let res = self
            .client
            .get(&url)
            .headers(self.auth_headers(token)?)
            .send()?;
        let body = Self::expect_status(res, StatusCode::OK)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn create_project(&self, token: &str, req: &CreateProjectRequest) -> ApiResult<Project> {
        let url = self.endpoint("projects");
        debug!(%url, name = %req.name, region = %req.region, "creating project");
        let res = self
            .client
            .post(&url)
            .headers(self.auth_headers(token)?)
            .json(req)
            .send()?;
        let body = Self::expect_status(res, StatusCode::CREATED)?;
        let project: Project = serde_json::from_str(&body)?;
        info!(id = %project.id, reference = %project.reference, "project created");
        Ok(project)
    }

    fn list_api_keys(&self, token: &str, project_id: &str) -> ApiResult<Vec<ApiKey>> {
        let url = self.endpoint(&format!("projects/{}/api-keys", project_id));
        debug!(%url, "listing api keys");
        let res = self
            .client
            .get(&url)
            .headers(self.auth_headers(token)?)
            .send()?;
        let body = Self::expect_status(res, StatusCode::OK)?;
        Ok(serde_json::from_str(&body)?)
    }
}
