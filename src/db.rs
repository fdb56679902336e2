//! Remote submissions store.
//!
//! Submissions live in a hosted Supabase table and are read through its
//! PostgREST endpoint. The bot never writes to it.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const SUBMISSIONS_TABLE: &str = "submissions";

/// Which face of the identity document a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSide {
    Front,
    Back,
}

impl DocumentSide {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentSide::Front => "front",
            DocumentSide::Back => "back",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "front" => Some(DocumentSide::Front),
            "back" => Some(DocumentSide::Back),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the submissions table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub winner_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub payment_preference: Option<String>,
    #[serde(default)]
    pub delivery_company: Option<String>,
    #[serde(default)]
    pub heard_from: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub driver_license_front: Option<String>,
    #[serde(default)]
    pub driver_license_back: Option<String>,
}

impl Submission {
    /// Document URL for the given side, ignoring blank values
    pub fn document_url(&self, side: DocumentSide) -> Option<&str> {
        let url = match side {
            DocumentSide::Front => self.driver_license_front.as_deref(),
            DocumentSide::Back => self.driver_license_back.as_deref(),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("N/A")
    }
}

/// Winner ids are text in most tables but some projects store them as numbers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "unexpected winner_id value: {other}"
        ))),
    }
}

/// Read access to the submissions table
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// All submissions, newest first, at most `limit` rows
    async fn list_recent(&self, limit: usize) -> Result<Vec<Submission>>;

    /// Every submission of one winner, newest first
    async fn find_by_winner_id(&self, winner_id: &str) -> Result<Vec<Submission>>;

    /// A single submission by primary key
    async fn find_by_id(&self, id: i64) -> Result<Option<Submission>>;
}

/// PostgREST client for a Supabase project
pub struct SupabaseClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/rest/v1/{}",
                base_url.trim_end_matches('/'),
                SUBMISSIONS_TABLE
            ),
            api_key: api_key.into(),
        })
    }

    async fn select(&self, query: &[(&str, String)]) -> Result<Vec<Submission>> {
        debug!(endpoint = %self.endpoint, ?query, "Querying submissions");

        let response = self
            .client
            .get(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await
            .context("Failed to send submissions query")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Submissions query failed with status {}: {}",
                status,
                error_text
            ));
        }

        response
            .json::<Vec<Submission>>()
            .await
            .context("Failed to decode submissions")
    }
}

fn newest_first() -> (&'static str, String) {
    ("order", "created_at.desc".to_string())
}

#[async_trait]
impl SubmissionRepository for SupabaseClient {
    async fn list_recent(&self, limit: usize) -> Result<Vec<Submission>> {
        let rows = self
            .select(&[
                ("select", "*".to_string()),
                newest_first(),
                ("limit", limit.to_string()),
            ])
            .await?;
        info!(rows = rows.len(), "Listed recent submissions");
        Ok(rows)
    }

    async fn find_by_winner_id(&self, winner_id: &str) -> Result<Vec<Submission>> {
        let rows = self
            .select(&[
                ("select", "*".to_string()),
                ("winner_id", format!("eq.{winner_id}")),
                newest_first(),
            ])
            .await?;
        info!(winner_id = %winner_id, rows = rows.len(), "Searched submissions by winner id");
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Submission>> {
        let mut rows = self
            .select(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{id}")),
                ("limit", "1".to_string()),
            ])
            .await?;
        if rows.is_empty() {
            info!(submission_id = id, "No submission found");
            return Ok(None);
        }
        Ok(Some(rows.swap_remove(0)))
    }
}
