//! Supabase REST client for external table fetches.
//!
//! All dashboard list pages read from hosted tables through the Supabase
//! PostgREST endpoint (`/rest/v1/<table>?select=*&limit=N`). Requests are
//! read-only and carry a bounded timeout; callers decide what a failed
//! fetch means (the listing layer fails open to an empty page).

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// A single external row: field name to JSON value.
pub type ExternalRow = Map<String, Value>;

/// Trait for fetching rows from a named external table.
///
/// This abstracts the data source so we can use either:
/// - The real Supabase REST API (production)
/// - A stub returning fixed rows or errors (tests)
#[async_trait]
pub trait TableFetcher: Send + Sync {
    /// Fetch up to `limit` rows from `table`, in server order.
    async fn fetch_rows(&self, table: &str, limit: u32) -> Result<Vec<ExternalRow>>;
}

/// Supabase REST API client.
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a client for the given project URL and anonymous key.
    pub fn new(base_url: &str, anon_key: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }
}

#[async_trait]
impl TableFetcher for SupabaseClient {
    async fn fetch_rows(&self, table: &str, limit: u32) -> Result<Vec<ExternalRow>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);

        let response = self
            .http
            .get(&url)
            .query(&[("select", "*"), ("limit", &limit.to_string())])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await
            .with_context(|| format!("Request to table '{table}' failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Table '{table}' fetch returned {status}: {body}"
            ));
        }

        let values: Vec<Value> = response
            .json()
            .await
            .with_context(|| format!("Invalid JSON from table '{table}'"))?;

        debug!(table, rows = values.len(), "Fetched external table");

        // PostgREST returns an array of objects; anything else is dropped.
        Ok(values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_rows() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/clientes"))
            .and(query_param("select", "*"))
            .and(query_param("limit", "100"))
            .and(header("apikey", "chave-anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id_cliente": 1, "nome": "Maria"},
                {"id_cliente": 2, "nome": "João"}
            ])))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&server.uri(), "chave-anon", 5).unwrap();
        let rows = client.fetch_rows("clientes", 100).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["nome"], "Maria");
    }

    #[tokio::test]
    async fn test_fetch_rows_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/clientes"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&server.uri(), "chave-errada", 5).unwrap();
        assert!(client.fetch_rows("clientes", 100).await.is_err());
    }

    #[tokio::test]
    async fn test_non_object_entries_are_dropped() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/produtos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id_produto": 1},
                "lixo",
                42
            ])))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&server.uri(), "chave-anon", 5).unwrap();
        let rows = client.fetch_rows("produtos", 100).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
