//! Databricks SQL warehouse client
//!
//! Uses the SQL Statement Execution API (`/api/2.0/sql/statements`) with
//! inline JSON results, so no driver or connection pool is involved.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Config, DatachatError, Result};
use crate::warehouse::{quote_identifier, Column, ColumnInfo, QueryExecutor, QueryResult};

/// The API only accepts waits of 0 or 5..=50 seconds
const MIN_WAIT_SECS: u64 = 5;
const MAX_WAIT_SECS: u64 = 50;

/// Follow-up chunks fetched per statement before the result counts as truncated
const MAX_EXTRA_CHUNKS: usize = 32;

/// Databricks statement execution client
#[derive(Clone)]
pub struct DatabricksClient {
    client: Client,
    base_url: String,
    token: String,
    warehouse_id: String,
    catalog: String,
    schema: String,
    wait_timeout_secs: u64,
}

/// Statement execution request
#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    warehouse_id: &'a str,
    catalog: &'a str,
    schema: &'a str,
    wait_timeout: String,
    on_wait_timeout: &'static str,
    disposition: &'static str,
    format: &'static str,
}

/// Statement execution response
#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(default)]
    statement_id: Option<String>,
    status: StatementStatus,
    #[serde(default)]
    manifest: Option<Manifest>,
    #[serde(default)]
    result: Option<ResultData>,
}

#[derive(Debug, Deserialize)]
struct StatementStatus {
    state: String,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    schema: Option<ManifestSchema>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct ManifestSchema {
    #[serde(default)]
    columns: Vec<ManifestColumn>,
}

#[derive(Debug, Deserialize)]
struct ManifestColumn {
    name: String,
    #[serde(default)]
    type_name: Option<String>,
    #[serde(default)]
    position: usize,
}

#[derive(Debug, Deserialize)]
struct ResultData {
    #[serde(default)]
    data_array: Vec<Vec<Option<String>>>,
    /// Path of the next inline chunk, relative to the workspace
    #[serde(default)]
    next_chunk_internal_link: Option<String>,
}

impl DatabricksClient {
    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let warehouse = &config.warehouse;
        let base_url = warehouse.workspace_url()?;

        let warehouse_id = warehouse.warehouse_id();
        if warehouse_id.is_empty() {
            return Err(DatachatError::config(format!(
                "Cannot derive a warehouse id from '{}'",
                warehouse.http_path
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(warehouse.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            token: warehouse.token.clone(),
            warehouse_id: warehouse_id.to_string(),
            catalog: warehouse.catalog.clone(),
            schema: warehouse.schema.clone(),
            wait_timeout_secs: warehouse.wait_timeout_secs,
        })
    }

    /// Clamp the configured wait to what the API accepts
    fn wait_timeout(&self) -> String {
        format!(
            "{}s",
            self.wait_timeout_secs.clamp(MIN_WAIT_SECS, MAX_WAIT_SECS)
        )
    }

    /// Convert a finished statement into a QueryResult, plus the link to the
    /// next result chunk when the rows did not fit in one
    fn to_query_result(response: StatementResponse) -> Result<(QueryResult, Option<String>)> {
        if response.status.state != "SUCCEEDED" {
            let detail = response
                .status
                .error
                .map(|e| match (e.error_code, e.message) {
                    (Some(code), Some(msg)) => format!("{}: {}", code, msg),
                    (None, Some(msg)) => msg,
                    (Some(code), None) => code,
                    (None, None) => String::new(),
                })
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "no error detail".to_string());

            return Err(DatachatError::warehouse(format!(
                "statement {} {}: {}",
                response.statement_id.as_deref().unwrap_or("?"),
                response.status.state,
                detail
            )));
        }

        let (mut manifest_columns, truncated) = match response.manifest {
            Some(manifest) => (
                manifest.schema.map(|s| s.columns).unwrap_or_default(),
                manifest.truncated,
            ),
            None => (Vec::new(), false),
        };
        manifest_columns.sort_by_key(|c| c.position);

        let columns = manifest_columns
            .into_iter()
            .map(|c| Column::new(c.name, c.type_name.unwrap_or_else(|| "STRING".to_string())))
            .collect();

        let (rows, next_chunk) = match response.result {
            Some(data) => (data.data_array, data.next_chunk_internal_link),
            None => (Vec::new(), None),
        };

        Ok((
            QueryResult {
                columns,
                rows,
                truncated,
            },
            next_chunk,
        ))
    }

    /// Fetch one follow-up chunk of an inline result
    async fn fetch_chunk(&self, link: &str) -> Result<ResultData> {
        tracing::debug!(link, "fetching result chunk");

        let response = self
            .client
            .get(format!("{}{}", self.base_url, link))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DatachatError::warehouse(format!(
                "Databricks API error ({}) fetching {}: {}",
                status, link, error_text
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl QueryExecutor for DatabricksClient {
    async fn execute(&self, sql: &str) -> Result<QueryResult> {
        let request = StatementRequest {
            statement: sql,
            warehouse_id: &self.warehouse_id,
            catalog: &self.catalog,
            schema: &self.schema,
            wait_timeout: self.wait_timeout(),
            on_wait_timeout: "CANCEL",
            disposition: "INLINE",
            format: "JSON_ARRAY",
        };

        tracing::debug!(warehouse = %self.warehouse_id, sql, "executing statement");

        let response = self
            .client
            .post(format!("{}/api/2.0/sql/statements", self.base_url))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    DatachatError::warehouse(format!(
                        "Cannot connect to Databricks at {}",
                        self.base_url
                    ))
                } else {
                    DatachatError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DatachatError::warehouse(format!(
                "Databricks API error ({}): {}",
                status, error_text
            )));
        }

        let data: StatementResponse = response.json().await?;
        let (mut result, mut next_chunk) = Self::to_query_result(data)?;

        let mut fetched = 0;
        while let Some(link) = next_chunk {
            if fetched == MAX_EXTRA_CHUNKS {
                tracing::warn!(chunks = fetched, "result has more chunks; truncating");
                result.truncated = true;
                break;
            }
            let chunk = self.fetch_chunk(&link).await?;
            result.rows.extend(chunk.data_array);
            next_chunk = chunk.next_chunk_internal_link;
            fetched += 1;
        }

        Ok(result)
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let sql = format!(
            "SHOW TABLES IN {}.{}",
            quote_identifier(&self.catalog),
            quote_identifier(&self.schema)
        );
        let result = self.execute(&sql).await?;
        let mut tables = result.column_values("tableName");
        tables.sort();
        Ok(tables)
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let result = self
            .execute(&format!("DESCRIBE TABLE {}", self.qualify(table)))
            .await?;

        let name_idx = result.column_index("col_name").unwrap_or(0);
        let type_idx = result.column_index("data_type").unwrap_or(1);
        let comment_idx = result.column_index("comment");

        let mut columns = Vec::new();
        for row in &result.rows {
            let name = row.get(name_idx).cloned().flatten().unwrap_or_default();
            // Partition and metadata sections follow a blank or '#' row
            if name.trim().is_empty() || name.starts_with('#') {
                break;
            }
            columns.push(ColumnInfo {
                name,
                data_type: row.get(type_idx).cloned().flatten().unwrap_or_default(),
                comment: comment_idx
                    .and_then(|i| row.get(i).cloned().flatten())
                    .filter(|c| !c.is_empty()),
            });
        }

        Ok(columns)
    }

    fn qualify(&self, table: &str) -> String {
        format!(
            "{}.{}.{}",
            quote_identifier(&self.catalog),
            quote_identifier(&self.schema),
            quote_identifier(table)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: serde_json::Value) -> Result<QueryResult> {
        let data: StatementResponse = serde_json::from_value(raw).unwrap();
        DatabricksClient::to_query_result(data).map(|(result, _)| result)
    }

    #[test]
    fn test_succeeded_statement_maps_columns_in_position_order() {
        let result = parse(serde_json::json!({
            "statement_id": "s1",
            "status": {"state": "SUCCEEDED"},
            "manifest": {
                "schema": {"columns": [
                    {"name": "value", "type_name": "DOUBLE", "position": 1},
                    {"name": "country", "type_name": "STRING", "position": 0}
                ]},
                "truncated": false
            },
            "result": {"data_array": [["DE", "4.1"], ["FR", null]]}
        }))
        .unwrap();

        assert_eq!(result.columns[0].name, "country");
        assert_eq!(result.columns[1].type_name, "DOUBLE");
        assert_eq!(result.rows[1], vec![Some("FR".to_string()), None]);
    }

    #[test]
    fn test_failed_statement_carries_message() {
        let err = parse(serde_json::json!({
            "statement_id": "s2",
            "status": {
                "state": "FAILED",
                "error": {"error_code": "BAD_REQUEST", "message": "TABLE_OR_VIEW_NOT_FOUND"}
            }
        }))
        .unwrap_err()
        .to_string();

        assert!(err.contains("FAILED"));
        assert!(err.contains("TABLE_OR_VIEW_NOT_FOUND"));
    }

    #[test]
    fn test_next_chunk_link_is_returned() {
        let data: StatementResponse = serde_json::from_value(serde_json::json!({
            "statement_id": "s3",
            "status": {"state": "SUCCEEDED"},
            "result": {
                "data_array": [["1"]],
                "next_chunk_index": 1,
                "next_chunk_internal_link": "/api/2.0/sql/statements/s3/result/chunks/1"
            }
        }))
        .unwrap();

        let (result, next) = DatabricksClient::to_query_result(data).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(
            next.as_deref(),
            Some("/api/2.0/sql/statements/s3/result/chunks/1")
        );
    }

    #[test]
    fn test_no_result_is_empty() {
        let result = parse(serde_json::json!({
            "status": {"state": "SUCCEEDED"}
        }))
        .unwrap();
        assert!(result.is_empty());
        assert!(result.columns.is_empty());
    }
}
