use datachat::core::Config;
use datachat::warehouse::{DatabricksClient, QueryExecutor};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATEMENTS: &str = "/api/2.0/sql/statements";

fn client_for(server: &MockServer) -> DatabricksClient {
    let mut config = Config::default();
    config.warehouse.host = server.uri();
    config.warehouse.http_path = "/sql/1.0/warehouses/abc123".to_string();
    config.warehouse.token = "dapi-test".to_string();
    config.warehouse.catalog = "workspace".to_string();
    config.warehouse.schema = "eurostat".to_string();
    config.warehouse.wait_timeout_secs = 120;

    DatabricksClient::from_config(&config).expect("valid warehouse config")
}

#[tokio::test]
async fn statement_success_maps_rows() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .and(header("authorization", "Bearer dapi-test"))
        .and(body_partial_json(json!({
            "statement": "SELECT geo, value FROM gdp LIMIT 2",
            "warehouse_id": "abc123",
            "catalog": "workspace",
            "schema": "eurostat",
            "wait_timeout": "50s",
            "disposition": "INLINE",
            "format": "JSON_ARRAY"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statement_id": "01ef",
            "status": {"state": "SUCCEEDED"},
            "manifest": {
                "schema": {"columns": [
                    {"name": "geo", "type_name": "STRING", "position": 0},
                    {"name": "value", "type_name": "DOUBLE", "position": 1}
                ]},
                "truncated": false
            },
            "result": {"data_array": [["DE", "4121.2"], ["FR", null]]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .execute("SELECT geo, value FROM gdp LIMIT 2")
        .await
        .expect("statement should succeed");

    assert_eq!(result.columns.len(), 2);
    assert!(result.columns[1].is_numeric());
    assert_eq!(result.column_values("geo"), vec!["DE", "FR"]);
    assert_eq!(result.rows[1][1], None);
    assert!(!result.truncated);
}

#[tokio::test]
async fn failed_statement_is_warehouse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statement_id": "01f0",
            "status": {
                "state": "FAILED",
                "error": {
                    "error_code": "BAD_REQUEST",
                    "message": "[TABLE_OR_VIEW_NOT_FOUND] The table or view `nope` cannot be found."
                }
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute("SELECT * FROM nope")
        .await
        .expect_err("FAILED state should be an error");

    let message = err.to_string();
    assert!(message.contains("FAILED"), "{message}");
    assert!(message.contains("TABLE_OR_VIEW_NOT_FOUND"), "{message}");
}

#[tokio::test]
async fn http_error_is_warehouse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .respond_with(ResponseTemplate::new(403).set_body_string("Invalid access token"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute("SELECT 1")
        .await
        .expect_err("403 should fail");

    assert!(err.to_string().contains("Invalid access token"));
}

#[tokio::test]
async fn list_tables_reads_table_name_column() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .and(body_partial_json(json!({
            "statement": "SHOW TABLES IN `workspace`.`eurostat`"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statement_id": "01f1",
            "status": {"state": "SUCCEEDED"},
            "manifest": {
                "schema": {"columns": [
                    {"name": "database", "type_name": "STRING", "position": 0},
                    {"name": "tableName", "type_name": "STRING", "position": 1},
                    {"name": "isTemporary", "type_name": "BOOLEAN", "position": 2}
                ]}
            },
            "result": {"data_array": [
                ["eurostat", "unemployment", "false"],
                ["eurostat", "gdp", "false"]
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tables = client_for(&server).list_tables().await.unwrap();
    assert_eq!(tables, vec!["gdp", "unemployment"]);
}

#[tokio::test]
async fn describe_table_stops_at_partition_section() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .and(body_partial_json(json!({
            "statement": "DESCRIBE TABLE `workspace`.`eurostat`.`gdp`"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statement_id": "01f2",
            "status": {"state": "SUCCEEDED"},
            "manifest": {
                "schema": {"columns": [
                    {"name": "col_name", "type_name": "STRING", "position": 0},
                    {"name": "data_type", "type_name": "STRING", "position": 1},
                    {"name": "comment", "type_name": "STRING", "position": 2}
                ]}
            },
            "result": {"data_array": [
                ["geo", "string", "ISO country code"],
                ["value", "double", null],
                ["# Partition Information", "", ""],
                ["# col_name", "data_type", "comment"]
            ]}
        })))
        .mount(&server)
        .await;

    let columns = client_for(&server).describe_table("gdp").await.unwrap();

    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].comment.as_deref(), Some("ISO country code"));
    assert_eq!(columns[1].data_type, "double");
    assert_eq!(columns[1].comment, None);
}

#[tokio::test]
async fn follows_result_chunks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statement_id": "01f3",
            "status": {"state": "SUCCEEDED"},
            "manifest": {
                "schema": {"columns": [
                    {"name": "geo", "type_name": "STRING", "position": 0}
                ]},
                "total_chunk_count": 3
            },
            "result": {
                "chunk_index": 0,
                "data_array": [["AT"], ["BE"]],
                "next_chunk_index": 1,
                "next_chunk_internal_link": "/api/2.0/sql/statements/01f3/result/chunks/1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/2.0/sql/statements/01f3/result/chunks/1"))
        .and(header("authorization", "Bearer dapi-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chunk_index": 1,
            "data_array": [["CY"]],
            "next_chunk_index": 2,
            "next_chunk_internal_link": "/api/2.0/sql/statements/01f3/result/chunks/2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/2.0/sql/statements/01f3/result/chunks/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chunk_index": 2,
            "data_array": [["DE"]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .execute("SELECT geo FROM gdp")
        .await
        .expect("statement should succeed");

    assert_eq!(result.column_values("geo"), vec!["AT", "BE", "CY", "DE"]);
    assert!(!result.truncated);
}
