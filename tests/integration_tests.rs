//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML config → vendor token → paginated
//! bookings → DuckDB / Parquet

use arrow::array::{Array, Date32Array, Float64Array, StringArray};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;
use tripaction_etl::config::EtlConfig;
use tripaction_etl::engine::{Pipeline, RunOutcome};
use tripaction_etl::load::{DuckDbLoader, ParquetObjectLoader};
use tripaction_etl::pagination::FetchWindow;
use tripaction_etl::secrets::InMemorySecretProvider;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Mock vendor
// ============================================================================

fn config_yaml(base_url: &str) -> String {
    format!(
        r"
project_id: analytics-prod
vendor:
  base_url: {base_url}
  page_size: 2
secrets:
  provider: env
  client_id: ta_id
  client_secret: ta_secret
destination:
  table: data_engineering.tripaction
  sink: duckdb
"
    )
}

fn secrets() -> Box<InMemorySecretProvider> {
    Box::new(
        InMemorySecretProvider::new()
            .with_secret("ta_id", "client-1")
            .with_secret("ta_secret", "s3cret"),
    )
}

async fn mock_vendor() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ta-auth/oauth/token"))
        .and(body_string_contains("client_id=client-1"))
        .and(body_string_contains("client_secret=s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pages = [
        json!([
            {
                "uuid": "b-1",
                "startDate": "2024-01-05",
                "tripName": "Kickoff",
                "booker": { "name": "Ann Lee", "email": "ann@example.com" },
                "costCenters": "['CC100', 'CC200']",
                "usdGrandTotal": 412.75,
                "saving": "12.5",
                "optimalPrice": null,
                "bookingStatus": "TICKETED",
                "vendor": "Delta",
                "bookingType": "FLIGHT"
            },
            {
                "uuid": "b-2",
                "startDate": "2024-02-14T09:30:00Z",
                "booker": { "name": "Raj Patel", "email": "raj@example.com" },
                "costCenters": ["CC300"],
                "usdGrandTotal": 120,
                "bookingType": "HOTEL"
            }
        ]),
        // One record without a start date: the whole page is rejected
        json!([
            { "uuid": "b-3", "startDate": "2024-03-01" },
            { "uuid": "b-4", "startDate": null }
        ]),
        json!([
            {
                "uuid": "b-5",
                "startDate": "2024-04-20",
                "purpose": "Line one\nLine two",
                "costCenters": "[]"
            }
        ]),
    ];

    for (page, data) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/v1/bookings"))
            .and(header("authorization", "Bearer abc"))
            .and(query_param("page", page.to_string()))
            .and(query_param("size", "2"))
            .and(query_param("createdFrom", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": { "totalPages": 4, "currentPage": page },
                "data": data
            })))
            .mount(&server)
            .await;
    }

    // Last page keeps failing and is skipped
    Mock::given(method("GET"))
        .and(path("/v1/bookings"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    server
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn test_end_to_end_into_duckdb() {
    let server = mock_vendor().await;
    let config = EtlConfig::from_yaml(&config_yaml(&server.uri())).unwrap();
    config.validate().unwrap();

    let dir = tempdir().unwrap();
    let db = dir.path().join("warehouse.duckdb");

    let mut pipeline = Pipeline::new(&config, secrets(), Box::new(DuckDbLoader::new(&db)))
        .unwrap()
        .with_window(FetchWindow::new(0, 1_700_000_000));
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.rows_loaded(), 3);
    let stats = pipeline.stats();
    assert_eq!(stats.pages_total, 4);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.pages_rejected, 1);

    let conn = duckdb::Connection::open(&db).unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT uuid, name, email, costCenters, travelMonth, usdGrandTotal, saving, \
             CAST(startDate AS VARCHAR), bookingType \
             FROM data_engineering.tripaction ORDER BY uuid",
        )
        .unwrap();
    let rows: Vec<(
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<f64>,
        Option<f64>,
        String,
        Option<String>,
    )> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })
        .unwrap()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(rows.len(), 3);

    let first = &rows[0];
    assert_eq!(first.0, "b-1");
    assert_eq!(first.1.as_deref(), Some("Ann Lee"));
    assert_eq!(first.2.as_deref(), Some("ann@example.com"));
    assert_eq!(first.3.as_deref(), Some("CC100"));
    assert_eq!(first.4.as_deref(), Some("Jan-24"));
    assert_eq!(first.5, Some(412.75));
    assert_eq!(first.6, Some(12.5));
    assert_eq!(first.7, "2024-01-05");
    assert_eq!(first.8.as_deref(), Some("FLIGHT"));

    let second = &rows[1];
    assert_eq!(second.0, "b-2");
    assert_eq!(second.3.as_deref(), Some("CC300"));
    assert_eq!(second.4.as_deref(), Some("Feb-24"));
    assert_eq!(second.7, "2024-02-14");

    let third = &rows[2];
    assert_eq!(third.0, "b-5");
    assert_eq!(third.1, None);
    assert_eq!(third.3, None);
    assert_eq!(third.4.as_deref(), Some("Apr-24"));
}

#[tokio::test]
async fn test_end_to_end_into_parquet() {
    let server = mock_vendor().await;
    let config = EtlConfig::from_yaml(&config_yaml(&server.uri())).unwrap();

    let dir = tempdir().unwrap();
    let loader = ParquetObjectLoader::new(dir.path().to_str().unwrap()).unwrap();

    let outcome = Pipeline::new(&config, secrets(), Box::new(loader))
        .unwrap()
        .with_window(FetchWindow::new(0, 1_700_000_000))
        .run()
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Loaded { .. }));

    let file = std::fs::File::open(dir.path().join("data_engineering/tripaction/data.parquet"))
        .unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];

    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.num_columns(), 18);

    let schema = batch.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names[0], "name");
    assert_eq!(names[1], "email");
    assert_eq!(names[17], "uuid");

    let uuid = batch
        .column_by_name("uuid")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(uuid.value(0), "b-1");

    let total = batch
        .column_by_name("usdGrandTotal")
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(total.value(1), 120.0);

    let start = batch
        .column_by_name("startDate")
        .unwrap()
        .as_any()
        .downcast_ref::<Date32Array>()
        .unwrap();
    assert!(!start.is_null(2));
}

#[tokio::test]
async fn test_discovery_failure_loads_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ta-auth/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "abc" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/bookings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = EtlConfig::from_yaml(&config_yaml(&server.uri())).unwrap();
    let dir = tempdir().unwrap();
    let db = dir.path().join("warehouse.duckdb");

    let result = Pipeline::new(&config, secrets(), Box::new(DuckDbLoader::new(&db)))
        .unwrap()
        .run()
        .await;

    assert!(result.is_err());
    assert!(!db.exists());
}
