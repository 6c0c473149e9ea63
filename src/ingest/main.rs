//! Bulk place loader.
//!
//! Reads a place CSV (optionally gzipped) and pushes it to a running server's
//! bulk-load endpoint in batches.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use weatherwise::dataset::{load_places_csv, PlaceInput};

const BULK_LOAD_PATH: &str = "/api/places/bulk-load";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Load a place CSV into a running WeatherWise server")]
struct Args {
    /// Place CSV (name,lat,lon,type,address,activity_type), optionally .gz
    #[arg(short, long)]
    file: PathBuf,

    /// Server base URL
    #[arg(long, default_value = "http://localhost:8000")]
    server_url: String,

    /// Places per request
    #[arg(long, default_value = "500")]
    batch_size: usize,

    /// Requests in flight
    #[arg(long, default_value = "2")]
    concurrency: usize,
}

#[derive(Serialize)]
struct BulkLoadBody<'a> {
    places: &'a [PlaceInput],
}

#[derive(Debug, Deserialize)]
struct BulkLoadReply {
    #[serde(default)]
    message: String,
    total_places: usize,
}

struct BulkLoader {
    client: Client,
    url: String,
}

impl BulkLoader {
    fn new(server_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: format!("{}{}", server_url.trim_end_matches('/'), BULK_LOAD_PATH),
        })
    }

    async fn send(&self, batch: &[PlaceInput]) -> Result<BulkLoadReply> {
        let response = self
            .client
            .post(&self.url)
            .json(&BulkLoadBody { places: batch })
            .send()
            .await
            .context("Bulk load request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Server rejected batch ({}): {}", status, body);
        }

        response.json().await.context("Unexpected bulk load response")
    }
}

#[derive(Debug, Default, PartialEq)]
struct UploadSummary {
    sent: usize,
    failed_batches: usize,
    /// Largest index size the server reported
    total_places: usize,
}

async fn upload(
    loader: &BulkLoader,
    places: &[PlaceInput],
    batch_size: usize,
    concurrency: usize,
    pb: &ProgressBar,
) -> UploadSummary {
    let mut summary = UploadSummary::default();

    let mut results = stream::iter(places.chunks(batch_size.max(1)))
        .map(|batch| async move { (batch.len(), loader.send(batch).await) })
        .buffer_unordered(concurrency.max(1));

    while let Some((len, result)) = results.next().await {
        match result {
            Ok(reply) => {
                summary.sent += len;
                summary.total_places = summary.total_places.max(reply.total_places);
                pb.set_message(reply.message);
            }
            Err(e) => {
                warn!("Batch of {} places failed: {:#}", len, e);
                summary.failed_batches += 1;
            }
        }
        pb.inc(len as u64);
    }

    summary
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("WeatherWise Place Ingest");

    let places = load_places_csv(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    if places.is_empty() {
        info!("No places in {}, nothing to do", args.file.display());
        return Ok(());
    }

    let loader = BulkLoader::new(&args.server_url)?;
    info!("Uploading {} places to {}", places.len(), loader.url);

    let pb = ProgressBar::new(places.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}",
            )?
            .progress_chars("#>-"),
    );

    let summary = upload(&loader, &places, args.batch_size, args.concurrency, &pb).await;
    pb.finish_with_message("Upload complete");

    info!(
        "Sent {} places; server now holds {} places",
        summary.sent, summary.total_places
    );

    if summary.failed_batches > 0 {
        anyhow::bail!("{} batches failed", summary.failed_batches);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn places(n: usize) -> Vec<PlaceInput> {
        (0..n)
            .map(|i| PlaceInput {
                name: format!("Place {}", i),
                lat: 9.0 + i as f64 * 0.01,
                lon: 76.0,
                place_type: None,
                address: None,
                activity_type: Some("picnic".to_string()),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_upload_in_batches() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/places/bulk-load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Successfully loaded 2 places",
                "status": "success",
                "total_places": 42
            })))
            .expect(3)
            .mount(&mock_server)
            .await;

        let loader = BulkLoader::new(&format!("{}/", mock_server.uri())).unwrap();
        let pb = ProgressBar::hidden();
        let summary = upload(&loader, &places(5), 2, 2, &pb).await;

        assert_eq!(
            summary,
            UploadSummary {
                sent: 5,
                failed_batches: 0,
                total_places: 42,
            }
        );
        assert_eq!(pb.position(), 5);
    }

    #[tokio::test]
    async fn test_rejected_batches_are_counted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("Invalid place at index 0"))
            .mount(&mock_server)
            .await;

        let loader = BulkLoader::new(&mock_server.uri()).unwrap();
        let err = loader.send(&places(1)).await.unwrap_err();
        assert!(err.to_string().contains("422"));

        let summary = upload(&loader, &places(3), 10, 1, &ProgressBar::hidden()).await;
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.failed_batches, 1);
    }
}
