// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Args;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::warn;

const DEFAULT_IMAGE_URLS: [&str; 2] = [
    "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=400",
    "https://images.unsplash.com/photo-1572635196237-14b3f281503f?w=400",
];

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Base URL of the running service
    #[arg(long, env = "PROBE_URL", default_value = "http://localhost:8000")]
    pub url: String,

    /// Bearer token sent as Authorization header (for gateways in front of the service)
    #[arg(long, env = "PROBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Comma-separated image URLs; the first is used for the single-image check
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_IMAGE_URLS.map(String::from))]
    pub image_urls: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

/// Result of one probe check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

/// Runs health plus the four encode routes against `base_url`
pub struct Prober {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl Prober {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Run every check in order; failures do not stop later checks
    pub async fn run_all(&self, image_urls: &[String]) -> Vec<CheckOutcome> {
        let first_image = image_urls.first().cloned().unwrap_or_default();

        vec![
            self.check("health", self.health()).await,
            self.check(
                "single_text",
                self.encode("/encode/text", json!({"text": "red leather shoes"}), 384, 1),
            )
            .await,
            self.check(
                "single_image",
                self.encode("/encode/image", json!({"image_url": first_image}), 512, 1),
            )
            .await,
            self.check(
                "batch_text",
                self.encode(
                    "/encode/batch/text",
                    json!({"texts": ["red leather shoes", "blue cotton jacket", "black leather bag"]}),
                    384,
                    3,
                ),
            )
            .await,
            self.check(
                "batch_images",
                self.encode(
                    "/encode/batch/image",
                    json!({"image_urls": image_urls}),
                    512,
                    image_urls.len(),
                ),
            )
            .await,
        ]
    }

    async fn check<F>(&self, name: &'static str, run: F) -> CheckOutcome
    where
        F: std::future::Future<Output = Result<String>>,
    {
        println!("\n{}\n{}\n{}", "=".repeat(70), name, "=".repeat(70));
        match run.await {
            Ok(detail) => {
                println!("{}", detail);
                CheckOutcome {
                    name,
                    passed: true,
                    detail,
                }
            }
            Err(e) => {
                let detail = format!("{:#}", e);
                warn!("{} failed: {}", name, detail);
                println!("Error: {}", detail);
                CheckOutcome {
                    name,
                    passed: false,
                    detail,
                }
            }
        }
    }

    async fn health(&self) -> Result<String> {
        let request = self.authorize(self.client.get(format!("{}/", self.base_url)));
        let body = send(request).await?;
        if body["status"] != "ready" {
            return Err(anyhow!("Service not ready: {}", body));
        }
        Ok(format!(
            "  Device: {}\n  Models: {}",
            body["device"], body["models"]
        ))
    }

    async fn encode(
        &self,
        path: &str,
        payload: Value,
        expected_dimensions: u64,
        expected_count: usize,
    ) -> Result<String> {
        let start = Instant::now();
        let request = self.authorize(
            self.client
                .post(format!("{}{}", self.base_url, path))
                .json(&payload),
        );
        let body = send(request).await?;
        let total_ms = start.elapsed().as_secs_f64() * 1000.0;

        let dimensions = body["dimensions"]
            .as_u64()
            .ok_or_else(|| anyhow!("Response has no dimensions: {}", body))?;
        if dimensions != expected_dimensions {
            return Err(anyhow!(
                "Expected {} dimensions, got {}",
                expected_dimensions,
                dimensions
            ));
        }

        let first_five: Vec<Value> = match body.get("vectors").and_then(Value::as_array) {
            Some(vectors) => {
                if vectors.len() != expected_count {
                    return Err(anyhow!(
                        "Expected {} vectors, got {}",
                        expected_count,
                        vectors.len()
                    ));
                }
                vectors
                    .first()
                    .and_then(Value::as_array)
                    .map(|v| v.iter().take(5).cloned().collect())
                    .unwrap_or_default()
            }
            None => body["vector"]
                .as_array()
                .map(|v| v.iter().take(5).cloned().collect())
                .ok_or_else(|| anyhow!("Response has no vector: {}", body))?,
        };

        let mut detail = format!(
            "  Total latency: {:.2}ms\n  Dimensions: {}\n  Model: {}\n  Processing latency: {}ms",
            total_ms, dimensions, body["model"], body["latency_ms"]
        );
        if let Some(count) = body.get("count") {
            detail.push_str(&format!(
                "\n  Count: {}\n  Avg per item: {}ms",
                count, body["avg_latency_per_item_ms"]
            ));
        }
        detail.push_str(&format!("\n  Vector (first 5): {:?}", first_five));
        Ok(detail)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request.send().await.context("Request failed")?;
    let status = response.status();
    let text = response.text().await.context("Failed to read response")?;
    if !status.is_success() {
        return Err(anyhow!("HTTP {}: {}", status.as_u16(), text));
    }
    serde_json::from_str(&text).context("Response is not JSON")
}

/// Print the pass/fail table; returns true when everything passed
pub fn print_summary(outcomes: &[CheckOutcome]) -> bool {
    println!("\n{}\nPROBE SUMMARY\n{}", "=".repeat(70), "=".repeat(70));
    for outcome in outcomes {
        let status = if outcome.passed { "✓ PASS" } else { "✗ FAIL" };
        println!("  {:20}: {}", outcome.name, status);
    }

    let passed = outcomes.iter().filter(|o| o.passed).count();
    println!("\nTotal: {}/{} checks passed", passed, outcomes.len());
    passed == outcomes.len()
}

pub async fn probe(args: ProbeArgs) -> Result<()> {
    println!("Probing {}", args.url);
    let prober = Prober::new(
        &args.url,
        args.api_key.clone(),
        Duration::from_secs(args.timeout_secs),
    )?;

    let outcomes = prober.run_all(&args.image_urls).await;
    if print_summary(&outcomes) {
        println!("\n✅ All checks passed");
        Ok(())
    } else {
        let failed = outcomes.iter().filter(|o| !o.passed).count();
        Err(anyhow!("{} check(s) failed", failed))
    }
}
