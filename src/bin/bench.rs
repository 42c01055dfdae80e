// HTTP benchmark and smoke client for the MCP time server. Reads a TOML
// step file, POSTs each JSON-RPC payload to a running server, and reports
// latency percentiles for the steps marked `bench`.
use anyhow::{Context, Result};
use clap::Parser;
use hdrhistogram::Histogram;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "bench")]
#[command(about = "Run benchmarks against a running MCP time server", long_about = None)]
struct Args {
    /// Path to the benchmark configuration file (TOML format)
    #[arg(value_name = "BENCH_CONFIG")]
    config_file: PathBuf,

    /// Server endpoint URL
    #[arg(long, default_value = "http://127.0.0.1:3000/mcp")]
    url: String,

    /// Number of times to run the full step list
    #[arg(short, long, default_value_t = 1)]
    iterations: usize,
}

#[derive(Debug, Deserialize)]
struct BenchConfig {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    name: String,

    /// Record latency for this step instead of printing its response.
    #[serde(default)]
    bench: bool,

    #[serde(default = "default_tasks")]
    tasks: usize,

    /// Raw JSON-RPC payload sent as-is.
    payload: Value,
}

fn default_tasks() -> usize {
    1
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let content =
        std::fs::read_to_string(&args.config_file).context("Failed to read config file")?;
    let config: BenchConfig = toml::from_str(&content).context("Failed to parse TOML config")?;

    if config.steps.is_empty() {
        anyhow::bail!("No steps defined in {}", args.config_file.display());
    }

    let client = reqwest::Client::new();
    let mut timings: IndexMap<String, Vec<u64>> = IndexMap::new();

    for iteration in 1..=args.iterations {
        if args.iterations > 1 {
            println!("\n{}", "=".repeat(80));
            println!("Iteration {}/{}", iteration, args.iterations);
            println!("{}\n", "=".repeat(80));
        }
        for step in &config.steps {
            run_step(&client, &args.url, step, &mut timings).await?;
        }
    }

    print_statistics(&timings)?;
    Ok(())
}

async fn run_step(
    client: &reqwest::Client,
    url: &str,
    step: &Step,
    timings: &mut IndexMap<String, Vec<u64>>,
) -> Result<()> {
    for _ in 0..step.tasks {
        let start = Instant::now();
        let response: Value = client
            .post(url)
            .json(&step.payload)
            .send()
            .await
            .with_context(|| format!("Request failed for step '{}'", step.name))?
            .json()
            .await
            .with_context(|| format!("Non-JSON response for step '{}'", step.name))?;
        let elapsed_us = start.elapsed().as_micros() as u64;

        let failed = response.get("error").is_some()
            || response
                .pointer("/result/isError")
                .and_then(Value::as_bool)
                .unwrap_or(false);

        if step.bench {
            timings.entry(step.name.clone()).or_default().push(elapsed_us);
            if failed {
                println!("ERROR in {}: {}", step.name, preview(&response, 200));
            }
        } else {
            let status = if failed { "ERROR" } else { "OK" };
            println!(
                "{:<25} | {:<6} | {:>8} us | {}",
                step.name,
                status,
                elapsed_us,
                preview(&response, 100)
            );
        }
    }
    Ok(())
}

fn preview(response: &Value, max_chars: usize) -> String {
    let text = response.to_string();
    if text.chars().count() <= max_chars {
        text
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

fn print_statistics(timings: &IndexMap<String, Vec<u64>>) -> Result<()> {
    if timings.is_empty() {
        return Ok(());
    }
    println!("\n{}", "=".repeat(80));
    println!(
        "{:<25} | {:>8} | {:>10} | {:>10} | {:>10}",
        "step", "samples", "median us", "p99 us", "max us"
    );
    println!("{}", "-".repeat(80));
    for (name, samples) in timings {
        let mut hist = Histogram::<u64>::new(3).context("Failed to create histogram")?;
        for v in samples {
            hist.record(*v).context("Failed to record sample")?;
        }
        println!(
            "{:<25} | {:>8} | {:>10} | {:>10} | {:>10}",
            name,
            hist.len(),
            hist.value_at_quantile(0.5),
            hist.value_at_quantile(0.99),
            hist.max()
        );
    }
    Ok(())
}
