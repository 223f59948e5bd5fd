/*
 * Executes one extraction task against a live MySQL database.
 *
 * Prerequisites:
 * - MySQL reachable from this host
 * - A task envelope produced by the planner (plan_job --print-tasks)
 *
 * Usage:
 *   cargo run --example scan_task -- --task task.json --out part-00000.txt
 *
 * Omitting --out writes records to stdout.
 */

use extract_common::ExtractTask;
use extract_scanner::ScanExecutor;
use tokio::io::AsyncWrite;

type Output = Box<dyn AsyncWrite + Unpin + Send>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("extract=debug".parse()?)
                .add_directive("sqlx=warn".parse()?),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let task_path = get_arg(&args, "--task").unwrap_or("task.json");
    let out_path = get_arg(&args, "--out");

    // Step 1: Load the task envelope
    tracing::info!("Loading task from {}", task_path);
    let document = std::fs::read_to_string(task_path)?;
    let task: ExtractTask = serde_json::from_str(&document)?;
    tracing::info!("  Task: {}", task.task_id);
    tracing::info!("  Job: {}", task.job_name);
    tracing::info!("  Splits: {}", task.group.len());
    tracing::info!("  Rows: {}", task.total_rows());

    let mut output: Output = match out_path {
        Some(path) => {
            tracing::info!("  Output: {}", path);
            Box::new(tokio::fs::File::create(path).await?)
        }
        None => Box::new(tokio::io::stdout()),
    };

    // Step 2: Execute the scan
    let executor = ScanExecutor::new();
    let result = executor.execute(task, &mut output).await;

    // Step 3: Report the outcome
    tracing::info!("Result:");
    tracing::info!("  Status: {:?}", result.status);
    tracing::info!("  Rows emitted: {}", result.stats.rows_emitted);
    tracing::info!("  Bytes written: {}", result.stats.bytes_written);
    tracing::info!("  Splits scanned: {}", result.stats.splits_scanned);
    tracing::info!("  Duration: {} ms", result.stats.duration_ms);

    if let Some(error) = &result.error {
        tracing::error!("Error: {}", error);
        std::process::exit(1);
    }

    Ok(())
}

fn get_arg<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
