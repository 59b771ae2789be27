// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use the_cutflow::config::{load_config, RuntimeBuilder};
use the_cutflow::event::JsonLinesSource;
use the_cutflow::observability::messages::engine::OutputWritten;
use the_cutflow::observability::messages::StructuredLog;

const DEBUG_FLAG: &str = "--debug";
const MERMAID_ORIENTATION: &str = "TD";

struct Invocation {
    config: PathBuf,
    events: PathBuf,
    output_dir: PathBuf,
    debug: bool,
}

fn parse_args(args: &[String]) -> Option<Invocation> {
    let debug = args.iter().any(|a| a == DEBUG_FLAG);
    let positional: Vec<&String> = args.iter().skip(1).filter(|a| *a != DEBUG_FLAG).collect();

    match positional.as_slice() {
        [config, events] => Some(Invocation {
            config: PathBuf::from(config),
            events: PathBuf::from(events),
            output_dir: PathBuf::from("."),
            debug,
        }),
        [config, events, output_dir] => Some(Invocation {
            config: PathBuf::from(config),
            events: PathBuf::from(events),
            output_dir: PathBuf::from(output_dir),
            debug,
        }),
        _ => None,
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let Some(invocation) = parse_args(&args) else {
        eprintln!("Usage: {} <config.yaml> <events.jsonl> [output_dir] [{}]", args[0], DEBUG_FLAG);
        eprintln!("Example: {} configs/vbswh.yaml configs/vbswh-events.jsonl out/", args[0]);
        std::process::exit(1);
    };

    init_tracing(invocation.debug);
    run(&invocation).await
}

async fn run(invocation: &Invocation) -> anyhow::Result<()> {
    let start_time = Instant::now();

    // Validated once, by RuntimeBuilder::from_config.
    let mut config = load_config(&invocation.config)
        .with_context(|| format!("loading {}", invocation.config.display()))?;
    if invocation.debug && config.executor_options.debug_limit.is_none() {
        config.executor_options.debug_limit = Some(the_cutflow::config::consts::DEBUG_RECORD_LIMIT);
    }

    let (mut cutflow, stores, executor) = RuntimeBuilder::from_config(&config)?;
    let source = JsonLinesSource::open(&invocation.events)
        .with_context(|| format!("opening {}", invocation.events.display()))?;

    println!("📋 Configuration: {}", invocation.config.display());
    println!("🔧 Strategy: {}", executor.strategy());
    println!("✂️  Cuts: {}", cutflow.len());

    let shared = Arc::new(cutflow);
    // Outputs are written even for an aborted run so the counters up to the fault survive.
    let (summary, fault) = match executor
        .execute(shared.clone(), stores, config.start(), Box::new(source))
        .await
    {
        Ok(summary) => (summary, None),
        Err(failure) => (failure.partial, Some(failure.error)),
    };
    cutflow = Arc::try_unwrap(shared)
        .map_err(|_| anyhow::anyhow!("cutflow still shared after execution"))?;
    cutflow.absorb(&summary.stats);

    let report = cutflow.report();
    tracing::info!("Cutflow for '{}':\n{}", config.name, report.render_tree());

    std::fs::create_dir_all(&invocation.output_dir)
        .with_context(|| format!("creating {}", invocation.output_dir.display()))?;

    let rows = output_path(&invocation.output_dir, &config.name, "jsonl");
    summary.table.write_jsonl(&rows)?;
    OutputWritten { artifact: "rows", path: &rows }.log();

    let cflow = output_path(&invocation.output_dir, &config.name, "cflow");
    report.write(&cflow)?;
    OutputWritten { artifact: "report", path: &cflow }.log();

    let mermaid = output_path(&invocation.output_dir, &config.name, "mmd");
    std::fs::write(&mermaid, report.to_mermaid(MERMAID_ORIENTATION))?;
    OutputWritten { artifact: "mermaid", path: &mermaid }.log();

    println!("\n📊 Execution Results:");
    println!("🔢 Records processed: {}", summary.processed);
    println!("✅ Records accepted: {}", summary.accepted);
    println!("⏱️  Execution Time: {:?}", summary.elapsed);
    println!("⏱️  Total Time: {:?}", start_time.elapsed());

    match fault {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn output_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, extension))
}
