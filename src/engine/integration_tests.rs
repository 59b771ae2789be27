// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::Cursor;
use std::sync::Arc;

use crate::cutflow::{Bookkeeping, Branch, Cutflow, LambdaCut};
use crate::engine::{ParallelExecutor, SequentialExecutor};
use crate::errors::{ExecutionError, ExecutionFailure, SourceError, StoreError};
use crate::event::{Event, JsonLinesSource, MemorySource};
use crate::store::{RowStore, Stores, Value, VariableStore};
use crate::traits::{CutflowExecutor, ExecutionSummary};

/// Bookkeeping -> InWindow (10 <= value < 100) -> {pass: Even, fail: Large}
fn cutflow() -> Arc<Cutflow> {
    let mut cutflow = Cutflow::new();
    cutflow
        .set_root("Bookkeeping", Bookkeeping::default().with_weight_field("w"))
        .unwrap();
    cutflow
        .insert(
            "Bookkeeping",
            "InWindow",
            LambdaCut::new(|ctx| {
                let value = ctx.event.get::<i64>("value")?.unwrap_or(0);
                ctx.variables.set("half", value as f64 / 2.0)?;
                Ok((10..100).contains(&value))
            }),
            Branch::Pass,
        )
        .unwrap();
    cutflow
        .insert(
            "InWindow",
            "Even",
            LambdaCut::new(|ctx| {
                let value = ctx.event.get::<i64>("value")?.unwrap_or(0);
                ctx.row.set("value", value)?;
                ctx.row.set("half", ctx.variables.get::<f64>("half")?)?;
                Ok(value % 2 == 0)
            })
            .with_weight(|_| Ok(0.5)),
            Branch::Pass,
        )
        .unwrap();
    cutflow
        .insert(
            "InWindow",
            "Large",
            LambdaCut::new(|ctx| {
                let value = ctx.event.get::<i64>("value")?.unwrap_or(0);
                ctx.row.set("value", value)?;
                Ok(value >= 100)
            }),
            Branch::Fail,
        )
        .unwrap();
    Arc::new(cutflow)
}

fn stores() -> Stores {
    let mut variables = VariableStore::new();
    variables.declare::<f64>("half").unwrap();
    let mut row = RowStore::new();
    row.declare("value", -1_i64).unwrap();
    row.declare("half", -999.0).unwrap();
    let mut stores = Stores::new(variables, row);
    stores.seal();
    stores
}

fn events(count: i64) -> Vec<Event> {
    (0..count)
        .map(|i| {
            Event::new()
                .with("value", (i * 37) % 211)
                .with("w", 1.0 + (i % 3) as f64)
        })
        .collect()
}

async fn run(executor: &dyn CutflowExecutor, events: Vec<Event>) -> Result<ExecutionSummary, ExecutionFailure> {
    executor
        .execute(cutflow(), stores(), "Bookkeeping", Box::new(MemorySource::new(events)))
        .await
}

#[tokio::test]
async fn test_parallel_matches_sequential() {
    let sequential = run(&SequentialExecutor::new(None), events(1000)).await.unwrap();

    for (max_concurrency, chunk_size) in [(1, 1000), (3, 7), (8, 64), (4, 5000)] {
        let parallel = run(&ParallelExecutor::new(max_concurrency, chunk_size, None), events(1000))
            .await
            .unwrap();

        assert_eq!(parallel.processed, sequential.processed);
        assert_eq!(parallel.accepted, sequential.accepted);
        assert_eq!(parallel.stats, sequential.stats);
        assert_eq!(parallel.table, sequential.table);
    }

    assert_eq!(sequential.processed, 1000);
    assert_eq!(sequential.table.len() as u64, sequential.accepted);
}

#[tokio::test]
async fn test_table_keeps_record_arrival_order() {
    let values = [12_i64, 500, 3, 44, 150, 98];
    let input: Vec<Event> = values.iter().map(|&v| Event::new().with("value", v)).collect();

    let summary = run(&ParallelExecutor::new(4, 1, None), input).await.unwrap();

    // 12, 44, 98 pass Even; 500, 150 pass Large; 3 fails Large
    let committed: Vec<&Value> = (0..summary.table.len())
        .map(|i| summary.table.cell(i, "value").unwrap())
        .collect();
    assert_eq!(
        committed,
        vec![&Value::Int(12), &Value::Int(500), &Value::Int(44), &Value::Int(150), &Value::Int(98)]
    );
    assert_eq!(summary.table.cell(1, "half"), Some(&Value::Float(-999.0)));
    assert_eq!(summary.table.cell(2, "half"), Some(&Value::Float(22.0)));
}

#[tokio::test]
async fn test_stats_reduce_to_report() {
    let summary = run(&SequentialExecutor::new(None), events(300)).await.unwrap();
    let report = cutflow().report_with(&summary.stats);

    let root = report.get("Bookkeeping").unwrap();
    let window = report.get("InWindow").unwrap();
    let even = report.get("Even").unwrap();
    let large = report.get("Large").unwrap();

    assert_eq!(root.stats.n_pass, 300);
    assert_eq!(window.stats.reached(), 300);
    assert_eq!(even.stats.reached(), window.stats.n_pass);
    assert_eq!(large.stats.reached(), window.stats.n_fail);
    assert_eq!(even.stats.n_pass + large.stats.n_pass, summary.accepted);
    assert_eq!(root.stats.n_pass_weighted, window.stats.reached_weighted());
}

#[tokio::test]
async fn test_fault_carries_record_index_and_cut() {
    let mut input = events(50);
    input[37] = Event::new().with("value", "thirty-seven".to_string());

    let executors: Vec<Box<dyn CutflowExecutor>> = vec![
        Box::new(SequentialExecutor::new(None)),
        Box::new(ParallelExecutor::new(4, 4, None)),
    ];

    for executor in executors {
        match run(executor.as_ref(), input.clone()).await.map_err(|f| f.error) {
            Err(ExecutionError::Record { index, node, source }) => {
                assert_eq!(index, 37, "{} driver", executor.strategy());
                assert_eq!(node, "InWindow");
                assert!(matches!(source, StoreError::TypeMismatch { .. }));
            }
            other => panic!("{} driver: expected record fault, got {:?}", executor.strategy(), other.map(|s| s.processed)),
        }
    }
}

#[tokio::test]
async fn test_earliest_fault_wins_across_chunks() {
    let mut input = events(40);
    input[33] = Event::new().with("value", true);
    input[5] = Event::new().with("value", 1.5);

    let err = run(&ParallelExecutor::new(8, 3, None), input).await.unwrap_err();
    assert!(matches!(err.error, ExecutionError::Record { index: 5, .. }));
}

#[tokio::test]
async fn test_aborted_runs_keep_identical_partial_counters() {
    let mut input = events(200);
    input[123] = Event::new().with("value", "bad".to_string());

    let sequential = run(&SequentialExecutor::new(None), input.clone()).await.unwrap_err();
    let parallel = run(&ParallelExecutor::new(4, 10, None), input).await.unwrap_err();

    assert_eq!(sequential.partial.processed, 123);
    assert_eq!(parallel.partial.processed, 123);
    assert_eq!(parallel.partial.accepted, sequential.partial.accepted);
    assert_eq!(parallel.partial.stats, sequential.partial.stats);
    assert_eq!(parallel.partial.table, sequential.partial.table);

    // the faulting record was counted at the root before InWindow failed on it
    let root = sequential.partial.stats.get(0).unwrap();
    assert_eq!(root.n_pass, 124);
    assert_eq!(sequential.partial.stats.get(1).unwrap().reached(), 123);
}

#[tokio::test]
async fn test_debug_limit_stops_both_drivers() {
    let sequential = run(&SequentialExecutor::new(Some(25)), events(100)).await.unwrap();
    let parallel = run(&ParallelExecutor::new(3, 4, Some(25)), events(100)).await.unwrap();

    assert_eq!(sequential.processed, 25);
    assert_eq!(parallel.processed, 25);
    assert_eq!(parallel.stats, sequential.stats);
    assert_eq!(parallel.table, sequential.table);
}

#[tokio::test]
async fn test_unknown_start_is_rejected() {
    for executor in [
        Box::new(SequentialExecutor::new(None)) as Box<dyn CutflowExecutor>,
        Box::new(ParallelExecutor::new(2, 8, None)),
    ] {
        let err = executor
            .execute(cutflow(), stores(), "Nowhere", Box::new(MemorySource::new(events(3))))
            .await
            .unwrap_err();
        assert!(matches!(err.error, ExecutionError::StartNotFound { ref name } if name == "Nowhere"));
        assert_eq!(err.partial.processed, 0);
    }
}

#[tokio::test]
async fn test_resuming_mid_tree_skips_upstream_cuts() {
    let summary = SequentialExecutor::new(None)
        .execute(cutflow(), stores(), "Large", Box::new(MemorySource::new(events(20))))
        .await
        .unwrap();

    assert_eq!(summary.stats.get(0).unwrap().reached(), 0);
    assert_eq!(summary.stats.get(1).unwrap().reached(), 0);
    assert_eq!(summary.stats.get(3).unwrap().reached(), 20);
}

#[tokio::test]
async fn test_source_fault_reports_record_index() {
    let input = "{\"value\": 12}\n{\"value\": 40}\nnot json\n{\"value\": 50}\n";

    for executor in [
        Box::new(SequentialExecutor::new(None)) as Box<dyn CutflowExecutor>,
        Box::new(ParallelExecutor::new(2, 2, None)),
    ] {
        let source = JsonLinesSource::new(Cursor::new(input.to_string()));
        let err = executor
            .execute(cutflow(), stores(), "Bookkeeping", Box::new(source))
            .await
            .unwrap_err();
        assert_eq!(err.partial.processed, 2);
        match err.error {
            ExecutionError::Source { index, source } => {
                assert_eq!(index, 2);
                assert!(matches!(source, SourceError::Parse { line: 3, .. }));
            }
            other => panic!("expected source fault, got {}", other),
        }
    }
}
