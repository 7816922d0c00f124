//! Workspace-level integration tests: the scheduler and pipeline crates
//! wired together exactly as a caller would use them, rather than
//! exercised in isolation against fakes.
//!
//! Scenario names follow the literal cases in the concrete testable
//! properties: S1 (linear append), S2 (linear shell echo), S3 (middle
//! failure blocks descendants).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use jobgraph_pipeline::{Output, OutputMap, Pipeline, PipelineConfig, PipelineTask, SetupCtx, Task};
use jobgraph_runner::ShellRunner;
use jobgraph_scheduler::{Scheduler, SchedulerConfig};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        scheduler: SchedulerConfig {
            max_concurrent: None,
            poll_interval: Duration::from_millis(10),
        },
    }
}

struct AppendItem {
    log: Arc<Mutex<Vec<String>>>,
    item: &'static str,
}

impl PipelineTask for AppendItem {
    fn setup(&mut self, _ctx: &mut SetupCtx) {
        self.log.lock().unwrap().push(self.item.to_string());
    }

    fn output(&self) -> Output {
        Output::new(self.log.lock().unwrap().clone())
    }
}

#[tokio::test]
async fn s1_linear_append_produces_cumulative_output_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut pipeline = Pipeline::with_config(fast_config());
    let a = pipeline.add_task(
        Task::new(
            "A",
            AppendItem {
                log: log.clone(),
                item: "item1",
            },
        ),
        [],
    );
    let b = pipeline.add_task(
        Task::new(
            "B",
            AppendItem {
                log: log.clone(),
                item: "item2",
            },
        ),
        [a.clone()],
    );

    let exit = pipeline.run(dir.path(), None).await.unwrap();
    assert_eq!(exit, 0);
    assert_eq!(
        pipeline.output(&a).unwrap().downcast::<Vec<String>>().unwrap(),
        vec!["item1".to_string()]
    );
    assert_eq!(
        pipeline.output(&b).unwrap().downcast::<Vec<String>>().unwrap(),
        vec!["item1".to_string(), "item2".to_string()]
    );
}

struct EchoToFile {
    file: std::path::PathBuf,
    item: &'static str,
}

impl PipelineTask for EchoToFile {
    fn setup(&mut self, ctx: &mut SetupCtx) {
        ctx.add_cmd(jobgraph_pipeline::PipelineCommandWrapper::new(
            format!("Echo {}", self.item),
            [
                "echo".to_string(),
                self.item.to_string(),
                ">>".to_string(),
                self.file.display().to_string(),
            ],
        ));
    }

    fn output(&self) -> Output {
        Output::empty()
    }
}

#[tokio::test]
async fn s2_linear_shell_echo_appends_to_file_in_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");

    let mut pipeline = Pipeline::with_config(fast_config());
    let e1 = pipeline.add_task(
        Task::new(
            "E1",
            EchoToFile {
                file: out.clone(),
                item: "item1",
            },
        ),
        [],
    );
    pipeline.add_task(
        Task::new(
            "E2",
            EchoToFile {
                file: out.clone(),
                item: "item2",
            },
        ),
        [e1],
    );

    let exit = pipeline.run(dir.path(), None).await.unwrap();
    assert_eq!(exit, 0);
    assert_eq!(fs::read_to_string(&out).unwrap(), "item1\nitem2\n");
}

struct AutoFail {
    message: &'static str,
}

impl PipelineTask for AutoFail {
    fn setup(&mut self, ctx: &mut SetupCtx) {
        ctx.fail(self.message);
    }

    fn output(&self) -> Output {
        Output::empty()
    }
}

#[tokio::test]
async fn s3_middle_failure_blocks_descendant_and_fails_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut pipeline = Pipeline::with_config(fast_config());
    let a = pipeline.add_task(
        Task::new(
            "A",
            AppendItem {
                log: log.clone(),
                item: "item1",
            },
        ),
        [],
    );
    let f = pipeline.add_task(
        Task::new(
            "F",
            AutoFail {
                message: "Automatic fail",
            },
        ),
        [a.clone()],
    );
    let c = pipeline.add_task(
        Task::new(
            "C",
            AppendItem {
                log: log.clone(),
                item: "item3",
            },
        ),
        [f.clone()],
    );

    let exit = pipeline.run(dir.path(), None).await.unwrap();
    assert_eq!(exit, 1);

    assert_eq!(
        pipeline.output(&a).unwrap().downcast::<Vec<String>>().unwrap(),
        vec!["item1".to_string()]
    );
    assert_eq!(pipeline.exit_code(&f), Some(1));
    assert!(pipeline.is_blocked(&c));
    // C's `setup` never ran: the log holds only what A wrote.
    assert_eq!(*log.lock().unwrap(), vec!["item1".to_string()]);
}

/// A pipeline can be handed a [`Scheduler`] the caller already started and
/// will go on using after `run()` returns, rather than always building and
/// tearing down its own.
#[tokio::test]
async fn pipeline_runs_against_a_caller_supplied_scheduler() {
    let dir = tempfile::tempdir().unwrap();
    let sched = Arc::new(Scheduler::new(
        Arc::new(ShellRunner::new()),
        SchedulerConfig {
            max_concurrent: Some(2),
            poll_interval: Duration::from_millis(10),
        },
    ));
    sched.start().unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut pipeline = Pipeline::new();
    pipeline.add_task(
        Task::new(
            "A",
            AppendItem {
                log: log.clone(),
                item: "item1",
            },
        ),
        [],
    );

    let exit = pipeline.run(dir.path(), Some(sched.clone())).await.unwrap();
    assert_eq!(exit, 0);
    assert_eq!(*log.lock().unwrap(), vec!["item1".to_string()]);

    sched.stop();
    sched.join().await;
    assert!(sched.is_empty());
}

/// Deferred arguments: a consumer task declares `Arg::From(producer_id)`
/// and resolves it against the producer's actual output once the
/// pipeline has run both to completion.
struct Produce(i64);

impl PipelineTask for Produce {
    fn setup(&mut self, _ctx: &mut SetupCtx) {}

    fn output(&self) -> Output {
        Output::new(self.0)
    }
}

struct ConsumeDoubled {
    input: jobgraph_pipeline::Arg<i64>,
    doubled: Option<i64>,
}

impl PipelineTask for ConsumeDoubled {
    fn resolve_args(&mut self, outputs: &OutputMap) {
        self.doubled = self.input.resolve(outputs).map(|n| n * 2);
    }

    fn setup(&mut self, _ctx: &mut SetupCtx) {}

    fn output(&self) -> Output {
        Output::new(self.doubled)
    }
}

#[tokio::test]
async fn deferred_arg_resolves_against_upstream_output_once_both_tasks_ran() {
    let dir = tempfile::tempdir().unwrap();

    let mut pipeline = Pipeline::with_config(fast_config());
    let producer = pipeline.add_task(Task::new("Produce", Produce(21)), []);
    let consumer = pipeline.add_task(
        Task::new(
            "Consume",
            ConsumeDoubled {
                input: jobgraph_pipeline::Arg::From(producer.clone()),
                doubled: None,
            },
        ),
        [producer],
    );

    let exit = pipeline.run(dir.path(), None).await.unwrap();
    assert_eq!(exit, 0);
    assert_eq!(
        pipeline.output(&consumer).unwrap().downcast::<Option<i64>>().unwrap(),
        Some(42)
    );
}
