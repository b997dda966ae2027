use criterion::{Criterion, criterion_group, criterion_main};
use jobmatrix::config::{Catalogue, Isolation};
use jobmatrix::core::executor::ExecutionSettings;
use jobmatrix::core::generate;
use jobmatrix::core::orchestrator::Orchestrator;
use jobmatrix::infra::command::{CommandOutcome, CommandRunner, Invocation};
use jobmatrix::models::{Axis, CellPattern, Step};
use std::hint::black_box;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

/// Answers every invocation with success without spawning anything.
struct NoopRunner;

impl CommandRunner for NoopRunner {
    async fn run(&self, _invocation: &Invocation) -> io::Result<CommandOutcome> {
        Ok(CommandOutcome {
            exit_code: Some(0),
            ..CommandOutcome::default()
        })
    }
}

fn axes() -> Vec<Axis> {
    vec![
        Axis::new("os", ["ubuntu", "macos", "windows", "freebsd"]),
        Axis::new("python", ["3.7", "3.8", "3.9", "3.10", "3.11"]),
        Axis::new("arch", ["x64", "arm64"]),
        Axis::new("features", ["default", "full", "minimal"]),
    ]
}

fn bench_generate(c: &mut Criterion) {
    let axes = axes();
    let exclusions = vec![
        CellPattern::new([("os", "windows"), ("arch", "arm64")]),
        CellPattern::new([("os", "freebsd"), ("python", "3.7")]),
    ];

    c.bench_function("generate_120_cells", |b| {
        b.iter(|| generate(black_box(&axes), black_box(&exclusions)))
    });
}

fn bench_run_all(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cells = generate(&axes(), &[]).unwrap();
    let project = tempfile::tempdir().unwrap();
    let mut settings = ExecutionSettings::new(project.path());
    settings.isolation = Isolation::Shared;
    let catalogue = Catalogue {
        setup: Vec::new(),
        steps: vec![
            Step::new("Build", "build ${{ matrix.os }}"),
            Step::new("Test", "test ${{ matrix.python }}"),
        ],
    };
    let orchestrator = Orchestrator::new(Arc::new(NoopRunner), catalogue, settings, 8);

    c.bench_function("run_all_noop_runner", |b| {
        b.to_async(&rt).iter(|| async {
            let _ = orchestrator
                .run_all(cells.clone(), CancellationToken::new())
                .await;
        });
    });
}

criterion_group!(benches, bench_generate, bench_run_all);
criterion_main!(benches);
