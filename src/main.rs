use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use assetflow::cli::Cli;
use assetflow::diagnostics::{TracingDiagnosticSink, VecDiagnosticSink};
use assetflow::executor::RunOptions;
use assetflow::{dot, registry};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = assetflow::init_logging(cli.verbose) {
        eprintln!("failed to initialize logging: {e}");
        process::exit(1);
    }

    if let Err(e) = run_cli(cli) {
        error!("{e}");
        process::exit(1);
    }
}

fn run_cli(cli: Cli) -> assetflow::Result<()> {
    if cli.show {
        return show_module(&cli.module);
    }

    let registered: Vec<&str> = registry::tasks_in_module(&cli.module).iter().map(|t| t.name).collect();
    let (task_name, arg_words) = cli.split_task_and_args(&registered);

    let task = match task_name {
        Some(name) => registry::find(&cli.module, name)?,
        None => registry::find_default(&cli.module)?,
    };

    let args = parse_json_args(arg_words)?;
    let root = (task.build)(&args)?;

    let sink: Arc<dyn assetflow::diagnostics::DiagnosticSink> = Arc::new(TracingDiagnosticSink);
    let summary = Arc::new(VecDiagnosticSink::new());
    let tee = Arc::new(assetflow::diagnostics::TeeDiagnosticSink::new(sink, summary));

    let options = RunOptions { workers: cli.threads.max(1), dry_run: cli.dry_run };

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let graph = assetflow::graph::Graph::build(root);
    let report = runtime.block_on(async {
        let cancelled = install_cancellation();
        let executor = assetflow::executor::Executor::new(options);
        executor.run(&graph, tee, cancelled.as_ref()).await
    })?;

    if cli.graph {
        println!("{}", dot::render_dot(&graph.reachable()));
    }

    tracing::info!("workflow '{}' finished: ready={}", cli.module, report.root_ready);

    Ok(())
}

/// Positional arguments are parsed as JSON values (§6). Task identity in
/// this engine is the explicit `taskname` string, not a function+args
/// pair, so unlike the staged-generator original there is no need to
/// coerce maps/sequences into hashable dedup keys here.
fn parse_json_args(words: &[String]) -> assetflow::Result<Vec<serde_json::Value>> {
    words.iter().map(|w| serde_json::from_str(w).map_err(assetflow::EngineError::from)).collect()
}

fn show_module(module: &str) -> assetflow::Result<()> {
    let tasks = registry::tasks_in_module(module);
    if tasks.is_empty() {
        return Err(assetflow::EngineError::UnknownModule(module.to_string()));
    }
    for task in tasks {
        println!("{}\t{}", task.name, task.summary);
    }
    Ok(())
}

/// Installs a Ctrl-C handler that flips a shared flag; the executor stops
/// dispatching new work but lets in-flight actions finish (§5). Must run
/// inside a tokio context.
fn install_cancellation() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handler_flag.store(true, Ordering::SeqCst);
        }
    });
    flag
}
