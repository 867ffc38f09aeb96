//! assetflow: an in-process, asset-driven workflow engine. Makes assets
//! ready by running tasks in dependency order, skipping work already done.

pub mod asset;
pub mod cli;
pub mod diagnostics;
pub mod dot;
pub mod error;
pub mod executor;
pub mod graph;
pub mod node;
pub mod registry;
pub mod shape;
pub mod task;

pub use error::{EngineError, Result};

/// Re-exported so the [`register_task`] macro can refer to
/// `$crate::inventory` without requiring callers to depend on the
/// `inventory` crate directly.
pub use inventory;

use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::FmtSubscriber;

/// Sets up the global `tracing` subscriber at the given verbosity.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(filter).finish())
        .map_err(|e| EngineError::protocol("<logging>", e.to_string()))
}

/// Builds a graph from `root` and drives it with the given options,
/// returning the execution report (§6's programmatic entry point).
pub async fn run(
    root: Arc<node::Node>,
    options: executor::RunOptions,
    sink: Arc<dyn diagnostics::DiagnosticSink>,
    cancelled: &std::sync::atomic::AtomicBool,
) -> Result<executor::Report> {
    let graph = graph::Graph::build(root);
    let executor = executor::Executor::new(options);
    executor.run(&graph, sink, cancelled).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::diagnostics::NullDiagnosticSink;
    use crate::shape::Shape;
    use crate::task::TaskDeclaration;
    use std::sync::atomic::AtomicBool;

    #[tokio::test]
    async fn test_run_end_to_end() {
        let ext = TaskDeclaration::external("e2e", Shape::Scalar(Asset::new((), || true))).unwrap();
        let cancelled = AtomicBool::new(false);
        let report = run(ext, executor::RunOptions::default(), Arc::new(NullDiagnosticSink), &cancelled)
            .await
            .unwrap();
        assert!(report.root_ready);
    }
}
