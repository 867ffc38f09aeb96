//! The bounded-concurrency executor (§4.4): drives a [`Graph`] to
//! completion, dispatching each Node's §4.2 algorithm on a worker pool of
//! size `W`, honoring cancellation, and detecting stuck (non-terminating)
//! graphs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::diagnostics::{DiagnosticSink, Level};
use crate::error::{EngineError, Result};
use crate::graph::Graph;
use crate::node::{Node, TaskKind};
use crate::shape::Label;

/// Options governing a single run (§6).
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Number of concurrent workers, `W >= 1`.
    pub workers: usize,
    /// If true, no action is ever invoked (§4.2 step 3).
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions { workers: 1, dry_run: false }
    }
}

/// The outcome of a run: the root's final verdict plus every Node's.
#[derive(Debug, Clone)]
pub struct Report {
    /// Per-task final readiness, in the reachable set's iteration order.
    pub verdicts: IndexMap<String, bool>,
    /// The root task's final readiness.
    pub root_ready: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Status {
    Pending,
    Running,
    Done,
}

/// Drives the graph with a bounded worker pool.
pub struct Executor {
    options: RunOptions,
}

impl Executor {
    /// Builds an executor. `options.workers` is clamped up to 1.
    pub fn new(options: RunOptions) -> Self {
        let workers = options.workers.max(1);
        Executor { options: RunOptions { workers, ..options } }
    }

    /// Runs every reachable Node to completion (or until cancelled),
    /// returning the final verdicts.
    pub async fn run(
        &self,
        graph: &Graph,
        sink: Arc<dyn DiagnosticSink>,
        cancelled: &AtomicBool,
    ) -> Result<Report> {
        let nodes = graph.reachable();
        let mut status: HashMap<String, Status> = nodes
            .values()
            .map(|n| {
                let s = if n.final_readiness().is_some() { Status::Done } else { Status::Pending };
                (n.name.clone(), s)
            })
            .collect();

        // Nodes pruned as already-ready at build time (§4.3) never pass
        // through `execute_one`, but §4.5 still requires a record once
        // their final readiness is known.
        for node in nodes.values() {
            if let Some(ready) = node.final_readiness() {
                let marker = if ready { "\u{2714}" } else { "\u{2716}" };
                sink.record(Level::Info, &node.name, format!("{marker} already ready at build time"));
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.options.workers));
        let mut in_flight: JoinSet<(String, bool)> = JoinSet::new();
        let total = nodes.len();
        let mut remaining: usize = status.values().filter(|s| **s != Status::Done).count();

        loop {
            if remaining == 0 {
                break;
            }

            if !cancelled.load(Ordering::SeqCst) {
                let mut dispatched_any = false;
                for node in nodes.values() {
                    if status[&node.name] != Status::Pending {
                        continue;
                    }
                    if !requirements_done(node, &status) {
                        continue;
                    }
                    let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                        continue;
                    };
                    status.insert(node.name.clone(), Status::Running);
                    dispatched_any = true;

                    let node = node.clone();
                    let dry_run = self.options.dry_run;
                    let sink = sink.clone();
                    in_flight.spawn(async move {
                        let _permit = permit;
                        let ready = execute_one(&node, dry_run, sink.as_ref()).await;
                        (node.name.clone(), ready)
                    });
                }
                let _ = dispatched_any;
            }

            if in_flight.is_empty() {
                // Nothing running and nothing dispatchable: either the
                // graph is cancelled mid-flight, or it is stuck.
                if cancelled.load(Ordering::SeqCst) {
                    break;
                }
                return Err(EngineError::Stuck(remaining));
            }

            let Some(joined) = in_flight.join_next().await else {
                return Err(EngineError::Stuck(remaining));
            };
            let (name, _ready) = joined.map_err(|e| EngineError::protocol("<worker>", e.to_string()))?;
            status.insert(name, Status::Done);
            remaining -= 1;
        }

        let _ = total;

        let mut verdicts = IndexMap::new();
        for node in nodes.values() {
            if let Some(ready) = node.final_readiness() {
                verdicts.insert(node.name.clone(), ready);
            }
        }
        let root_ready = graph.root.final_readiness().unwrap_or(false);

        Ok(Report { verdicts, root_ready })
    }
}

/// True once every requirement of `node` has a recorded verdict.
fn requirements_done(node: &Arc<Node>, status: &HashMap<String, Status>) -> bool {
    node.requirements().iter().all(|req| status.get(&req.name) == Some(&Status::Done))
}

/// Renders one ✔/✖ marker per requirement, labeled by position or key
/// (§4.2 step 2, §7's "Requirement-not-ready" taxonomy entry, §6's
/// readiness-dump marker convention).
fn requirement_breakdown(requirements: &crate::shape::Shape<Arc<Node>>) -> String {
    requirements
        .labeled()
        .map(|(label, req)| {
            let marker = if req.final_readiness() == Some(true) { "\u{2714}" } else { "\u{2716}" };
            match label {
                Label::None => format!("{marker} {}", req.name),
                _ => format!("{marker} {}{label}", req.name),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Implements §4.2 for a single Node, assuming its requirements (if any)
/// have already finished. Emits a diagnostic record for each step and
/// returns the final readiness verdict.
async fn execute_one(node: &Node, dry_run: bool, sink: &dyn DiagnosticSink) -> bool {
    match node.kind {
        TaskKind::External => {
            let ready = node.own_assets_ready();
            node.finalize(ready);
            if ready {
                sink.record(Level::Info, &node.name, "\u{2714} external, ready".to_string());
            } else {
                sink.record(Level::Warn, &node.name, "\u{2716} external, not ready".to_string());
            }
            ready
        }
        TaskKind::Collection => {
            let requirements = node.requirements();
            let ready = requirements.iter().all(|r| r.final_readiness() == Some(true));
            node.finalize(ready);
            let marker = if ready { "\u{2714}" } else { "\u{2716}" };
            sink.record(Level::Info, &node.name, format!("{marker} collection: {}", requirement_breakdown(&requirements)));
            ready
        }
        TaskKind::Basic => {
            if node.own_assets_ready() {
                node.finalize(true);
                sink.record(Level::Info, &node.name, "\u{2714} already ready".to_string());
                return true;
            }

            let requirements = node.requirements();
            let requirements_ready = requirements.iter().all(|r| r.final_readiness() == Some(true));
            if !requirements_ready {
                node.finalize(false);
                sink.record(
                    Level::Warn,
                    &node.name,
                    format!("\u{2716} requirements not ready, skipping action: {}", requirement_breakdown(&requirements)),
                );
                return false;
            }

            if dry_run {
                sink.record(Level::Info, &node.name, "dry run: action skipped".to_string());
                node.finalize(false);
                return false;
            }

            let action = node.action.lock().take();
            let ready = if let Some(action) = action {
                sink.record(Level::Info, &node.name, "running action".to_string());
                match action.await {
                    Ok(()) => {
                        let ready = node.own_assets_ready();
                        let marker = if ready { "\u{2714}" } else { "\u{2716}" };
                        sink.record(Level::Info, &node.name, format!("{marker} action completed, ready={ready}"));
                        ready
                    }
                    Err(err) => {
                        let ready = node.own_assets_ready();
                        sink.record(Level::Error, &node.name, format!("\u{2716} action failed: {err} (re-queried ready={ready})"));
                        ready
                    }
                }
            } else {
                // Action already taken by a previous (impossible under the
                // single-dispatch invariant, but defensive) run.
                node.own_assets_ready()
            };
            node.finalize(ready);
            ready
        }
    }
}
