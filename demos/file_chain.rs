//! A worked example of §8's file-chain scenarios: three tasks, `a`, `b`,
//! and `c`, each creating one file, each depending on the previous. The
//! parent directory is created idempotently ("already exists is OK",
//! §5) so re-running the chain after it has already succeeded leaves
//! every task immediately ready with no action invoked.
//!
//! Run with, e.g.:
//! ```sh
//! cargo run --example file_chain -- demos '"/tmp/assetflow-demo"'
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use assetflow::asset::Asset;
use assetflow::error::{EngineError, Result};
use assetflow::node::{ActionError, Node};
use assetflow::register_task;
use assetflow::shape::Shape;
use assetflow::task::TaskDeclaration;

fn base_dir(args: &[serde_json::Value]) -> Result<PathBuf> {
    match args.first() {
        Some(serde_json::Value::String(s)) => Ok(PathBuf::from(s)),
        Some(_) => Err(EngineError::InvalidArgument("expected a string base directory".to_string())),
        None => Ok(PathBuf::from("./.assetflow-demo")),
    }
}

fn ensure_parent_then_write(path: PathBuf, contents: &'static str) -> impl std::future::Future<Output = std::result::Result<(), ActionError>> {
    async move {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("create parent directory")?;
        }
        std::fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

fn task_a(dir: &Path) -> Result<Arc<Node>> {
    let path = dir.join("a.txt");
    let write_path = path.clone();
    TaskDeclaration::basic(
        "a",
        Shape::Scalar(Asset::path(path)),
        Shape::None,
        move || ensure_parent_then_write(write_path, "a\n"),
    )
}

fn task_b(dir: &Path, a: Arc<Node>) -> Result<Arc<Node>> {
    let path = dir.join("b.txt");
    let write_path = path.clone();
    TaskDeclaration::basic(
        "b",
        Shape::Scalar(Asset::path(path)),
        Shape::Scalar(a),
        move || ensure_parent_then_write(write_path, "b\n"),
    )
}

fn task_c(dir: &Path, b: Arc<Node>) -> Result<Arc<Node>> {
    let path = dir.join("c.txt");
    let write_path = path.clone();
    TaskDeclaration::basic(
        "c",
        Shape::Scalar(Asset::path(path)),
        Shape::Scalar(b),
        move || ensure_parent_then_write(write_path, "c\n"),
    )
}

/// Builds the full chain, rooted at `c`: `c` requires `b` requires `a`.
fn build_chain(args: &[serde_json::Value]) -> Result<Arc<Node>> {
    let dir = base_dir(args)?;
    let a = task_a(&dir)?;
    let b = task_b(&dir, a)?;
    task_c(&dir, b)
}

/// Builds just `a`, useful for exercising a single-task invocation.
fn build_a(args: &[serde_json::Value]) -> Result<Arc<Node>> {
    let dir = base_dir(args)?;
    task_a(&dir)
}

register_task!("demos", "chain", "Build files a, b, c in dependency order", true, build_chain);
register_task!("demos", "a", "Build only file a", false, build_a);

fn main() {
    if let Err(e) = assetflow::init_logging(false) {
        eprintln!("failed to initialize logging: {e}");
        std::process::exit(1);
    }
    println!("registered demo tasks: {:?}", assetflow::registry::tasks_in_module("demos").iter().map(|t| t.name).collect::<Vec<_>>());
    println!("run `assetflow demos` (or `assetflow demos chain <dir>`) to execute this workflow.");
}
