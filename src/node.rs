//! The runtime Node (§3): the handle produced by invoking a task function.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::asset::Asset;
use crate::shape::Shape;

/// The error type an action body may fail with (§7, "action errors").
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// A task's action body: constructed eagerly (the `async` block captures
/// its environment immediately) but polled — and therefore actually
/// run — only if the executor decides to run it (§4.2 step 3). This is
/// what gives the engine "the action is never invoked" for free: an
/// unpolled future simply never executes its body.
pub type Action = Pin<Box<dyn Future<Output = Result<(), ActionError>> + Send>>;

/// Which of the three task kinds (§3) a `Node` represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TaskKind {
    /// Has assets, requirements (may be empty), and an action.
    Basic,
    /// Has requirements only; readiness is their conjunction.
    Collection,
    /// Has assets only; never executed.
    External,
}

/// The runtime representation of an invoked task (§3).
///
/// `requirements` is cleared by the graph builder once a Node's own
/// readiness is established at build time (§4.2 step 1, §4.3 pruning).
/// `final_readiness` is set exactly once — either by the graph builder
/// for Nodes ready at build time, or by the executor once it has
/// determined (and, for `Basic`, possibly run) the Node.
pub struct Node {
    /// The task's unique identity (§3 invariants).
    pub name: String,
    /// Which of the three kinds this Node is.
    pub kind: TaskKind,
    /// The task's own assets, possibly empty (`Collection` always empty).
    pub(crate) assets: Shape<Asset>,
    /// The task's requirements, possibly empty, and possibly cleared once
    /// pruned.
    pub(crate) requirements: RwLock<Shape<Arc<Node>>>,
    /// The action body, taken (consumed) at most once by the executor.
    /// `None` for `Collection` and `External` kinds.
    pub(crate) action: Mutex<Option<Action>>,
    /// The one-shot final readiness verdict.
    pub(crate) final_readiness: RwLock<Option<bool>>,
}

impl Node {
    /// Evaluates this Node's own readiness right now, ignoring any
    /// previously recorded final verdict. For `Basic`/`External` this is
    /// the conjunction of asset readiness; for `Collection` it is the
    /// conjunction of requirement *final* readiness (falling back to a
    /// live check for requirements not yet finalized, which only happens
    /// while graph construction is still walking the tree).
    pub fn own_assets_ready(&self) -> bool {
        self.assets.iter().all(|asset| asset.ready())
    }

    /// The final readiness verdict, if one has been recorded yet.
    pub fn final_readiness(&self) -> Option<bool> {
        *self.final_readiness.read()
    }

    /// Records the final readiness verdict. Only ever called once per
    /// Node, by whichever of graph-build-time pruning or the executor
    /// reaches this Node first.
    pub(crate) fn finalize(&self, ready: bool) {
        *self.final_readiness.write() = Some(ready);
    }

    /// A snapshot of the current requirements shape (cheap: `Arc<Node>`
    /// clones are reference-count bumps).
    pub fn requirements(&self) -> Shape<Arc<Node>> {
        self.requirements.read().clone()
    }

    /// The task's own assets.
    pub fn assets(&self) -> &Shape<Asset> {
        &self.assets
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("final_readiness", &self.final_readiness())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, ready: bool) -> Arc<Node> {
        Arc::new(Node {
            name: name.to_string(),
            kind: TaskKind::External,
            assets: Shape::Scalar(Asset::new((), move || ready)),
            requirements: RwLock::new(Shape::None),
            action: Mutex::new(None),
            final_readiness: RwLock::new(None),
        })
    }

    #[test]
    fn test_own_assets_ready() {
        assert!(leaf("a", true).own_assets_ready());
        assert!(!leaf("b", false).own_assets_ready());
    }

    #[test]
    fn test_finalize_is_one_shot_observable() {
        let node = leaf("c", true);
        assert_eq!(node.final_readiness(), None);
        node.finalize(true);
        assert_eq!(node.final_readiness(), Some(true));
    }

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::Basic.to_string(), "basic");
        assert_eq!(TaskKind::External.to_string(), "external");
    }
}
