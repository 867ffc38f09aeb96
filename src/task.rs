//! The task declaration protocol (§4.1), rendered as a tagged enum.
//!
//! Per the Design Notes (§9), a language without generators represents the
//! staged yield contract as "a callable returning a value of a tagged
//! variant with fields `name`, `assets`, `requirements`, and `action`".
//! `TaskDeclaration` is exactly that variant; a task function is simply
//! `fn(Args) -> assetflow::Result<Arc<Node>>` that builds one and calls
//! [`TaskDeclaration::into_node`].
//!
//! Mirrors the exhaustive-match, one-variant-per-kind shape of the
//! teacher's `TaskDefinition` enum (`src/task/mod.rs`), generalized from a
//! single-variant enum to the engine's three task kinds.

use std::future::Future;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::asset::Asset;
use crate::error::{EngineError, Result};
use crate::node::{Action, ActionError, Node, TaskKind};
use crate::shape::Shape;

/// A staged task declaration (§4.1): exactly one of the three kinds, each
/// carrying only the fields its stage contract yields.
pub enum TaskDeclaration {
    /// Stage 1: name. Stage 2: assets. Stage 3: requirements, then action.
    Basic {
        /// The task's unique name.
        name: String,
        /// The task's own assets.
        assets: Shape<Asset>,
        /// The task's requirements.
        requirements: Shape<Arc<Node>>,
        /// The action body, run only if requirements are ready and not
        /// in dry-run mode (§4.2).
        action: Action,
    },
    /// Stage 1: name. Stage 2: requirements. No assets, no action.
    Collection {
        /// The task's unique name.
        name: String,
        /// The task's requirements; readiness is their conjunction.
        requirements: Shape<Arc<Node>>,
    },
    /// Stage 1: name. Stage 2: assets. No requirements, no action.
    External {
        /// The task's unique name.
        name: String,
        /// The task's own assets; readiness is their conjunction.
        assets: Shape<Asset>,
    },
}

impl TaskDeclaration {
    /// Consumes the declaration, validating the staged protocol and
    /// producing the runtime `Node`. The only protocol violation this
    /// crate can detect mechanically is an empty name; the kind-specific
    /// field shape is enforced by the type system (§3 invariants).
    pub fn into_node(self) -> Result<Arc<Node>> {
        let name = match &self {
            TaskDeclaration::Basic { name, .. }
            | TaskDeclaration::Collection { name, .. }
            | TaskDeclaration::External { name, .. } => name.clone(),
        };
        if name.trim().is_empty() {
            return Err(EngineError::protocol("<unnamed>", "stage 1 yielded an empty task name"));
        }

        let node = match self {
            TaskDeclaration::Basic { name, assets, requirements, action } => Node {
                name,
                kind: TaskKind::Basic,
                assets,
                requirements: RwLock::new(requirements),
                action: Mutex::new(Some(action)),
                final_readiness: RwLock::new(None),
            },
            TaskDeclaration::Collection { name, requirements } => Node {
                name,
                kind: TaskKind::Collection,
                assets: Shape::None,
                requirements: RwLock::new(requirements),
                action: Mutex::new(None),
                final_readiness: RwLock::new(None),
            },
            TaskDeclaration::External { name, assets } => Node {
                name,
                kind: TaskKind::External,
                assets,
                requirements: RwLock::new(Shape::None),
                action: Mutex::new(None),
                final_readiness: RwLock::new(None),
            },
        };

        Ok(Arc::new(node))
    }

    /// Smart constructor for a `Basic` task: builds the declaration and
    /// immediately validates it into a `Node`.
    pub fn basic<F, Fut>(
        name: impl Into<String>,
        assets: Shape<Asset>,
        requirements: Shape<Arc<Node>>,
        action: F,
    ) -> Result<Arc<Node>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<(), ActionError>> + Send + 'static,
    {
        TaskDeclaration::Basic {
            name: name.into(),
            assets,
            requirements,
            action: Box::pin(async move { action().await }),
        }
        .into_node()
    }

    /// Smart constructor for a `Collection` task.
    pub fn collection(name: impl Into<String>, requirements: Shape<Arc<Node>>) -> Result<Arc<Node>> {
        TaskDeclaration::Collection { name: name.into(), requirements }.into_node()
    }

    /// Smart constructor for an `External` task.
    pub fn external(name: impl Into<String>, assets: Shape<Asset>) -> Result<Arc<Node>> {
        TaskDeclaration::External { name: name.into(), assets }.into_node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_validates_name() {
        let err = TaskDeclaration::basic("   ", Shape::None, Shape::None, || async { Ok(()) })
            .unwrap_err();
        assert!(matches!(err, EngineError::Protocol { .. }));
    }

    #[test]
    fn test_basic_builds_node() {
        let node = TaskDeclaration::basic(
            "a",
            Shape::Scalar(Asset::new((), || true)),
            Shape::None,
            || async { Ok(()) },
        )
        .unwrap();
        assert_eq!(node.name, "a");
        assert_eq!(node.kind, TaskKind::Basic);
        assert!(node.own_assets_ready());
    }

    #[test]
    fn test_collection_has_no_assets() {
        let node = TaskDeclaration::collection("group", Shape::None).unwrap();
        assert_eq!(node.kind, TaskKind::Collection);
        assert!(node.assets().is_empty());
    }

    #[test]
    fn test_external_has_no_requirements() {
        let node =
            TaskDeclaration::external("ext", Shape::Scalar(Asset::new((), || false))).unwrap();
        assert_eq!(node.kind, TaskKind::External);
        assert!(node.requirements().is_empty());
    }
}
