//! Workflow/task discovery (§6's "module identifier").
//!
//! Rust has no runtime `import` and this crate denies `unsafe_code`, so
//! dynamic module loading (the spec's "importable name or filesystem
//! path") is out. Instead, task functions register themselves at link
//! time via `inventory`, the same compile-time collection idiom
//! MrScripty-Pantograph uses for its port-option descriptors
//! (`crates/node-engine/src/port_options.rs`). A "module" is just a
//! namespace string a set of task builders share.

use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::node::Node;

/// A task builder: given the CLI's positional JSON arguments, constructs
/// the task's root `Node` (by calling [`crate::task::TaskDeclaration`]
/// constructors and `into_node`, possibly after building a subgraph).
pub type TaskBuilder = fn(&[serde_json::Value]) -> Result<Arc<Node>>;

/// One task function's registration, collected at link time.
pub struct RegisteredTask {
    /// The module namespace this task belongs to.
    pub module: &'static str,
    /// The task's name, as passed on the command line.
    pub name: &'static str,
    /// The first line of the task's documentation (§6 `-s`).
    pub summary: &'static str,
    /// True if this is the module's default task, used when the CLI is
    /// given a module but no task name.
    pub default: bool,
    /// Builds the task's `Node` from CLI arguments.
    pub build: TaskBuilder,
}

inventory::collect!(RegisteredTask);

/// Registers a task builder. Invoked via the [`crate::register_task`]
/// macro at crate-load time.
pub fn all() -> impl Iterator<Item = &'static RegisteredTask> {
    inventory::iter::<RegisteredTask>.into_iter()
}

/// Every task registered under `module`, in registration order.
pub fn tasks_in_module(module: &str) -> Vec<&'static RegisteredTask> {
    all().filter(|t| t.module == module).collect()
}

/// True if at least one task is registered under `module`.
pub fn module_exists(module: &str) -> bool {
    all().any(|t| t.module == module)
}

/// Looks up a specific task by module and name.
pub fn find(module: &str, task: &str) -> Result<&'static RegisteredTask> {
    tasks_in_module(module)
        .into_iter()
        .find(|t| t.name == task)
        .ok_or_else(|| EngineError::UnknownTask { module: module.to_string(), task: task.to_string() })
}

/// Looks up the module's default task (§6: root task name is optional).
pub fn find_default(module: &str) -> Result<&'static RegisteredTask> {
    let tasks = tasks_in_module(module);
    if tasks.is_empty() {
        return Err(EngineError::UnknownModule(module.to_string()));
    }
    tasks
        .into_iter()
        .find(|t| t.default)
        .ok_or_else(|| EngineError::protocol(module, "no default task registered for this module"))
}

/// Registers a `RegisteredTask` with `inventory`. Use at most once per
/// task function; mark exactly one task per module `default: true`.
#[macro_export]
macro_rules! register_task {
    ($module:expr, $name:expr, $summary:expr, $default:expr, $build:expr) => {
        $crate::inventory::submit! {
            $crate::registry::RegisteredTask {
                module: $module,
                name: $name,
                summary: $summary,
                default: $default,
                build: $build,
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_builder(_args: &[serde_json::Value]) -> Result<Arc<Node>> {
        crate::task::TaskDeclaration::external("stub_leaf", crate::shape::Shape::None)
    }

    crate::register_task!("registry_test_mod", "stub", "a stub task for tests", true, stub_builder);

    #[test]
    fn test_module_exists_after_registration() {
        assert!(module_exists("registry_test_mod"));
        assert!(!module_exists("no_such_module"));
    }

    #[test]
    fn test_find_returns_registered_task() {
        let task = find("registry_test_mod", "stub").unwrap();
        assert_eq!(task.name, "stub");
    }

    #[test]
    fn test_find_unknown_task_errors() {
        let err = find("registry_test_mod", "missing").unwrap_err();
        assert!(matches!(err, EngineError::UnknownTask { .. }));
    }

    #[test]
    fn test_find_default_returns_default_task() {
        let task = find_default("registry_test_mod").unwrap();
        assert!(task.default);
    }

    #[test]
    fn test_unknown_module_errors() {
        let err = find_default("absolutely_not_a_module").unwrap_err();
        assert!(matches!(err, EngineError::UnknownModule(_)));
    }
}
