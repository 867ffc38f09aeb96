//! Command-line interface definitions for assetflow (§6).
//!
//! A single-command surface (no subcommands, unlike the teacher's
//! `apply`/`validate`/`completions` split): one module identifier, an
//! optional task name, and positional JSON arguments, since that is what
//! §6 specifies.

use clap::Parser;

/// The assetflow command line: run a registered workflow module.
#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    /// The module identifier to run: an `inventory`-registered namespace
    /// (standing in for the spec's "importable name or filesystem path",
    /// since this crate denies dynamic loading).
    pub module: String,

    /// An optional task name, followed by zero or more positional JSON
    /// arguments. If the first word names a task registered in `module`,
    /// it selects that task and the rest are arguments; otherwise the
    /// module's default task runs and every word here is an argument.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<String>,

    /// Suppress all action execution (§4.2 step 3).
    #[arg(short = 'd', long = "dry-run")]
    pub dry_run: bool,

    /// After execution, print the DOT rendering of the final graph.
    #[arg(short = 'g', long = "graph")]
    pub graph: bool,

    /// List the module's tasks (name plus doc summary) and exit without
    /// running anything.
    #[arg(short = 's', long = "show")]
    pub show: bool,

    /// Number of concurrent workers, `W >= 1`.
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    pub threads: usize,

    /// Enable debug-level diagnostics.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Splits `rest` into an optional task name and the JSON argument
    /// words, given the tasks actually registered under `module`.
    pub fn split_task_and_args<'a>(&'a self, registered: &[&str]) -> (Option<&'a str>, &'a [String]) {
        match self.rest.split_first() {
            Some((first, tail)) if registered.contains(&first.as_str()) => (Some(first.as_str()), tail),
            _ => (None, &self.rest[..]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with(rest: &[&str]) -> Cli {
        Cli {
            module: "demos".to_string(),
            rest: rest.iter().map(|s| s.to_string()).collect(),
            dry_run: false,
            graph: false,
            show: false,
            threads: 1,
            verbose: false,
        }
    }

    #[test]
    fn test_first_word_matches_registered_task() {
        let cli = cli_with(&["build", "1", "2"]);
        let (task, args) = cli.split_task_and_args(&["build", "clean"]);
        assert_eq!(task, Some("build"));
        assert_eq!(args, &["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_no_match_falls_back_to_default_task() {
        let cli = cli_with(&["1", "2"]);
        let (task, args) = cli.split_task_and_args(&["build", "clean"]);
        assert_eq!(task, None);
        assert_eq!(args, &["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_empty_rest() {
        let cli = cli_with(&[]);
        let (task, args) = cli.split_task_and_args(&["build"]);
        assert_eq!(task, None);
        assert!(args.is_empty());
    }
}
