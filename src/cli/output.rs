//! Terminal output for classification results
//!
//! Results (trees, leaf paths, flattened nodes, config) go to stdout
//! uncolored so they can be piped; diagnostics go to stderr. Colors follow
//! NO_COLOR, CLICOLOR and CLICOLOR_FORCE.

use colored::Colorize;
use itertools::Itertools;

/// Error shown before exiting with a non-zero code (stderr)
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Non-fatal problem with the input, e.g. records left unrouted (stderr)
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// File written by a command, e.g. `config init`
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Indented line under a [`header`]
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Result line: a rendered tree, a leaf path or a flattened node
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Unrouted record positions as a single warning.
pub fn skipped(positions: &[usize]) {
    if positions.is_empty() {
        return;
    }
    warning(&format!(
        "{} record(s) not routed, positions: {}",
        positions.len(),
        positions.iter().join(", ")
    ));
}
