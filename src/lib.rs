//! Hierarchical classification trees.
//!
//! Records are routed through a chain of [`domain::NodeRule`]s, one per tree
//! level, into an arena-backed [`domain::ClassTree`] whose nodes inherit
//! attributes from their ancestors.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
