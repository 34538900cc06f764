//! Runtime detection and dependency installation
//!
//! This module provides:
//! - Availability probes for Node.js and the package managers
//! - Dependency installation through the chosen package manager

pub mod check;
pub mod install;

pub use check::{check_node, check_package_manager, check_runtimes, RuntimeInfo};
pub use install::install_dependencies;
