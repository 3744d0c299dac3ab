//! Common utilities for the experiment binary.
//!
//! - **`perf`**: platform-specific helpers for performance analysis,
//!   currently peak-resident-set-size measurement on Linux, used by the
//!   convergence experiment to report the memory cost of a workspace
//!   configuration.

pub mod perf;
