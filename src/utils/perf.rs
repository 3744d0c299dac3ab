//! Performance measurement utilities for memory analysis.
//!
//! Peak memory is read from /proc/self/status, which is the most reliable
//! per-process statistic available without external tooling. On other
//! platforms the probe degrades to zero rather than failing the run.

/// Reads the peak resident set size (VmPeak) in kilobytes on Linux.
///
/// Returns 0 when the value cannot be read.
#[cfg(target_os = "linux")]
pub fn peak_rss_kb() -> u64 {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return 0;
    };
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmPeak:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// A dummy implementation for non-Linux platforms to ensure the code
/// compiles.
#[cfg(not(target_os = "linux"))]
pub fn peak_rss_kb() -> u64 {
    use std::sync::Once;
    static WARN_ONCE: Once = Once::new();
    WARN_ONCE.call_once(|| {
        log::warn!("Peak RSS measurement is only supported on Linux; returning 0.");
    });
    0
}
