use std::time::Instant;

/// Runs `f` and logs its wall time at debug level.
pub fn timed<L: std::fmt::Display, T, F: FnOnce() -> T>(label: L, f: F) -> T {
    let start = Instant::now();
    let result = f();
    tracing::debug!("{}: {:?}", label, start.elapsed());
    result
}
