//! Entry point for integration tests.
//!
//! Note: `cargo` "integration tests" mean "tests as the library consumer
//! uses the library", not e.g. "tests using remote resources".
//!
//! # Debugging a fingerprinting run
//!
//! Tests that exercise the index or fragment assembly _should_ include a
//! call to [`tracing::setup`]. This configures the test to emit tracing
//! data to the terminal, filterable via `RUST_LOG` when running `cargo
//! test -- --nocapture`.

mod tracing;

mod index_build;
mod ordering_invariance;
mod report_summary;

/// Include the contents of the file at the provided path, normalizing
/// `\r\n` to `\n` so fixtures are stable across checkouts.
#[macro_export]
macro_rules! include_str_lf {
    ($path:expr) => {
        include_str!($path).replace("\r\n", "\n")
    };
}
