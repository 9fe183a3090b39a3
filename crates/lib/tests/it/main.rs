/*! Integration tests for Polylog.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - store: Tests for the Store struct (writes, reads, reopen, failures)
 * - iterator: Tests for prefix and recursive iteration
 * - index: Tests for fork detection and causal supersession across writers
 * - replication: Tests for replication between stores and over transports
 * - log: Tests for log backends and persistence
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("polylog=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod index;
mod iterator;
mod log;
