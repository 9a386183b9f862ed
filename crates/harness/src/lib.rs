pub mod desk;
pub mod notices;
pub mod tabs;

pub use desk::TestDesk;
pub use notices::RecordingNotifier;
pub use tabs::TestTabs;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per process, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
