pub mod pantry;
pub mod recording;

pub use pantry::TestPantry;
pub use recording::{PutCall, RecordingStore, StoreProbe};

/// Install a test-friendly tracing subscriber. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
