//! Cross-format integration tests for `blood-rs`

use std::sync::Once;

mod archive;
mod atlas;
mod level;

static INIT: Once = Once::new();

/// Initialize logger with default level set to info if RUST_LOG is not set
pub(crate) fn init_logs() {
	INIT.call_once(|| {
		env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	});
}
