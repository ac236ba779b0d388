//! Startup helpers for the MOA chat client.
//!
//! Loads configuration, opens the `SQLite` blob store and runs the terminal
//! front end on a single-threaded runtime.

use std::process::ExitCode;

use tokio::io::BufReader;

use crate::chat::core::config::ChatConfig;
use crate::chat::core::errors::ChatResult;
use crate::chat::reply::responder::MockResponder;
use crate::chat::session::ChatSession;
use crate::chat::storage::blob_store::{BlobStore, MemoryBlobStore, SqliteBlobStore};
use crate::chat::storage::persisted::PersistedStore;
use crate::chat::store::state::StoreDefaults;
use crate::repl;

/// Initialize tracing to stderr, honoring `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the chat client (used by the `moa` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` when the user quits, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();

    tracing::info!("Starting MOA chat v{}", env!("CARGO_PKG_VERSION"));

    let config = match ChatConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let mut session = match build_session(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to set up chat: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    if let Err(e) = rt.block_on(repl::run(&mut session, stdin, &mut stdout)) {
        tracing::error!("Chat error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Open the configured backend, falling back to memory when it is unusable.
#[must_use]
pub fn open_backend(config: &ChatConfig) -> Box<dyn BlobStore> {
    match SqliteBlobStore::open(&config.storage) {
        Ok(store) => {
            tracing::info!("Storage: {}", config.storage.sqlite_path.display());
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!(
                "Could not open {}, history will not be saved: {e}",
                config.storage.sqlite_path.display()
            );
            Box::new(MemoryBlobStore::new())
        }
    }
}

/// Build a session from configuration without starting the loop.
///
/// # Errors
/// Returns an error if the configuration fails validation.
pub fn build_session(
    config: &ChatConfig,
) -> ChatResult<ChatSession<Box<dyn BlobStore>, MockResponder>> {
    config.validate()?;
    let defaults = StoreDefaults::from_config(&config.defaults)?;
    let store = PersistedStore::load(open_backend(config), config.storage.slot.clone(), defaults);

    let responder = config
        .reply
        .seed
        .map_or_else(MockResponder::new, MockResponder::with_seed);

    Ok(ChatSession::new(store, responder).with_reply_delay(config.reply.delay()))
}
