//! Binary entrypoint that launches the MOA chat client.

use std::process::ExitCode;

use moa_chat::start_moa_chat;

/// Start the terminal chat client.
fn main() -> ExitCode {
    start_moa_chat::run()
}
