//! File and stdin input for the CLI.
//!
//! A process-wide latch permits at most one stdin (`-`) read per
//! invocation: two arguments both claiming `-` would silently split one
//! piped document. Piped reads are bounded by an idle timeout that resets
//! on every chunk, so a stalled producer fails fast instead of hanging the
//! command.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bridge_core::BridgeError;
use tokio::io::AsyncReadExt;

/// Idle timeout between stdin chunks.
const STDIN_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

static STDIN_CONSUMED: AtomicBool = AtomicBool::new(false);

/// Release the stdin latch (between CLI runs in one process, i.e. tests).
pub fn reset_stdin_latch() {
    STDIN_CONSUMED.store(false, Ordering::SeqCst);
}

/// Read an input argument: a file path, or `-` for stdin.
pub async fn read_input(path_or_dash: &str) -> Result<String, BridgeError> {
    if path_or_dash == "-" {
        read_stdin().await
    } else {
        tokio::fs::read_to_string(path_or_dash)
            .await
            .map_err(|e| BridgeError::unknown(format!("cannot read '{path_or_dash}': {e}")))
    }
}

async fn read_stdin() -> Result<String, BridgeError> {
    if STDIN_CONSUMED.swap(true, Ordering::SeqCst) {
        return Err(BridgeError::unknown(
            "stdin was already consumed by another argument",
        ));
    }

    let mut stdin = tokio::io::stdin();
    let mut out = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let read = tokio::time::timeout(STDIN_IDLE_TIMEOUT, stdin.read(&mut buf))
            .await
            .map_err(|_| BridgeError::unknown("timed out waiting for input on stdin"))?
            .map_err(|e| BridgeError::unknown(format!("stdin read failed: {e}")))?;
        if read == 0 {
            break;
        }
        out.extend_from_slice(&buf[..read]);
    }
    String::from_utf8(out).map_err(|_| BridgeError::unknown("stdin input is not valid UTF-8"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
