//! External command capture

use std::process::Command;

use tracing::debug;

/// Run an external command and return its trimmed stdout.
///
/// Returns `None` if the binary cannot be spawned, exits non-zero, or
/// produces no output. Output is decoded lossily as UTF-8. Callers are
/// expected to treat `None` as "tool unavailable" and fall back to
/// their documented defaults.
pub fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = match Command::new(program).args(args).output() {
        Ok(output) => output,
        Err(err) => {
            debug!(program, error = %err, "failed to spawn command");
            return None;
        }
    };

    if !output.status.success() {
        debug!(program, code = ?output.status.code(), "command exited non-zero");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() { None } else { Some(stdout) }
}
