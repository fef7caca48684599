//! Hand text to the system clipboard through an external command
//! (`pbcopy`, `wl-copy`, `xclip -selection clipboard`, `clip.exe`, ...).
//!
//! A failed copy never changes any state; callers report it and move on.
use std::io::Write;
use std::process::{Command, Stdio};

use tracing::warn;

use crate::{KitError, Result};

/// Platform default clipboard command, if there is an obvious one.
pub fn default_command() -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        Some("pbcopy")
    } else if cfg!(target_os = "windows") {
        Some("clip")
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        Some("wl-copy")
    } else if std::env::var_os("DISPLAY").is_some() {
        Some("xclip -selection clipboard")
    } else {
        None
    }
}

/// Pipe `text` into `command` (split on whitespace; no shell involved).
pub fn copy(text: &str, command: &str) -> Result<()> {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(KitError::Clipboard("no clipboard command configured".into()));
    };
    let result = run(program, parts.collect(), text);
    if let Err(e) = &result {
        warn!(command, error = %e, "clipboard copy failed");
    }
    result
}

fn run(program: &str, args: Vec<&str>, text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| KitError::Clipboard(format!("cannot run `{program}`: {e}")))?;
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            return Err(KitError::Clipboard(e.to_string()));
        }
    }
    let status = child.wait().map_err(|e| KitError::Clipboard(e.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        Err(KitError::Clipboard(format!("`{program}` exited with {status}")))
    }
}

#[cfg(test)]
mod clipboard_tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        assert!(matches!(copy("x", "   "), Err(KitError::Clipboard(_))));
    }

    #[test]
    fn missing_program_is_a_clipboard_error() {
        let e = copy("x", "definitely-not-a-clipboard-tool-4711").unwrap_err();
        assert!(matches!(e, KitError::Clipboard(_)));
    }

    #[cfg(unix)]
    #[test]
    fn accepting_command_succeeds() {
        assert!(copy("A\t2\t8.00", "cat").is_ok());
        assert!(matches!(copy("x", "false"), Err(KitError::Clipboard(_))));
    }

    #[cfg(unix)]
    #[test]
    fn command_that_ignores_input_is_reported() {
        // More than a pipe buffer, so the write hits a closed pipe.
        let text = "A\t2\t8.00\n".repeat(200_000);
        assert!(matches!(copy(&text, "true"), Err(KitError::Clipboard(_))));
    }
}
