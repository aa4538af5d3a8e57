//! Common utilities for CLI-based providers.
//!
//! Shared process plumbing for providers that drive a command-line tool
//! (currently the Azure CLI).

use crate::{ProviderError, Result, SpnError};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Output captured from a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` if the process was killed by a signal
    pub code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` if the command exited with status 0.
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Executes a command and captures its output, whatever the exit status.
///
/// # Errors
///
/// Returns [`SpnError::ProviderNotInstalled`] if the program cannot be found,
/// and [`SpnError::Io`] for other spawn failures.
pub async fn capture_command(
    program: &str,
    args: &[&str],
    env: &[(&str, &str)],
) -> Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    for (key, value) in env {
        cmd.env(key, value);
    }

    let output = cmd.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SpnError::ProviderNotInstalled(format!("{} command not found", program))
        } else {
            SpnError::Io(e)
        }
    })?;

    Ok(CommandOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Executes a command and returns stdout as a string.
///
/// # Errors
///
/// Returns [`SpnError::CommandFailed`] if the exit code is non-zero, plus the
/// spawn errors of [`capture_command`].
pub async fn run_command(program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<String> {
    let output = capture_command(program, args, env).await?;

    if !output.success() {
        return Err(SpnError::CommandFailed(format!(
            "{} failed with exit code {}: {}",
            program,
            output.code,
            output.stderr.trim()
        )));
    }

    Ok(output.stdout)
}

/// Checks if a command-line tool is available in PATH.
pub async fn check_command_exists(program: &str) -> Result<bool> {
    let status = Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(SpnError::Io)?;

    Ok(status.success())
}

/// Converts CLI stderr into a structured provider error.
///
/// The Azure CLI reports failures as `ERROR: (Code) message` or
/// `ERROR: message`; the parenthesised code, when present, becomes
/// [`ProviderError::code`].
///
/// ```
/// use spnmux::cli::provider_error_from_stderr;
///
/// let err = provider_error_from_stderr("ERROR: (Authorization_RequestDenied) Insufficient privileges.\n");
/// assert_eq!(err.code.as_deref(), Some("Authorization_RequestDenied"));
/// assert_eq!(err.message, "Insufficient privileges.");
/// ```
pub fn provider_error_from_stderr(stderr: &str) -> ProviderError {
    let line = stderr
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("command failed without output");

    let body = line.strip_prefix("ERROR:").unwrap_or(line).trim();

    if let Some(rest) = body.strip_prefix('(') {
        if let Some((code, message)) = rest.split_once(')') {
            if !code.is_empty() && !code.contains(' ') {
                return ProviderError::new(message.trim()).with_code(code);
            }
        }
    }

    ProviderError::new(body)
}

/// Status cache with time-to-live for login checks.
///
/// Checking the CLI login state means spawning a process, so the result is
/// kept for a short TTL (default 5 seconds).
///
/// Not thread-safe; wrap in `Arc<Mutex<StatusCache>>` for shared access.
///
/// ```
/// use spnmux::cli::StatusCache;
/// use std::time::Duration;
///
/// let mut cache = StatusCache::new(Duration::from_secs(5));
/// assert_eq!(cache.get(), None);
///
/// cache.set(true);
/// assert_eq!(cache.get(), Some(true));
/// ```
#[derive(Debug)]
pub struct StatusCache {
    authenticated: bool,
    timestamp: Option<Instant>,
    ttl: Duration,
}

impl StatusCache {
    /// Creates a new status cache with the specified TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            authenticated: false,
            timestamp: None,
            ttl,
        }
    }

    /// Gets the cached login status if still valid.
    pub fn get(&self) -> Option<bool> {
        match self.timestamp {
            Some(ts) if ts.elapsed() < self.ttl => Some(self.authenticated),
            _ => None,
        }
    }

    /// Sets the login status and updates the timestamp.
    pub fn set(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
        self.timestamp = Some(Instant::now());
    }

    /// Invalidates the cache.
    pub fn invalidate(&mut self) {
        self.timestamp = None;
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
