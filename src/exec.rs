//! Subprocess execution behind an injectable [`Executor`].
use std::io::{BufRead as _, BufReader, Read};
use std::process::{Command, Output, Stdio};
use std::thread;

use anyhow::{Context as _, Result, bail};

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs on behalf of features and resources.
///
/// The production implementation is [`SystemExecutor`]; tests substitute
/// recording fakes.
pub trait Executor: Send + Sync {
    /// Run a command and capture its output. Fails on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command and capture its output, whatever the exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with extra environment variables, streaming its output
    /// to the debug log line by line.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    /// The error carries the collected standard error.
    fn run_logged(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<()>;

    /// Whether `program` is found on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let label = command_label(program, args);
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            bail!(
                "{label} failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        tracing::debug!("running: {}", command_label(program, args));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_logged(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<()> {
        let label = command_label(program, args);
        tracing::debug!("running: {label}");

        let mut child = Command::new(program)
            .args(args)
            .envs(env.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute: {label}"))?;

        let stdout = child.stdout.take().context("child stdout was not captured")?;
        let stderr = child.stderr.take().context("child stderr was not captured")?;
        let out_tag = program.to_string();
        let err_tag = program.to_string();
        let out_reader = thread::spawn(move || stream_lines(stdout, &out_tag, false));
        let err_reader = thread::spawn(move || stream_lines(stderr, &err_tag, true));

        let status = child
            .wait()
            .with_context(|| format!("waiting for {program}"))?;

        // Readers finish once the pipes close; lines may trail the exit.
        let _ = out_reader.join();
        let collected = err_reader.join().unwrap_or_default();

        if !status.success() {
            bail!(
                "{program} failed (exit {}): {}",
                status.code().unwrap_or(-1),
                collected.trim()
            );
        }
        Ok(())
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Forward each line of `pipe` to the debug log, optionally collecting it.
fn stream_lines(pipe: impl Read, tag: &str, collect: bool) -> String {
    let mut collected = String::new();
    for line in BufReader::new(pipe).lines().map_while(std::result::Result::ok) {
        tracing::debug!("[{tag}] {line}");
        if collect {
            collected.push_str(&line);
            collected.push('\n');
        }
    }
    collected
}

/// `program arg1 arg2`, for logs and error messages.
#[must_use]
pub fn command_label(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}
