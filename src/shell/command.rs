//! Process execution.
//!
//! Two entry points with different completion contracts:
//! [`execute_captured`] waits for the process and returns its output,
//! [`spawn_shell`] starts a shell command line and returns immediately.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use super::platform::{detect_shell, Platform};

/// Result of executing a captured command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or never spawned).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }
}

/// Complete environment for a child process.
///
/// Keys and values are OS strings so variables that are not valid
/// Unicode are passed through untouched.
pub type EnvMap = HashMap<OsString, OsString>;

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Complete environment for the child. When `None` the parent's
    /// environment is inherited unchanged.
    pub env: Option<EnvMap>,
}

impl CommandOptions {
    fn apply(&self, cmd: &mut Command) {
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        if let Some(env) = &self.env {
            cmd.env_clear();
            cmd.envs(env);
        }
    }
}

/// Whether `program` has to go through `cmd /C` on `platform`.
///
/// Only `.cmd`/`.bat` shims and bare names without an extension (which
/// `cmd` resolves through `PATHEXT`) qualify. Everything else is spawned
/// directly so paths with spaces and multi-line arguments reach the child
/// unchanged.
pub fn needs_command_shell(program: &str, platform: Platform) -> bool {
    if platform != Platform::Windows {
        return false;
    }
    let lower = program.to_ascii_lowercase();
    if lower.ends_with(".cmd") || lower.ends_with(".bat") {
        return true;
    }
    let bare = !program.contains(['\\', '/']);
    bare && Path::new(program).extension().is_none()
}

/// Run a program with arguments, wait for it, and capture its output.
///
/// Never returns an error: a spawn failure (for example a program that
/// does not exist) becomes a failed result whose stderr is the OS error
/// message, so callers handle both failure kinds the same way.
pub fn execute_captured(program: &str, args: &[String], options: &CommandOptions) -> CommandResult {
    let start = Instant::now();

    let mut cmd = if needs_command_shell(program, Platform::current()) {
        let shell = detect_shell();
        let mut cmd = Command::new(shell.executable);
        cmd.arg(shell.command_flag).arg(program).args(args);
        cmd
    } else {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    };

    options.apply(&mut cmd);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let output = match cmd.output() {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("Failed to spawn {}: {}", program, e);
            return CommandResult::failure(
                None,
                String::new(),
                format!("spawn {} failed: {}", program, e),
                start.elapsed(),
            );
        }
    };

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if output.status.success() {
        CommandResult::success(stdout, stderr, duration)
    } else {
        CommandResult::failure(output.status.code(), stdout, stderr, duration)
    }
}

/// Start a command line in the platform shell with inherited stdio.
///
/// Returns as soon as the child is spawned.
pub fn spawn_shell(command_line: &str, options: &CommandOptions) -> std::io::Result<Child> {
    let shell = detect_shell();

    let mut cmd = Command::new(&shell.executable);
    cmd.arg(shell.command_flag);
    cmd.arg(command_line);
    options.apply(&mut cmd);
    cmd.stdin(Stdio::inherit());
    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    cmd.spawn()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn windows_shims_and_bare_names_go_through_cmd() {
        assert!(needs_command_shell(
            r"C:\Users\me\AppData\Roaming\npm\fluxloop.CMD",
            Platform::Windows
        ));
        assert!(needs_command_shell(r"C:\tools\setup.bat", Platform::Windows));
        assert!(needs_command_shell("fluxloop", Platform::Windows));
    }

    #[test]
    fn windows_executables_are_spawned_directly() {
        assert!(!needs_command_shell(
            r"C:\Program Files\Flux\.venv\Scripts\python.exe",
            Platform::Windows
        ));
        assert!(!needs_command_shell("python.exe", Platform::Windows));
        assert!(!needs_command_shell(r"C:\Flux Tools\fluxloop", Platform::Windows));
    }

    #[test]
    fn posix_never_uses_a_shell_for_captured_runs() {
        assert!(!needs_command_shell("fluxloop", Platform::Posix));
        assert!(!needs_command_shell("/opt/tools/run.bat", Platform::Posix));
    }

    #[cfg(unix)]
    #[test]
    fn captured_multiline_argument_reaches_child_intact() {
        let result = execute_captured(
            "sh",
            &args(&["-c", "printf '%s' \"$1\"", "sh", "first line\nsecond line"]),
            &CommandOptions::default(),
        );
        assert!(result.success);
        assert_eq!(result.stdout, "first line\nsecond line");
    }

    #[cfg(unix)]
    #[test]
    fn captured_success_collects_stdout() {
        let result = execute_captured("echo", &args(&["hello"]), &CommandOptions::default());
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn captured_non_zero_exit_is_failure() {
        let result = execute_captured(
            "sh",
            &args(&["-c", "printf oops >&2; exit 3"]),
            &CommandOptions::default(),
        );
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr, "oops");
    }

    #[test]
    fn captured_spawn_failure_is_failure_result() {
        let result = execute_captured(
            "definitely-not-a-real-program-7f3a",
            &[],
            &CommandOptions::default(),
        );
        assert!(!result.success);
        assert!(result.exit_code.is_none() || result.exit_code != Some(0));
        assert!(!result.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn captured_uses_explicit_environment() {
        let mut env = EnvMap::new();
        env.insert("PATH".into(), "/usr/bin:/bin".into());
        env.insert("FLUX_TEST_VAR".into(), "value-42".into());
        let options = CommandOptions {
            env: Some(env),
            ..Default::default()
        };
        let result = execute_captured("sh", &args(&["-c", "echo $FLUX_TEST_VAR"]), &options);
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "value-42");
    }

    #[cfg(unix)]
    #[test]
    fn captured_respects_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        let result = execute_captured("pwd", &[], &options);
        assert!(result.success);
        let reported = std::path::PathBuf::from(result.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn spawn_shell_returns_running_child() {
        let mut child = spawn_shell("exit 0", &CommandOptions::default()).unwrap();
        let status = child.wait().unwrap();
        assert!(status.success());
    }
}
