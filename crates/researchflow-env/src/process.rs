//! ProcessRunner trait: the seam every child process goes through.
//!
//! Production code uses [`SystemRunner`]. Children run one at a time and are waited on before
//! the caller continues; there are no timeouts.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Once;
use std::time::Instant;

use researchflow_core::observability;

/// A fully described child process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Extra environment variables layered over the inherited environment.
    pub envs: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// Capture stdout/stderr instead of inheriting the terminal.
    pub capture: bool,
    /// The child owns the terminal: Ctrl-C goes to it and this process waits for its status.
    pub foreground: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            cwd: None,
            capture: false,
            foreground: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn foreground(mut self) -> Self {
        self.foreground = true;
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Value of an extra environment variable set on this spec.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Exit status plus captured output (empty when not captured).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout followed by stderr; some interpreters print `--version` to stderr.
    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Extension point for running child processes.
pub trait ProcessRunner {
    /// Run `spec` to completion. `Err` only when the process could not be started.
    fn run(&self, spec: &CommandSpec) -> std::io::Result<ProcessOutcome>;
}

/// Runs children with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<ProcessOutcome> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        for (k, v) in &spec.envs {
            cmd.env(k, v);
        }
        if let Some(ref dir) = spec.cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!("Running: {}", spec);
        let started = Instant::now();
        let outcome = if spec.capture {
            let out = cmd.stdin(Stdio::null()).output()?;
            ProcessOutcome {
                exit_code: exit_code(out.status),
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
            }
        } else {
            if spec.foreground {
                shield_interrupts();
            }
            let status = cmd.status()?;
            ProcessOutcome {
                exit_code: exit_code(status),
                ..Default::default()
            }
        };

        // Captured runs are probes; only steps that act on the environment are audited.
        if !spec.capture {
            observability::audit_process_exited(
                &spec.program_name(),
                &spec.args,
                outcome.exit_code,
                started.elapsed().as_millis() as u64,
            );
        }
        Ok(outcome)
    }
}

/// Keep this process alive on Ctrl-C. The terminal signals the whole process group, so a
/// foreground child still receives it and its exit status is what gets reported.
///
/// A handler rather than SIG_IGN: children get the default disposition back on exec.
fn shield_interrupts() {
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(|| {
        if let Err(e) = ctrlc::set_handler(|| tracing::debug!("Interrupt left to the child")) {
            tracing::warn!("Could not install Ctrl-C handler: {}", e);
        }
    });
}

/// Numeric exit code; a signal-terminated child maps to `128 + signal` on Unix.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}
