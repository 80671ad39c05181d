//! Pre-launch checks.
//!
//! A process manager cannot stop an operator from writing a spec whose
//! interpreter or working directory is missing; the OS reports that only at
//! spawn time with a bare `ENOENT`. These checks surface the same problems
//! ahead of time with the offending field named. Paths are checked exactly
//! as [`LaunchCommand::resolve`](super::LaunchCommand::resolve) hands them
//! to the OS.

use std::ffi::OsStr;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{find_on_path, is_bare_command, is_executable, locate_script, relative_to, resolved_cwd};
use crate::config::AppLaunchSpec;

/// One problem that would stop the app from launching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// `cwd` does not exist.
    MissingWorkingDirectory(PathBuf),
    /// `cwd` exists but is not a directory.
    WorkingDirectoryNotADirectory(PathBuf),
    /// `cwd` could not be inspected.
    InaccessibleWorkingDirectory {
        /// The directory as it would be passed to the OS.
        path: PathBuf,
        /// The OS error.
        reason: String,
    },
    /// `interpreter` is neither an existing file nor found on `PATH`.
    MissingInterpreter(PathBuf),
    /// `script` cannot be found.
    UnresolvableScript(String),
    /// The program file exists but has no execute permission.
    NotExecutable(PathBuf),
    /// `args` cannot be split.
    InvalidArgs(String),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingWorkingDirectory(path) => {
                write!(f, "working directory {} does not exist", path.display())
            },
            Self::WorkingDirectoryNotADirectory(path) => {
                write!(f, "working directory {} is not a directory", path.display())
            },
            Self::InaccessibleWorkingDirectory { path, reason } => {
                write!(f, "working directory {} is not accessible: {reason}", path.display())
            },
            Self::MissingInterpreter(path) => {
                write!(f, "interpreter {} not found", path.display())
            },
            Self::UnresolvableScript(script) => write!(f, "script '{script}' not found"),
            Self::NotExecutable(path) => write!(f, "{} is not executable", path.display()),
            Self::InvalidArgs(msg) => write!(f, "{msg}"),
        }
    }
}

/// Check `spec` against the local filesystem and the current `PATH`.
#[must_use]
pub fn preflight(spec: &AppLaunchSpec) -> Vec<Finding> {
    let search_path = std::env::var_os("PATH");
    preflight_with_path(spec, search_path.as_deref())
}

/// Check `spec` against the local filesystem and an explicit `PATH` value.
#[must_use]
pub fn preflight_with_path(spec: &AppLaunchSpec, search_path: Option<&OsStr>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let cwd = resolved_cwd(spec);

    if let Some(cwd) = &cwd {
        match std::fs::metadata(cwd) {
            Ok(meta) if !meta.is_dir() => {
                findings.push(Finding::WorkingDirectoryNotADirectory(cwd.clone()));
            },
            Ok(_) => {},
            Err(err) if err.kind() == ErrorKind::NotFound => {
                findings.push(Finding::MissingWorkingDirectory(cwd.clone()));
            },
            Err(err) => findings.push(Finding::InaccessibleWorkingDirectory {
                path: cwd.clone(),
                reason: err.to_string(),
            }),
        }
    }

    if let Some(interpreter) = spec.interpreter() {
        match program_state(interpreter, cwd.as_deref(), search_path) {
            Program::Runnable => {},
            Program::Missing => {
                findings.push(Finding::MissingInterpreter(interpreter.to_path_buf()));
            },
            Program::NotExecutable(path) => findings.push(Finding::NotExecutable(path)),
        }
        let script = locate_script(spec.script(), cwd.as_deref(), search_path);
        // A bare name left unlocated would be opened relative to the child's cwd.
        let reachable = script.is_absolute() || cwd.is_none();
        if !(reachable && script.is_file()) {
            findings.push(Finding::UnresolvableScript(spec.script().to_string()));
        }
    } else {
        match program_state(Path::new(spec.script()), cwd.as_deref(), search_path) {
            Program::Runnable => {},
            Program::Missing => {
                findings.push(Finding::UnresolvableScript(spec.script().to_string()));
            },
            Program::NotExecutable(path) => findings.push(Finding::NotExecutable(path)),
        }
    }

    if let Err(err) = spec.args().to_argv() {
        findings.push(Finding::InvalidArgs(err.to_string()));
    }

    debug!(app = spec.name(), findings = findings.len(), "preflight complete");
    findings
}

enum Program {
    Runnable,
    Missing,
    NotExecutable(PathBuf),
}

fn program_state(command: &Path, cwd: Option<&Path>, search_path: Option<&OsStr>) -> Program {
    let text = command.to_string_lossy();
    if is_bare_command(&text) {
        return match find_on_path(&text, search_path) {
            Some(_) => Program::Runnable,
            None => Program::Missing,
        };
    }
    let path = relative_to(command, cwd);
    if is_executable(&path) {
        Program::Runnable
    } else if path.is_file() {
        Program::NotExecutable(path)
    } else {
        Program::Missing
    }
}
