//! Launch-time view of an app.
//!
//! An [`AppLaunchSpec`] says what to run; a [`LaunchCommand`] is the concrete
//! program, argument vector, directory and environment handed to the OS.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use shell_escape::escape;
use tracing::debug;

use crate::config::AppLaunchSpec;

mod args;
pub mod preflight;
pub mod spawner;

pub use args::split_args;
pub use preflight::{Finding, preflight};
pub use spawner::{SpawnedProcess, run, spawn};

/// Errors raised while turning a spec into a running process.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Argument string could not be split.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// The requested environment profile is not defined on the app.
    #[error("app '{app}' has no env profile '{profile}'")]
    UnknownProfile {
        /// App name.
        app: String,
        /// Requested profile.
        profile: String,
    },

    /// Process could not be started.
    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),

    /// Waiting on the child failed.
    #[error("failed to wait for process: {0}")]
    WaitFailed(String),
}

/// A fully resolved command, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// App the command was resolved from.
    pub name: String,
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments after the program.
    pub args: Vec<String>,
    /// Working directory, or the caller's when `None`.
    pub cwd: Option<PathBuf>,
    /// Environment overrides, profile already applied.
    pub env: BTreeMap<String, String>,
}

impl LaunchCommand {
    /// Resolve `spec` using the current `PATH`.
    ///
    /// # Errors
    ///
    /// See [`LaunchCommand::resolve_with_path`].
    pub fn resolve(spec: &AppLaunchSpec, profile: Option<&str>) -> Result<Self, ProcessError> {
        let search_path = std::env::var_os("PATH");
        Self::resolve_with_path(spec, profile, search_path.as_deref())
    }

    /// Resolve `spec` against an explicit `PATH` value.
    ///
    /// Without an interpreter the script is the program. With one, the
    /// interpreter is the program and receives its own arguments, then the
    /// located script, then the app arguments. The selected profile's
    /// entries override `env`.
    ///
    /// The working directory is made absolute against the caller's, and
    /// relative program and script paths are joined onto it. The child
    /// changes directory before `exec`, so a path left relative to the
    /// caller would otherwise be looked up in the wrong place.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::InvalidArgs`] if the argument string cannot be
    /// split, or [`ProcessError::UnknownProfile`] if `profile` is not defined.
    pub fn resolve_with_path(
        spec: &AppLaunchSpec,
        profile: Option<&str>,
        search_path: Option<&OsStr>,
    ) -> Result<Self, ProcessError> {
        let app_args = spec.args().to_argv()?;
        let cwd = resolved_cwd(spec);

        let (program, args) = match spec.interpreter() {
            None => (
                relative_to(Path::new(spec.script()), cwd.as_deref()),
                app_args,
            ),
            Some(interpreter) => {
                let script = locate_script(spec.script(), cwd.as_deref(), search_path);
                let mut args = spec.interpreter_args().to_vec();
                args.push(script.to_string_lossy().into_owned());
                args.extend(app_args);
                (relative_to(interpreter, cwd.as_deref()), args)
            },
        };

        let mut env = spec.env().clone();
        if let Some(profile) = profile {
            let overrides = spec
                .profile(profile)
                .ok_or_else(|| ProcessError::UnknownProfile {
                    app: spec.name().to_string(),
                    profile: profile.to_string(),
                })?;
            env.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let command = Self {
            name: spec.name().to_string(),
            program,
            args,
            cwd,
            env,
        };
        debug!(app = %command.name, command = %command.display(), "resolved launch command");
        Ok(command)
    }

    /// Overlay this command's environment on `base`. Overrides win.
    #[must_use]
    pub fn merged_env<I, K, V>(&self, base: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut merged: BTreeMap<String, String> = base
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        merged.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Shell-quoted command line, for display only.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy())
            .chain(self.args.iter().map(|arg| Cow::Borrowed(arg.as_str())))
            .map(escape)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whether `name` is a bare command name that the OS would look up on `PATH`.
pub(crate) fn is_bare_command(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
        && !name.contains('/')
}

/// The app's working directory, absolute against the caller's.
pub(crate) fn resolved_cwd(spec: &AppLaunchSpec) -> Option<PathBuf> {
    spec.cwd()
        .map(|cwd| std::path::absolute(cwd).unwrap_or_else(|_| cwd.to_path_buf()))
}

/// First executable file named `name` in `search_path`.
pub(crate) fn find_on_path(name: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    std::env::split_paths(search_path?)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Where the interpreter should find the script.
///
/// Bare names are looked up on `PATH` first (console scripts such as
/// `gunicorn`), then in the working directory. Relative paths are taken
/// from the working directory.
pub(crate) fn locate_script(
    script: &str,
    cwd: Option<&Path>,
    search_path: Option<&OsStr>,
) -> PathBuf {
    if is_bare_command(script) {
        if let Some(found) = find_on_path(script, search_path) {
            return found;
        }
        if let Some(local) = cwd.map(|dir| dir.join(script)).filter(|p| p.is_file()) {
            return local;
        }
        return PathBuf::from(script);
    }
    relative_to(Path::new(script), cwd)
}

/// Join relative paths that contain a separator onto `cwd`.
pub(crate) fn relative_to(path: &Path, cwd: Option<&Path>) -> PathBuf {
    match cwd {
        Some(dir) if path.is_relative() && !is_bare_command(&path.to_string_lossy()) => {
            dir.join(path)
        },
        _ => path.to_path_buf(),
    }
}

#[cfg(unix)]
pub(crate) fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
pub(crate) fn is_executable(path: &Path) -> bool {
    path.is_file()
}
