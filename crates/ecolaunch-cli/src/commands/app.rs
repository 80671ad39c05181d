//! App commands over a local ecosystem file.
//!
//! - `validate` - parse and validate the file
//! - `list` - table of configured apps
//! - `show` - resolved launch command with secrets redacted
//! - `convert` - re-serialize as TOML or JSON
//! - `check` - preflight checks against this host
//! - `run` - one-shot foreground launch

use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitStatus;

use anyhow::{Context, Result};
use clap::ValueEnum;
use ecolaunch_core::config::{AppLaunchSpec, ConfigFormat, EcosystemConfig};
use ecolaunch_core::log::{redact_args, redact_env};
use ecolaunch_core::process::{self, LaunchCommand};
use tracing::{info, warn};

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable key/value lines.
    Text,
    /// JSON object.
    Json,
}

/// Load and validate the ecosystem file.
fn load(config_path: &Path) -> Result<EcosystemConfig> {
    let config = EcosystemConfig::from_file(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid ecosystem file {}", config_path.display()))?;
    Ok(config)
}

/// Parse and validate the ecosystem file.
pub fn validate(config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    println!(
        "{}: OK ({} app(s))",
        config_path.display(),
        config.apps.len()
    );
    Ok(())
}

/// List configured apps.
pub fn list(config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    print!("{}", render_list(&config));
    Ok(())
}

/// Show how an app would be launched.
pub fn show(
    config_path: &Path,
    name: &str,
    format: OutputFormat,
    profile: Option<&str>,
    resolved_env: bool,
) -> Result<()> {
    let config = load(config_path)?;
    let app = config.app(name)?;
    let mut command = LaunchCommand::resolve(app, profile)
        .with_context(|| format!("failed to resolve app '{name}'"))?;

    if resolved_env {
        command.env = command.merged_env(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }));
    }

    println!("{}", render_show(app, &command, format)?);
    Ok(())
}

/// Re-serialize the ecosystem file. Relative `cwd` values are kept as
/// written so the output can sit next to the input.
pub fn convert(config_path: &Path, to: ConfigFormat, output: Option<&Path>) -> Result<()> {
    let config = EcosystemConfig::read_file(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid ecosystem file {}", config_path.display()))?;
    let rendered = config
        .render(to)
        .with_context(|| format!("failed to render as {to}"))?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(from = %config_path.display(), to = %path.display(), "converted ecosystem file");
        },
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Run preflight checks. Returns `true` when nothing was found.
pub fn check(config_path: &Path, name: Option<&str>) -> Result<bool> {
    let config = load(config_path)?;
    let apps: Vec<&AppLaunchSpec> = match name {
        Some(name) => vec![config.app(name)?],
        None => config.apps.iter().collect(),
    };

    let mut clean = true;
    for app in apps {
        let findings = process::preflight(app);
        if findings.is_empty() {
            println!("{}: ok", app.name());
        } else {
            clean = false;
            for finding in findings {
                println!("{}: {finding}", app.name());
            }
        }
    }
    Ok(clean)
}

/// Launch an app in the foreground. Returns the exit code to propagate.
pub fn run(config_path: &Path, name: &str, profile: Option<&str>) -> Result<i32> {
    let config = load(config_path)?;
    let app = config.app(name)?;

    for finding in process::preflight(app) {
        warn!(app = name, %finding, "preflight finding");
    }

    let command = LaunchCommand::resolve(app, profile)
        .with_context(|| format!("failed to resolve app '{name}'"))?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let status = rt
        .block_on(process::run(&command))
        .with_context(|| format!("failed to run app '{name}'"))?;

    Ok(exit_code(status))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

fn render_list(config: &EcosystemConfig) -> String {
    if config.apps.is_empty() {
        return "No apps configured\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:<40} {}", "NAME", "PROGRAM", "CWD");
    let _ = writeln!(out, "{}", "-".repeat(72));
    for app in &config.apps {
        let program = app
            .interpreter()
            .map_or_else(|| app.script().to_string(), |p| p.display().to_string());
        let cwd = app
            .cwd()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string());
        let _ = writeln!(out, "{:<20} {program:<40} {cwd}", app.name());
    }
    out
}

fn render_show(app: &AppLaunchSpec, command: &LaunchCommand, format: OutputFormat) -> Result<String> {
    let shown = LaunchCommand {
        args: redact_args(&command.args),
        env: redact_env(&command.env),
        ..command.clone()
    };

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "name": app.name(),
                "program": shown.program,
                "args": shown.args,
                "cwd": shown.cwd,
                "env": shown.env,
                "profiles": app.env_profiles().keys().collect::<Vec<_>>(),
            });
            serde_json::to_string_pretty(&value).context("failed to render JSON")
        },
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "App:         {}", app.name());
            let _ = writeln!(out, "Program:     {}", shown.program.display());
            let _ = writeln!(out, "Command:     {}", shown.display());
            let _ = writeln!(
                out,
                "Working dir: {}",
                shown
                    .cwd
                    .as_deref()
                    .map_or_else(|| "(inherited)".to_string(), |p| p.display().to_string())
            );
            if !app.env_profiles().is_empty() {
                let names: Vec<&str> = app.env_profiles().keys().map(String::as_str).collect();
                let _ = writeln!(out, "Profiles:    {}", names.join(", "));
            }
            if shown.env.is_empty() {
                let _ = write!(out, "Environment: (none)");
            } else {
                let _ = write!(out, "Environment:");
                for (key, value) in &shown.env {
                    let _ = write!(out, "\n  {key}={value}");
                }
            }
            Ok(out)
        },
    }
}
