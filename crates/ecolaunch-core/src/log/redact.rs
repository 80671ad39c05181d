//! Secret redaction for displayed launch specs.
//!
//! Ecosystem files routinely carry database URLs and API keys in `env`.
//! Anything printed by `show` or written to the log goes through here first.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// The replacement text for redacted secrets.
pub const REDACTED: &str = "[REDACTED]";

/// Environment variable names that indicate sensitive content.
static SENSITIVE_ENV_NAMES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i).*api[_\-]?key.*",
        r"(?i).*secret.*",
        r"(?i).*token.*",
        r"(?i).*passw(or)?d.*",
        r"(?i).*credential.*",
        r"(?i).*private[_\-]?key.*",
        r"(?i)^DATABASE_URL$",
        r"(?i)^AWS_.*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid sensitive env pattern"))
    .collect()
});

/// Flags whose value is a secret, either `--flag=value` or `--flag value`.
static SENSITIVE_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(--?[a-z0-9_\-]*(?:password|passwd|secret|token|api[_\-]?key)[a-z0-9_\-]*)(=.*)?$")
        .expect("invalid sensitive flag pattern")
});

/// Userinfo password in a URL, e.g. `postgres://app:hunter2@db/app`.
static URL_PASSWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([a-z][a-z0-9+.\-]*://[^:/@\s]+:)[^@/\s]+@")
        .expect("invalid url password pattern")
});

/// Check if an environment variable name is sensitive.
#[must_use]
pub fn is_sensitive_env_name(name: &str) -> bool {
    SENSITIVE_ENV_NAMES.iter().any(|p| p.is_match(name))
}

/// Redact a value if the environment variable name is sensitive.
///
/// Values of other variables still have URL passwords masked.
#[must_use]
pub fn redact_env_value<'a>(name: &str, value: &'a str) -> Cow<'a, str> {
    if is_sensitive_env_name(name) {
        Cow::Borrowed(REDACTED)
    } else {
        redact_url_password(value)
    }
}

/// Redacted copy of an environment map.
#[must_use]
pub fn redact_env(env: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    env.iter()
        .map(|(k, v)| (k.clone(), redact_env_value(k, v).into_owned()))
        .collect()
}

/// Redacted copy of an argument vector.
///
/// Handles `--password=x`, `--password x` and credentials embedded in URLs.
#[must_use]
pub fn redact_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut hide_next = false;

    for arg in args {
        if hide_next {
            out.push(REDACTED.to_string());
            hide_next = false;
            continue;
        }
        match SENSITIVE_FLAG.captures(arg) {
            Some(caps) if caps.get(2).is_some() => {
                out.push(format!("{}={REDACTED}", &caps[1]));
            },
            Some(_) => {
                hide_next = true;
                out.push(arg.clone());
            },
            None => out.push(redact_url_password(arg).into_owned()),
        }
    }
    out
}

fn redact_url_password(input: &str) -> Cow<'_, str> {
    URL_PASSWORD.replace_all(input, format!("${{1}}{REDACTED}@"))
}
