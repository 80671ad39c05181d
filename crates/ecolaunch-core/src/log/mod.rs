//! Log and display helpers.

mod redact;

pub use redact::{REDACTED, is_sensitive_env_name, redact_args, redact_env, redact_env_value};
