//! Shell-style splitting of argument strings.

use super::ProcessError;

/// Split a command-line string into arguments.
///
/// Follows POSIX shell word rules without expansion: whitespace separates
/// words, single quotes are literal, double quotes honor `\"`, `\\`, `\$`
/// and `` \` `` escapes, and a backslash outside quotes escapes the next
/// character. Adjacent quoted and unquoted runs join into one word.
///
/// # Errors
///
/// Returns [`ProcessError::InvalidArgs`] on an unterminated quote or a
/// trailing backslash.
pub fn split_args(line: &str) -> Result<Vec<String>, ProcessError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            },
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(unterminated("single quote", line)),
                    }
                }
            },
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\' | '$' | '`')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            },
                            None => return Err(unterminated("double quote", line)),
                        },
                        Some(c) => current.push(c),
                        None => return Err(unterminated("double quote", line)),
                    }
                }
            },
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(c) => current.push(c),
                    None => {
                        return Err(ProcessError::InvalidArgs(format!(
                            "trailing backslash in {line:?}"
                        )));
                    },
                }
            },
            c => {
                in_word = true;
                current.push(c);
            },
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn unterminated(what: &str, line: &str) -> ProcessError {
    ProcessError::InvalidArgs(format!("unterminated {what} in {line:?}"))
}
