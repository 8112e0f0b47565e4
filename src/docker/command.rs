//! Splitting model-supplied gateway commands into argv

use crate::error::{Error, Result};

/// Split `command` into arguments the way a POSIX shell would, minus expansion.
///
/// Single quotes are literal, double quotes allow `\"` and `\\`, and a
/// backslash outside quotes escapes the next character. This keeps JSON
/// payloads such as `'{"database_id":"abc"}'` in one argument.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated(command, '\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(unterminated(command, '"')),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated(command, '"')),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(ch) = chars.next() {
                    current.push(ch);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        args.push(current);
    }

    Ok(args)
}

/// Drop a leading `docker mcp` the model sometimes includes anyway.
pub fn strip_gateway_prefix(mut args: Vec<String>) -> Vec<String> {
    if args.len() >= 2 && args[0] == "docker" && args[1] == "mcp" {
        args.drain(..2);
    } else if args.first().map(String::as_str) == Some("mcp") {
        args.remove(0);
    }
    args
}

fn unterminated(command: &str, quote: char) -> Error {
    Error::InvalidInput(format!("Unterminated {} quote in command: {}", quote, command))
}
