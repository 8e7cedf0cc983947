use super::types::{Command, ParseError};
use crate::cache::Value;

/// Parses one logical line into a `Command`.
///
/// Command matching is case-insensitive; keys are case-sensitive and are
/// taken verbatim (as bytes, so a key is not required to be valid UTF-8
/// beyond what arrived on the wire).
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ParseError::UnknownCommand);
    }

    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim_start()),
        None => (trimmed, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "flush" => bare(rest, Command::Flush),
        "status" => bare(rest, Command::Status),
        "close" => bare(rest, Command::Close),
        "add" => parse_write(rest, |key, value, ttl| Command::Add { key, value, ttl }),
        "set" => parse_write(rest, |key, value, ttl| Command::Set { key, value, ttl }),
        "replace" => parse_write(rest, |key, value, ttl| Command::Replace { key, value, ttl }),
        "get" => parse_key_only(rest).map(|key| Command::Get { key }),
        "has" => parse_key_only(rest).map(|key| Command::Has { key }),
        "delete" => parse_key_only(rest).map(|key| Command::Delete { key }),
        "increment" => parse_step(rest).map(|(key, ttl)| Command::Increment { key, ttl }),
        "decrement" => parse_step(rest).map(|(key, ttl)| Command::Decrement { key, ttl }),
        _ => Err(ParseError::UnknownCommand),
    }
}

fn bare(rest: &str, command: Command) -> Result<Command, ParseError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::BadArguments)
    }
}

fn parse_key_only(rest: &str) -> Result<Vec<u8>, ParseError> {
    let mut parts = rest.split_whitespace();
    let key = parts.next().ok_or(ParseError::BadArguments)?;
    if parts.next().is_some() {
        return Err(ParseError::BadArguments);
    }
    Ok(key.as_bytes().to_vec())
}

fn parse_step(rest: &str) -> Result<(Vec<u8>, Option<u64>), ParseError> {
    let mut parts = rest.split_whitespace();
    let key = parts.next().ok_or(ParseError::BadArguments)?.as_bytes().to_vec();
    let ttl = match parts.next() {
        Some(token) => Some(parse_ttl_token(token)?),
        None => None,
    };
    if parts.next().is_some() {
        return Err(ParseError::BadArguments);
    }
    Ok((key, ttl))
}

fn parse_write(
    rest: &str,
    build: impl FnOnce(Vec<u8>, Value, u64) -> Command,
) -> Result<Command, ParseError> {
    let (key, value_and_ttl) = rest
        .split_once(char::is_whitespace)
        .ok_or(ParseError::BadArguments)?;
    if key.is_empty() {
        return Err(ParseError::BadArguments);
    }
    let value_and_ttl = value_and_ttl.trim_start();
    if value_and_ttl.is_empty() {
        return Err(ParseError::BadArguments);
    }

    let (value_part, ttl) = split_value_and_ttl(value_and_ttl);
    let value = parse_typed_value(value_part)?;
    Ok(build(key.as_bytes().to_vec(), value, ttl.unwrap_or(0)))
}

/// Splits "<value> [<ttl>]" by treating a trailing all-digit whitespace-
/// separated token as the TTL, provided there is more than one token —
/// otherwise the whole remainder is the value (so a bare numeric value with
/// no TTL is never misparsed as a TTL with a missing value).
fn split_value_and_ttl(s: &str) -> (&str, Option<u64>) {
    if let Some(idx) = s.rfind(char::is_whitespace) {
        let (value_part, ttl_part) = s.split_at(idx);
        let ttl_str = ttl_part.trim();
        if !ttl_str.is_empty() && ttl_str.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(ttl) = ttl_str.parse::<u64>() {
                return (value_part.trim_end(), Some(ttl));
            }
        }
    }
    (s, None)
}

fn parse_ttl_token(token: &str) -> Result<u64, ParseError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::BadArguments);
    }
    token.parse::<u64>().map_err(|_| ParseError::BadArguments)
}

fn parse_typed_value(s: &str) -> Result<Value, ParseError> {
    if let Some(raw) = s.strip_prefix("s|") {
        Ok(Value::Str(raw.to_string()))
    } else if let Some(raw) = s.strip_prefix("b|") {
        match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(ParseError::BadArguments),
        }
    } else if let Some(raw) = s.strip_prefix("i|") {
        raw.parse::<i64>().map(Value::Int).map_err(|_| ParseError::BadArguments)
    } else {
        Ok(Value::Str(s.to_string()))
    }
}
