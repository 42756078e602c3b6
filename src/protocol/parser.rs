//! Job file parser
//!
//! Turns job file lines into [`Command`]s.
//!
//! ## Grammar (one command per line)
//! ```text
//! WRITE [(key,value)(key2,value2)...]
//! READ [key,key2,...]
//! DELETE [key,key2,...]
//! SHOW
//! WAIT <delay_ms>
//! BACKUP
//! HELP
//! # comment
//! ```
//!
//! Malformed lines, including lines that are not valid UTF-8, become
//! [`Command::Invalid`] so the job keeps going. Only I/O failures are
//! returned as errors.

use std::io::BufRead;

use super::Command;
use crate::config::Config;
use crate::error::Result;
use crate::store::partition_index;

/// Size limits applied to every command
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Max pairs (or keys) per command
    pub max_pairs: usize,

    /// Max bytes per key or value
    pub max_token_len: usize,
}

impl Limits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pairs: config.max_write_size,
            max_token_len: config.max_token_len(),
        }
    }
}

/// Reads commands one line at a time
pub struct CommandReader<R> {
    reader: R,
    limits: Limits,
    line: Vec<u8>,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> CommandReader<R> {
    pub fn new(reader: R, limits: Limits) -> Self {
        Self {
            reader,
            limits,
            line: Vec::new(),
            line_no: 0,
            done: false,
        }
    }

    /// Read the next command.
    ///
    /// Returns `EndOfFile` once input is exhausted, and on every call after.
    pub fn next_command(&mut self) -> Result<Command> {
        if self.done {
            return Ok(Command::EndOfFile);
        }

        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            self.done = true;
            return Ok(Command::EndOfFile);
        }
        self.line_no += 1;

        match std::str::from_utf8(&self.line) {
            Ok(line) => Ok(parse_line(line, &self.limits)),
            Err(e) => Ok(Command::invalid(format!("line is not valid UTF-8: {}", e))),
        }
    }

    /// Number of the line last returned (1-based)
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

/// Parse a single line
pub fn parse_line(line: &str, limits: &Limits) -> Command {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Command::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "WRITE" => parse_pairs(rest, limits)
            .map(|pairs| Command::Write { pairs })
            .unwrap_or_else(Command::invalid),
        "READ" => parse_keys(rest, limits)
            .map(|keys| Command::Read { keys })
            .unwrap_or_else(Command::invalid),
        "DELETE" => parse_keys(rest, limits)
            .map(|keys| Command::Delete { keys })
            .unwrap_or_else(Command::invalid),
        "WAIT" => match rest.parse::<u64>() {
            Ok(delay_ms) => Command::Wait { delay_ms },
            Err(_) => Command::invalid(format!("bad delay {:?}", rest)),
        },
        "SHOW" | "BACKUP" | "HELP" if !rest.is_empty() => {
            Command::invalid(format!("{} takes no arguments", word))
        }
        "SHOW" => Command::Show,
        "BACKUP" => Command::Backup,
        "HELP" => Command::Help,
        other => Command::invalid(format!("unknown command {:?}", other)),
    }
}

/// `[...]` → inner text
fn bracketed(rest: &str) -> std::result::Result<&str, String> {
    rest.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .ok_or_else(|| format!("expected [...], got {:?}", rest))
}

/// `[(k,v)(k2,v2)]`; groups may also be separated by commas or spaces
fn parse_pairs(rest: &str, limits: &Limits) -> std::result::Result<Vec<(String, String)>, String> {
    let mut inner = bracketed(rest)?;
    let mut pairs = Vec::new();

    loop {
        inner = inner.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if inner.is_empty() {
            break;
        }

        let body = inner
            .strip_prefix('(')
            .ok_or_else(|| format!("expected '(' at {:?}", inner))?;
        let (group, tail) = body
            .split_once(')')
            .ok_or_else(|| "unterminated pair".to_string())?;
        let (key, value) = group
            .split_once(',')
            .ok_or_else(|| format!("pair {:?} has no value", group))?;

        let key = key_token(key, limits)?;
        let value = token(value, limits)?;
        pairs.push((key, value));
        inner = tail;
    }

    check_count(pairs.len(), limits)?;
    Ok(pairs)
}

/// `[k,k2,...]`
fn parse_keys(rest: &str, limits: &Limits) -> std::result::Result<Vec<String>, String> {
    let inner = bracketed(rest)?;
    if inner.trim().is_empty() {
        return Err("empty key list".to_string());
    }

    let keys = inner
        .split(',')
        .map(|key| key_token(key, limits))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    check_count(keys.len(), limits)?;
    Ok(keys)
}

fn check_count(count: usize, limits: &Limits) -> std::result::Result<(), String> {
    match count {
        0 => Err("no pairs given".to_string()),
        n if n > limits.max_pairs => Err(format!("{} items, at most {} allowed", n, limits.max_pairs)),
        _ => Ok(()),
    }
}

fn token(raw: &str, limits: &Limits) -> std::result::Result<String, String> {
    let token = raw.trim();
    if token.is_empty() {
        return Err("empty token".to_string());
    }
    if token.len() > limits.max_token_len {
        return Err(format!("token longer than {} bytes", limits.max_token_len));
    }
    if token.contains(|c: char| matches!(c, '(' | ')' | '[' | ']' | ',')) {
        return Err(format!("unexpected delimiter in {:?}", token));
    }
    Ok(token.to_string())
}

/// A token that must also map to a partition
fn key_token(raw: &str, limits: &Limits) -> std::result::Result<String, String> {
    let key = token(raw, limits)?;
    partition_index(&key).map_err(|e| e.to_string())?;
    Ok(key)
}
