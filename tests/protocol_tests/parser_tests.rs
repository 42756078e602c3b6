//! Parser Tests
//!
//! Tests verify:
//! - Every command form parses to the right Command
//! - Malformed lines become Invalid instead of failing the job
//! - Size limits on pairs and tokens
//! - CommandReader line handling and end of input

use std::io::Cursor;

use partkv::config::Config;
use partkv::protocol::{parse_line, Command, CommandReader, CommandType, Limits};

// =============================================================================
// Helper Functions
// =============================================================================

fn limits() -> Limits {
    Limits::from_config(&Config::default())
}

fn parse(line: &str) -> Command {
    parse_line(line, &limits())
}

fn assert_invalid(line: &str) {
    let command = parse(line);
    assert_eq!(command.command_type(), CommandType::Invalid, "{:?} parsed as {:?}", line, command);
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn keys(items: &[&str]) -> Vec<String> {
    items.iter().map(|k| k.to_string()).collect()
}

// =============================================================================
// Valid Command Tests
// =============================================================================

#[test]
fn test_parse_write() {
    assert_eq!(
        parse("WRITE [(d,dinis)(a,anacleto)]"),
        Command::Write {
            pairs: pairs(&[("d", "dinis"), ("a", "anacleto")])
        }
    );
}

#[test]
fn test_parse_write_with_separators() {
    assert_eq!(
        parse("WRITE [(a, 1), (b,2)]"),
        Command::Write {
            pairs: pairs(&[("a", "1"), ("b", "2")])
        }
    );
}

#[test]
fn test_parse_read_and_delete() {
    assert_eq!(parse("READ [b,a]"), Command::Read { keys: keys(&["b", "a"]) });
    assert_eq!(parse("DELETE [ x , y ]"), Command::Delete { keys: keys(&["x", "y"]) });
}

#[test]
fn test_parse_simple_commands() {
    assert_eq!(parse("SHOW"), Command::Show);
    assert_eq!(parse("BACKUP"), Command::Backup);
    assert_eq!(parse("HELP"), Command::Help);
    assert_eq!(parse("  SHOW  \n"), Command::Show);
}

#[test]
fn test_parse_wait() {
    assert_eq!(parse("WAIT 1000"), Command::Wait { delay_ms: 1000 });
    assert_eq!(parse("WAIT 0"), Command::Wait { delay_ms: 0 });
}

#[test]
fn test_parse_empty_and_comments() {
    assert_eq!(parse(""), Command::Empty);
    assert_eq!(parse("   \n"), Command::Empty);
    assert_eq!(parse("# WRITE [(a,1)]"), Command::Empty);
}

// =============================================================================
// Invalid Command Tests
// =============================================================================

#[test]
fn test_unknown_and_lowercase_commands_are_invalid() {
    assert_invalid("PUT [(a,1)]");
    assert_invalid("write [(a,1)]");
}

#[test]
fn test_malformed_lists_are_invalid() {
    assert_invalid("WRITE (a,1)");
    assert_invalid("WRITE [(a,1)");
    assert_invalid("WRITE [(a)]");
    assert_invalid("WRITE [(a,1]");
    assert_invalid("WRITE []");
    assert_invalid("READ []");
    assert_invalid("READ [a,,b]");
    assert_invalid("DELETE a");
}

#[test]
fn test_arguments_on_simple_commands_are_invalid() {
    assert_invalid("SHOW now");
    assert_invalid("BACKUP 1");
    assert_invalid("WAIT");
    assert_invalid("WAIT soon");
    assert_invalid("WAIT -5");
}

#[test]
fn test_unstorable_keys_are_invalid() {
    assert_invalid("WRITE [(_a,1)]");
    assert_invalid("READ [a,!b]");
}

#[test]
fn test_values_may_start_with_any_character() {
    assert_eq!(
        parse("WRITE [(a,_x)]"),
        Command::Write {
            pairs: pairs(&[("a", "_x")])
        }
    );
}

// =============================================================================
// Limit Tests
// =============================================================================

#[test]
fn test_too_many_pairs_is_invalid() {
    let config = Config::builder().max_write_size(2).build();
    let limits = Limits::from_config(&config);

    assert_eq!(parse_line("READ [a,b]", &limits).command_type(), CommandType::Read);
    assert_eq!(parse_line("READ [a,b,c]", &limits).command_type(), CommandType::Invalid);
    assert_eq!(
        parse_line("WRITE [(a,1)(b,2)(c,3)]", &limits).command_type(),
        CommandType::Invalid
    );
}

#[test]
fn test_token_length_limit() {
    let config = Config::builder().max_string_size(4).build();
    let limits = Limits::from_config(&config);

    assert_eq!(parse_line("READ [abc]", &limits).command_type(), CommandType::Read);
    assert_eq!(parse_line("READ [abcd]", &limits).command_type(), CommandType::Invalid);
    assert_eq!(parse_line("WRITE [(a,wxyz)]", &limits).command_type(), CommandType::Invalid);
}

// =============================================================================
// CommandReader Tests
// =============================================================================

#[test]
fn test_reader_yields_commands_in_order() {
    let input = "WRITE [(a,1)]\n\n# note\nREAD [a]\nSHOW";
    let mut reader = CommandReader::new(Cursor::new(input), limits());

    let types: Vec<CommandType> = (0..6)
        .map(|_| reader.next_command().unwrap().command_type())
        .collect();

    assert_eq!(
        types,
        vec![
            CommandType::Write,
            CommandType::Empty,
            CommandType::Empty,
            CommandType::Read,
            CommandType::Show,
            CommandType::EndOfFile,
        ]
    );
    assert_eq!(reader.line_no(), 5);
}

#[test]
fn test_reader_keeps_returning_end_of_file() {
    let mut reader = CommandReader::new(Cursor::new(""), limits());
    assert_eq!(reader.next_command().unwrap(), Command::EndOfFile);
    assert_eq!(reader.next_command().unwrap(), Command::EndOfFile);
}

#[test]
fn test_reader_handles_crlf() {
    let mut reader = CommandReader::new(Cursor::new("SHOW\r\nBACKUP\r\n"), limits());
    assert_eq!(reader.next_command().unwrap(), Command::Show);
    assert_eq!(reader.next_command().unwrap(), Command::Backup);
}

#[test]
fn test_reader_non_utf8_line_is_invalid() {
    let input: &[u8] = b"WRITE [(a,1)]\nWRITE [(b,caf\xe9)]\nWRITE [(c,3)]\n";
    let mut reader = CommandReader::new(Cursor::new(input), limits());

    assert_eq!(reader.next_command().unwrap().command_type(), CommandType::Write);
    assert_eq!(reader.next_command().unwrap().command_type(), CommandType::Invalid);
    assert_eq!(
        reader.next_command().unwrap(),
        Command::Write {
            pairs: pairs(&[("c", "3")])
        }
    );
    assert_eq!(reader.next_command().unwrap(), Command::EndOfFile);
    assert_eq!(reader.line_no(), 3);
}
