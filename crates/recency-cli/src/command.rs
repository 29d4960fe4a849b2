//! Command-line parser using nom
//!
//! Line format:
//! ```text
//! COMMAND arg1 "arg with spaces" ...
//! # comment
//! ```
//!
//! Quoted tokens run to the next `"`; there are no escape sequences.

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_till},
    character::complete::{char, multispace0, multispace1},
    combinator::all_consuming,
    multi::separated_list0,
    sequence::delimited,
    IResult,
};

use crate::reply::Reply;

/// A parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping(Option<String>),
    Get(String),
    Peek(String),
    Set(String, String),
    Del(Vec<String>),
    Exists(Vec<String>),
    Keys,
    Len,
    Capacity,
    Clear,
    Quit,
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"'))(input)
}

fn bare(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"")(input)
}

/// Split a line into whitespace-separated tokens
pub fn tokenize(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, alt((quoted, bare))),
        multispace0,
    ))(input)
}

/// Parse one input line
///
/// Returns `Ok(None)` for blank and comment lines, and an error reply for
/// anything that is not a well-formed command.
pub fn parse_command(line: &str) -> Result<Option<Command>, Reply> {
    if line.trim_start().starts_with('#') {
        return Ok(None);
    }

    let tokens = match tokenize(line) {
        Ok((_, tokens)) => tokens,
        Err(_) => return Err(Reply::Error("ERR syntax error".to_string())),
    };

    let (name, args) = match tokens.split_first() {
        Some((name, args)) => (name.to_uppercase(), args),
        None => return Ok(None),
    };

    let owned = |i: usize| args[i].to_string();
    let arity = |ok: bool| {
        if ok {
            Ok(())
        } else {
            Err(Reply::wrong_arity(&name.to_lowercase()))
        }
    };

    let command = match name.as_str() {
        "PING" => {
            arity(args.len() <= 1)?;
            Command::Ping(args.first().map(|s| s.to_string()))
        }
        "GET" => {
            arity(args.len() == 1)?;
            Command::Get(owned(0))
        }
        "PEEK" => {
            arity(args.len() == 1)?;
            Command::Peek(owned(0))
        }
        "SET" => {
            arity(args.len() == 2)?;
            Command::Set(owned(0), owned(1))
        }
        "DEL" => {
            arity(!args.is_empty())?;
            Command::Del(args.iter().map(|s| s.to_string()).collect())
        }
        "EXISTS" => {
            arity(!args.is_empty())?;
            Command::Exists(args.iter().map(|s| s.to_string()).collect())
        }
        "KEYS" => {
            arity(args.is_empty())?;
            Command::Keys
        }
        "LEN" | "DBSIZE" => {
            arity(args.is_empty())?;
            Command::Len
        }
        "CAPACITY" => {
            arity(args.is_empty())?;
            Command::Capacity
        }
        "CLEAR" | "FLUSHDB" => {
            arity(args.is_empty())?;
            Command::Clear
        }
        "QUIT" | "EXIT" => Command::Quit,
        _ => return Err(Reply::Error(format!("ERR unknown command '{}'", name))),
    };

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let (_, tokens) = tokenize("  set  key \"two words\" ").unwrap();
        assert_eq!(tokens, vec!["set", "key", "two words"]);

        let (_, tokens) = tokenize("").unwrap();
        assert!(tokens.is_empty());

        let (_, tokens) = tokenize("set k \"\"").unwrap();
        assert_eq!(tokens, vec!["set", "k", ""]);
    }

    #[test]
    fn test_tokenize_unbalanced_quote() {
        assert!(tokenize("set k \"open").is_err());
        assert!(tokenize("set k\"v\"").is_err());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("SET a 1"),
            Ok(Some(Command::Set("a".to_string(), "1".to_string())))
        );
        assert_eq!(
            parse_command("get a"),
            Ok(Some(Command::Get("a".to_string())))
        );
        assert_eq!(
            parse_command("del a b"),
            Ok(Some(Command::Del(vec!["a".to_string(), "b".to_string()])))
        );
        assert_eq!(parse_command("dbsize"), Ok(Some(Command::Len)));
        assert_eq!(parse_command("PING"), Ok(Some(Command::Ping(None))));
        assert_eq!(parse_command("exit"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   \n"), Ok(None));
        assert_eq!(parse_command("  # set a 1"), Ok(None));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("get"), Err(Reply::wrong_arity("get")));
        assert_eq!(parse_command("SET a"), Err(Reply::wrong_arity("set")));
        assert_eq!(
            parse_command("frob x"),
            Err(Reply::Error("ERR unknown command 'FROB'".to_string()))
        );
        assert_eq!(
            parse_command("set a \"b"),
            Err(Reply::Error("ERR syntax error".to_string()))
        );
    }
}
