//! Shell replies, rendered the way redis-cli prints them

use std::fmt;

/// Reply to a single command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Status line: OK
    Status(String),
    /// Error: (error) ERR message
    Error(String),
    /// Integer: (integer) 3
    Integer(i64),
    /// Bulk string: "value", or (nil) when absent
    Bulk(Option<String>),
    /// Array: numbered lines
    Array(Vec<Reply>),
}

impl Reply {
    pub fn ok() -> Self {
        Reply::Status("OK".to_string())
    }

    pub fn wrong_arity(command: &str) -> Self {
        Reply::Error(format!(
            "ERR wrong number of arguments for '{}' command",
            command
        ))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(s) => write!(f, "{}", s),
            Reply::Error(e) => write!(f, "(error) {}", e),
            Reply::Integer(i) => write!(f, "(integer) {}", i),
            Reply::Bulk(None) => write!(f, "(nil)"),
            Reply::Bulk(Some(s)) => write!(f, "{:?}", s),
            Reply::Array(items) if items.is_empty() => write!(f, "(empty array)"),
            Reply::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) {}", i + 1, item)?;
                }
                Ok(())
            }
        }
    }
}
