use crate::cache::Value;

/// A fully parsed client request line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { key: Vec<u8>, value: Value, ttl: u64 },
    Set { key: Vec<u8>, value: Value, ttl: u64 },
    Replace { key: Vec<u8>, value: Value, ttl: u64 },
    Get { key: Vec<u8> },
    Has { key: Vec<u8> },
    Delete { key: Vec<u8> },
    Increment { key: Vec<u8>, ttl: Option<u64> },
    Decrement { key: Vec<u8>, ttl: Option<u64> },
    Flush,
    Status,
    Close,
}

/// Failure classification mirroring the two textual error replies the wire
/// protocol exposes. Never propagated as a Rust error past the parser —
/// translated into a reply line by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand,
    BadArguments,
}

impl ParseError {
    pub fn as_reply(&self) -> &'static str {
        match self {
            ParseError::UnknownCommand => "Invalid command",
            ParseError::BadArguments => "Invalid arguments",
        }
    }
}
