use super::parser::parse_line;
use super::types::Command;
use crate::cache::{OpResult, Pool, PoolStatus};

/// Outcome of dispatching one request line.
pub enum Dispatch {
    /// Write this line back to the client (without the trailing newline).
    Reply(String),
    /// The client asked to close the connection: write this line, then
    /// half-close the stream.
    Close(String),
}

/// Maps a parsed command to a pool operation and formats the reply line.
pub async fn dispatch(line: &str, pool: &Pool, now: u64) -> Dispatch {
    let command = match parse_line(line) {
        Ok(command) => command,
        Err(err) => return Dispatch::Reply(err.as_reply().to_string()),
    };

    match command {
        Command::Add { key, value, ttl } => {
            Dispatch::Reply(format_op(pool.add(&key, value, ttl, now).await))
        }
        Command::Set { key, value, ttl } => {
            Dispatch::Reply(format_op(pool.set(&key, value, ttl, now).await))
        }
        Command::Replace { key, value, ttl } => {
            Dispatch::Reply(format_op(pool.replace(&key, value, ttl, now).await))
        }
        Command::Get { key } => Dispatch::Reply(format_op(pool.get(&key, now).await)),
        Command::Has { key } => Dispatch::Reply(format_op(pool.has(&key, now).await)),
        Command::Delete { key } => Dispatch::Reply(format_op(pool.delete(&key).await)),
        Command::Increment { key, ttl } => {
            Dispatch::Reply(format_op(pool.increment(&key, ttl, now).await))
        }
        Command::Decrement { key, ttl } => {
            Dispatch::Reply(format_op(pool.decrement(&key, ttl, now).await))
        }
        Command::Flush => Dispatch::Reply(format_op(pool.flush().await)),
        Command::Status => Dispatch::Reply(format_status(pool.status().await)),
        Command::Close => Dispatch::Close("Closing connection".to_string()),
    }
}

fn format_op(result: OpResult) -> String {
    match result {
        OpResult::Ok => "OK".to_string(),
        OpResult::Miss => "MISS".to_string(),
        OpResult::Exists => "EXISTS".to_string(),
        OpResult::Type => "TYPE".to_string(),
        OpResult::Value(v) => v.to_string(),
        OpResult::Int(n) => n.to_string(),
        OpResult::Bool(b) => b.to_string(),
        OpResult::Count(n) => n.to_string(),
    }
}

fn format_status(status: PoolStatus) -> String {
    let dash_or = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    format!(
        "items={}; oldest={}; newest={}; lru={}",
        status.items,
        dash_or(status.oldest),
        dash_or(status.newest),
        dash_or(status.lru),
    )
}
