use crate::cache::Pool;
use crate::protocol::{dispatch, Dispatch};
use crate::utils::clock::now_seconds;
use crate::utils::error::Result;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Sanity cap on a single request line; exceeding it closes the connection
/// with `Invalid command` rather than growing the buffer without bound.
const MAX_LINE_LEN: usize = 64 * 1024;

pub async fn handle_client(mut stream: TcpStream, pool: Pool, addr: SocketAddr) -> Result<()> {
    let _ = stream.set_nodelay(true);

    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            debug!("Connection from {} closed by peer", addr);
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = buf.drain(..=pos).collect();

            if line_bytes.len() > MAX_LINE_LEN {
                stream.write_all(b"Invalid command\n").await?;
                let _ = stream.shutdown().await;
                return Ok(());
            }

            let line = String::from_utf8_lossy(&line_bytes);

            match dispatch(&line, &pool, now_seconds()).await {
                Dispatch::Reply(reply) => {
                    stream.write_all(reply.as_bytes()).await?;
                    stream.write_all(b"\n").await?;
                }
                Dispatch::Close(reply) => {
                    stream.write_all(reply.as_bytes()).await?;
                    stream.write_all(b"\n").await?;
                    info!("Connection from {} closed by request", addr);
                    let _ = stream.shutdown().await;
                    return Ok(());
                }
            }
        }

        if buf.len() > MAX_LINE_LEN {
            stream.write_all(b"Invalid command\n").await?;
            let _ = stream.shutdown().await;
            break;
        }
    }

    Ok(())
}
