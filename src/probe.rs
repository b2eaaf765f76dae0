// One-shot test client: connect, send a line carrying the sentinel, then print
// whatever the server streams back.

use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

pub const DEFAULT_PORT: u16 = 9999;
pub const MIN_PORT: u16 = 1024;
/// A handshake line is only sent if it contains this marker.
pub const SENTINEL: &str = "<EOF>";

const RECEIVE_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("message must contain the <EOF> sentinel")]
    MissingSentinel,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Port from the first command-line argument. No argument means
/// `DEFAULT_PORT`; anything unparsable or below `MIN_PORT` is rejected.
pub fn parse_port(arg: Option<&str>) -> Option<u16> {
    match arg {
        None => Some(DEFAULT_PORT),
        Some(s) => s.trim().parse::<u16>().ok().filter(|p| *p >= MIN_PORT),
    }
}

pub fn local_endpoint(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, port))
}

/// Sends the handshake line; refuses client-side when the sentinel is absent.
pub async fn send_handshake<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &str,
) -> Result<usize, ProbeError> {
    if !message.contains(SENTINEL) {
        return Err(ProbeError::MissingSentinel);
    }
    writer.write_all(message.as_bytes()).await?;
    writer.flush().await?;
    Ok(message.len())
}

/// Reads until the peer closes, handing each chunk to `on_message`.
pub async fn receive_loop<R, F>(reader: &mut R, mut on_message: F) -> Result<(), ProbeError>
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut buf = [0u8; RECEIVE_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        on_message(&String::from_utf8_lossy(&buf[..n]));
    }
}

pub async fn connect(port: u16) -> Result<TcpStream, ProbeError> {
    let stream = TcpStream::connect(local_endpoint(port)).await?;
    println!("Socket connected to: {}", stream.peer_addr()?);
    Ok(stream)
}

/// Sends `message` and prints every chunk received until the server closes.
pub async fn run(mut stream: TcpStream, message: &str) -> Result<(), ProbeError> {
    let result = session(&mut stream, message).await;
    let _ = stream.shutdown().await;
    result
}

async fn session(stream: &mut TcpStream, message: &str) -> Result<(), ProbeError> {
    let sent = send_handshake(stream, message).await?;
    println!("Sent {} bytes to server.", sent);
    println!();

    receive_loop(stream, |text| {
        println!(
            "Message received <{}>:",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%:z")
        );
        println!("{}", text);
    })
    .await
}
