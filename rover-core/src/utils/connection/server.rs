//! TCP Command Server
//!
//! Accepts one client at a time on the configured port, frames its byte
//! stream into commands and hands each one to the control loop over
//! `COMMAND_CHANNEL`. The control loop answers on `REPLY_CHANNEL`; commands
//! with a reply get exactly one `\r\n`-terminated line back.
//!
//! The server runs as its own task, so a connected but silent client only
//! parks this task; the control loop keeps sampling and arbitrating.

use core::fmt::Write as _;

use embassy_net::{tcp::TcpSocket, Stack};
use embedded_io_async::{Read, Write};
use heapless::String;

use crate::utils::{
    connection::protocol::{CommandParser, Reply},
    controllers::{COMMAND_CHANNEL, REPLY_CHANNEL},
};

/// Longest reply line including the terminator.
const REPLY_LEN: usize = 32;

/// Serve a connected client until it disconnects or the link fails.
///
/// Returns `Ok(())` on an orderly close by the peer.
pub async fn serve_client<S>(socket: &mut S) -> Result<(), S::Error>
where
    S: Read + Write,
{
    let mut parser = CommandParser::new();
    let mut buffer = [0; 128];

    loop {
        let read = socket.read(&mut buffer).await?;
        if read == 0 {
            return Ok(());
        }

        for &byte in &buffer[..read] {
            let Some(command) = parser.push(byte) else {
                continue;
            };

            COMMAND_CHANNEL.send(command).await;
            if let Some(reply) = REPLY_CHANNEL.receive().await {
                write_reply(socket, &reply).await?;
            }
        }
    }
}

/// Render `reply` as one line and write it out.
pub async fn write_reply<S>(
    socket: &mut S,
    reply: &Reply,
) -> Result<(), S::Error>
where
    S: Write,
{
    let mut line: String<REPLY_LEN> = String::new();
    if write!(line, "{reply}\r\n").is_err() {
        tracing::error!(?reply, "reply does not fit in a line buffer");
        return Ok(());
    }
    socket.write_all(line.as_bytes()).await?;
    socket.flush().await
}

/// Push out whatever is still buffered for a departing client.
///
/// The connection is going away either way, so a failure is only logged.
pub async fn flush_on_close<S>(socket: &mut S)
where
    S: Write,
{
    if let Err(error) = socket.flush().await {
        tracing::debug!(?error, "flush on close failed");
    }
}

/// Creates the command server and runs it forever.
pub async fn run(
    stack: Stack<'static>,
    port: u16,
) -> ! {
    if let Some(ip_cfg) = stack.config_v4() {
        tracing::info!("Starting command server at {}:{}", ip_cfg.address, port);
    } else {
        tracing::warn!("Starting command server on port {port}, but no IPv4 address is assigned yet!");
    }

    let (mut rx_buffer, mut tx_buffer) = ([0; 1024], [0; 1024]);

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);

        if let Err(error) = socket.accept(port).await {
            tracing::warn!(?error, "accept failed");
            continue;
        }
        tracing::info!(remote = ?socket.remote_endpoint(), "client connected");

        match serve_client(&mut socket).await {
            Ok(()) => tracing::info!("client disconnected"),
            Err(error) => tracing::warn!(?error, "client connection dropped"),
        }

        socket.close();
        flush_on_close(&mut socket).await;
        socket.abort();
    }
}
