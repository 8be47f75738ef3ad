//! Local power command listener for the voice relay
//!
//! Clients send `<device-id> <on|off>` lines on TCP port 8080 and get `OK` or
//! `ERR` back. Parsed commands are handed to the main loop, which owns the
//! switch and the LEDs, and the listener waits for the handler's verdict.

use embassy_net::{Stack, tcp::TcpSocket};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Timer};
use heapless::String;
use sketchbook_core::{
    config::relay::COMMAND_PORT,
    lines::LineBuffer,
    switch::{PowerCommand, PowerSwitch},
};

const MAX_LINE: usize = 64;
const SOCKET_BUFFER: usize = 256;
const IDLE_TIMEOUT_SECS: u64 = 60;

/// A command on its way from the listener to the main loop
#[derive(Debug, Clone)]
pub struct PowerRequest {
    pub device_id: String<MAX_LINE>,
    pub state: bool,
}

/// Hand-off between the listener task and the main loop
pub struct RelayLink {
    requests: Signal<CriticalSectionRawMutex, PowerRequest>,
    replies: Signal<CriticalSectionRawMutex, bool>,
}

impl RelayLink {
    pub const fn new() -> Self {
        Self {
            requests: Signal::new(),
            replies: Signal::new(),
        }
    }

    /// Deliver a pending request, if any, to `switch`.
    ///
    /// Called from the main loop on every iteration. Returns whether a request
    /// was handled.
    pub fn handle(&self, switch: &mut PowerSwitch<'_>) -> bool {
        match self.requests.try_take() {
            Some(request) => {
                let accepted = switch.dispatch(&request.device_id, request.state);
                self.replies.signal(accepted);
                true
            }
            None => false,
        }
    }

    async fn request(&self, request: PowerRequest) -> bool {
        self.replies.reset();
        self.requests.signal(request);
        self.replies.wait().await
    }
}

impl Default for RelayLink {
    fn default() -> Self {
        Self::new()
    }
}

#[embassy_executor::task]
pub async fn command_listener(stack: Stack<'static>, link: &'static RelayLink) -> ! {
    let mut rx_buffer = [0; SOCKET_BUFFER];
    let mut tx_buffer = [0; SOCKET_BUFFER];

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(IDLE_TIMEOUT_SECS)));

        if let Err(e) = socket.accept(COMMAND_PORT).await {
            log::warn!("Accept error: {:?}", e);
            Timer::after(Duration::from_millis(100)).await;
            continue;
        }

        esp_println::println!("[RELAY] Client connected");
        if let Err(e) = serve(&mut socket, link).await {
            log::warn!("Connection error: {}", e);
        }

        socket.close();
        let _ = socket.flush().await;
        esp_println::println!("[RELAY] Client disconnected");
    }
}

async fn serve(socket: &mut TcpSocket<'_>, link: &RelayLink) -> Result<(), &'static str> {
    let mut lines = LineBuffer::<MAX_LINE>::new();
    let mut chunk = [0u8; 64];

    loop {
        let n = socket.read(&mut chunk).await.map_err(|_| "read error")?;
        if n == 0 {
            return Ok(());
        }

        for &byte in &chunk[..n] {
            let Some(line) = lines.push(byte) else {
                continue;
            };

            let reply: &[u8] = match line {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => respond(&text, link).await,
                Err(e) => {
                    log::warn!("Dropping command: {}", e);
                    b"ERR\n"
                }
            };
            write_all(socket, reply).await?;
        }
    }
}

async fn respond(line: &str, link: &RelayLink) -> &'static [u8] {
    let command = match PowerCommand::parse(line) {
        Ok(command) => command,
        Err(e) => {
            log::warn!("Bad command '{}': {}", line, e);
            return b"ERR\n";
        }
    };

    let mut device_id = String::new();
    // Same capacity as the line, so the id always fits
    let _ = device_id.push_str(command.device_id);

    let request = PowerRequest {
        device_id,
        state: command.state,
    };
    if link.request(request).await {
        b"OK\n"
    } else {
        b"ERR\n"
    }
}

async fn write_all(socket: &mut TcpSocket<'_>, mut bytes: &[u8]) -> Result<(), &'static str> {
    while !bytes.is_empty() {
        let n = socket.write(bytes).await.map_err(|_| "write error")?;
        if n == 0 {
            return Err("connection closed");
        }
        bytes = &bytes[n..];
    }
    socket.flush().await.map_err(|_| "flush error")
}
