//! Gateway UART tasks
//!
//! Frames in both directions use the framing from `tower-protocol`.
//! Updates for subscribed topics become [`AppEvent::Radio`] events;
//! outgoing messages are taken from the outbox.

use defmt::*;
use embassy_stm32::usart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};

use tower_core::app::AppEvent;
use tower_protocol::{FrameParser, GatewayMessage, MAX_FRAME_SIZE};

use crate::channels::{post, OUTBOX};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Gateway RX task - receives and parses frames from the gateway
#[embassy_executor::task]
pub async fn gateway_rx_task(mut rx: BufferedUartRx<'static>) {
    info!("Gateway RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match GatewayMessage::from_frame(&frame) {
                            Ok(message) => handle_gateway_message(message),
                            Err(e) => warn!("Failed to parse gateway message: {:?}", e),
                        },
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => {
                            warn!("Frame parse error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

fn handle_gateway_message(message: GatewayMessage) {
    match message {
        GatewayMessage::Update { topic, value } => {
            debug!("Update {}: {:?}", topic.path(), value);
            post(AppEvent::Radio(topic, value));
        }
        GatewayMessage::PairingAccepted => {
            info!("Paired with gateway");
        }
    }
}

/// Gateway TX task - sends queued node messages
#[embassy_executor::task]
pub async fn gateway_tx_task(mut tx: BufferedUartTx<'static>) {
    info!("Gateway TX task started");

    let mut buf = [0u8; MAX_FRAME_SIZE];

    loop {
        let message = OUTBOX.receive().await;

        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode {:?}: {:?}", message, e);
                continue;
            }
        };

        match frame.encode(&mut buf) {
            Ok(len) => {
                if let Err(e) = tx.write_all(&buf[..len]).await {
                    warn!("Failed to send frame: {:?}", e);
                } else {
                    trace!("Sent {:?}", message);
                }
            }
            Err(e) => warn!("Frame encode error: {:?}", e),
        }
    }
}
