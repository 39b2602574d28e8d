//! In-band block transfer over the frame channel.
//!
//! The radio tunnels an XMODEM-style protocol inside protobuf control
//! frames ([`proto::XModem`]): SOH-framed 128-byte blocks with 1-origin
//! sequence numbers and a CRC-16/XMODEM checksum, acknowledged block by
//! block, closed out with EOT.
//!
//! The engine is a state machine advanced by [`XmodemEngine::handle_packet`].
//! Outbound frames leave through the sender handle injected at
//! construction; the session wraps them into `ToRadio` messages.

use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::proto::{self, xmodem::Control};

/// Payload bytes per block.
pub const BLOCK_SIZE: usize = 128;

/// Retransmission attempts per block before the transfer is cancelled.
pub const MAX_RETRIES: u8 = 5;

/// Computes CRC-16/XMODEM (polynomial 0x1021, initial 0x0000, unreflected).
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Transfer state.
enum XmodemState {
    Idle,
    /// Transmitting blocks; `cursor` indexes the block awaiting an ack.
    Sending { blocks: Vec<Vec<u8>>, cursor: usize },
    /// Reassembling an inbound transfer.
    Receiving { buffer: Vec<u8>, expected_seq: u32 },
    /// EOT sent, waiting for the final acknowledgement.
    AwaitingAck { seq: u32 },
}

/// What a handled packet produced, for the session to act on.
#[derive(Debug, PartialEq, Eq)]
pub enum XmodemOutcome {
    /// Nothing to surface.
    None,
    /// An inbound transfer completed; the reassembled buffer.
    ReceiveComplete(Vec<u8>),
    /// The outbound transfer was fully acknowledged.
    SendComplete,
    /// The outbound transfer was abandoned (retries exhausted or peer
    /// cancel).
    SendFailed,
}

/// XMODEM block-transfer engine.
pub struct XmodemEngine {
    state: XmodemState,
    outgoing: mpsc::UnboundedSender<proto::XModem>,
    retries: u8,
    done: Option<oneshot::Sender<Result<()>>>,
}

impl XmodemEngine {
    /// Creates an engine that emits outbound frames through `outgoing`.
    #[must_use]
    pub fn new(outgoing: mpsc::UnboundedSender<proto::XModem>) -> Self {
        Self {
            state: XmodemState::Idle,
            outgoing,
            retries: 0,
            done: None,
        }
    }

    /// Starts sending `data` as a sequence of blocks.
    ///
    /// Returns a receiver that resolves when the transfer completes or
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns an error if a transfer is already in progress.
    pub fn start_send(&mut self, data: &[u8]) -> Result<oneshot::Receiver<Result<()>>> {
        if !matches!(self.state, XmodemState::Idle) {
            return Err(Error::Protocol {
                message: "xmodem transfer already in progress".into(),
            });
        }

        let blocks: Vec<Vec<u8>> = data.chunks(BLOCK_SIZE).map(<[u8]>::to_vec).collect();
        let (tx, rx) = oneshot::channel();
        self.done = Some(tx);
        self.retries = 0;

        if blocks.is_empty() {
            // Nothing to transfer; close out immediately.
            self.emit(Control::Eot, 0, &[]);
            self.state = XmodemState::AwaitingAck { seq: 0 };
            return Ok(rx);
        }

        tracing::debug!("starting xmodem send: {} blocks", blocks.len());
        self.transmit_block(&blocks, 0);
        self.state = XmodemState::Sending { blocks, cursor: 0 };
        Ok(rx)
    }

    /// Feeds one inbound control frame into the engine.
    pub fn handle_packet(&mut self, packet: proto::XModem) -> XmodemOutcome {
        let control = Control::try_from(packet.control).unwrap_or(Control::Nul);

        match std::mem::replace(&mut self.state, XmodemState::Idle) {
            XmodemState::Idle => self.handle_idle(control, packet),
            XmodemState::Sending { blocks, cursor } => {
                self.handle_sending(control, packet.seq, blocks, cursor)
            }
            XmodemState::Receiving {
                buffer,
                expected_seq,
            } => self.handle_receiving(control, packet, buffer, expected_seq),
            XmodemState::AwaitingAck { seq } => match control {
                Control::Ack => {
                    tracing::debug!("xmodem send complete");
                    self.finish(Ok(()));
                    XmodemOutcome::SendComplete
                }
                Control::Nak if self.retries < MAX_RETRIES => {
                    self.retries += 1;
                    self.emit(Control::Eot, 0, &[]);
                    self.state = XmodemState::AwaitingAck { seq };
                    XmodemOutcome::None
                }
                _ => self.abort_send(),
            },
        }
    }

    /// True when no transfer is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, XmodemState::Idle)
    }

    /// Cancels any in-progress transfer.
    pub fn reset(&mut self) {
        if !matches!(self.state, XmodemState::Idle) {
            self.emit(Control::Can, 0, &[]);
        }
        self.state = XmodemState::Idle;
        self.retries = 0;
        self.finish(Err(Error::Cancelled));
    }

    fn handle_idle(&mut self, control: Control, packet: proto::XModem) -> XmodemOutcome {
        match control {
            Control::Soh | Control::Stx => {
                // The radio opened a transfer towards us.
                self.handle_receiving(
                    control,
                    packet,
                    Vec::new(),
                    1, // sequence numbers are 1-origin
                )
            }
            _ => {
                tracing::trace!("ignoring xmodem {control:?} while idle");
                XmodemOutcome::None
            }
        }
    }

    fn handle_sending(
        &mut self,
        control: Control,
        seq: u32,
        blocks: Vec<Vec<u8>>,
        cursor: usize,
    ) -> XmodemOutcome {
        match control {
            Control::Ack => {
                self.retries = 0;
                let next = cursor + 1;
                if next < blocks.len() {
                    self.transmit_block(&blocks, next);
                    self.state = XmodemState::Sending {
                        blocks,
                        cursor: next,
                    };
                } else {
                    // cast: block count is bounded well below u32::MAX
                    self.emit(Control::Eot, 0, &[]);
                    self.state = XmodemState::AwaitingAck {
                        seq: blocks.len() as u32,
                    };
                }
                XmodemOutcome::None
            }
            Control::Nak => {
                if self.retries < MAX_RETRIES {
                    self.retries += 1;
                    tracing::debug!(
                        "xmodem block {} nak, retry {}/{MAX_RETRIES}",
                        cursor + 1,
                        self.retries
                    );
                    self.transmit_block(&blocks, cursor);
                    self.state = XmodemState::Sending { blocks, cursor };
                    XmodemOutcome::None
                } else {
                    self.abort_send()
                }
            }
            Control::Can => self.abort_send(),
            _ => {
                tracing::trace!("ignoring xmodem {control:?} (seq {seq}) while sending");
                self.state = XmodemState::Sending { blocks, cursor };
                XmodemOutcome::None
            }
        }
    }

    fn handle_receiving(
        &mut self,
        control: Control,
        packet: proto::XModem,
        mut buffer: Vec<u8>,
        expected_seq: u32,
    ) -> XmodemOutcome {
        match control {
            Control::Soh | Control::Stx => {
                let crc_ok = u32::from(crc16(&packet.buffer)) == packet.crc16;
                if packet.seq == expected_seq && crc_ok {
                    buffer.extend_from_slice(&packet.buffer);
                    self.emit(Control::Ack, packet.seq, &[]);
                    self.state = XmodemState::Receiving {
                        buffer,
                        expected_seq: expected_seq + 1,
                    };
                } else {
                    tracing::debug!(
                        "xmodem block rejected: seq {} (expected {expected_seq}), crc ok: {crc_ok}",
                        packet.seq
                    );
                    self.emit(Control::Nak, packet.seq, &[]);
                    self.state = XmodemState::Receiving {
                        buffer,
                        expected_seq,
                    };
                }
                XmodemOutcome::None
            }
            Control::Eot => {
                self.emit(Control::Ack, packet.seq, &[]);
                self.state = XmodemState::Idle;
                tracing::debug!("xmodem receive complete: {} bytes", buffer.len());
                XmodemOutcome::ReceiveComplete(buffer)
            }
            Control::Can => {
                tracing::debug!("xmodem receive cancelled by peer");
                self.state = XmodemState::Idle;
                XmodemOutcome::None
            }
            _ => {
                self.state = XmodemState::Receiving {
                    buffer,
                    expected_seq,
                };
                XmodemOutcome::None
            }
        }
    }

    fn transmit_block(&self, blocks: &[Vec<u8>], cursor: usize) {
        let block = &blocks[cursor];
        // cast: cursor is bounded by the block count
        self.emit(Control::Soh, cursor as u32 + 1, block);
    }

    fn emit(&self, control: Control, seq: u32, buffer: &[u8]) {
        let packet = proto::XModem {
            control: control as i32,
            seq,
            crc16: u32::from(crc16(buffer)),
            buffer: buffer.to_vec(),
        };
        if self.outgoing.send(packet).is_err() {
            tracing::warn!("xmodem frame dropped: session sender closed");
        }
    }

    fn abort_send(&mut self) -> XmodemOutcome {
        tracing::warn!("xmodem send failed, cancelling transfer");
        self.emit(Control::Can, 0, &[]);
        self.state = XmodemState::Idle;
        self.retries = 0;
        self.finish(Err(Error::Protocol {
            message: "xmodem transfer failed".into(),
        }));
        XmodemOutcome::SendFailed
    }

    fn finish(&mut self, result: Result<()>) {
        if let Some(done) = self.done.take() {
            let _ = done.send(result);
        }
    }
}
