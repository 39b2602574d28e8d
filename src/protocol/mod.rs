//! Low-level protocol building blocks.
//!
//! This module contains the transport-facing pieces of the protocol:
//! - Frame encoding/decoding for the serial host link
//! - The transmit queue with ack/error correlation
//! - The in-band XMODEM transfer engine
//! - Packet id generation

pub mod frame;
pub mod queue;
pub mod xmodem;

pub use frame::{FrameDecoder, HEADER_SIZE, MAGIC, MAX_FRAME_SIZE, encode as encode_frame};
pub use queue::{SendHandle, TxQueue};
pub use xmodem::{XmodemEngine, XmodemOutcome, crc16};

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Error, Result};

/// Upper bound (exclusive) for generated packet ids.
const PACKET_ID_RANGE: u32 = 1_000_000_000;

/// Generates a fresh mesh packet id.
///
/// Ids are drawn from the operating system's CSPRNG and scaled into
/// `[0, 10^9)`. They double as the queue correlation key, so zero (the
/// firmware's "no id" sentinel) is never returned.
///
/// # Errors
///
/// Returns [`Error::Randomness`] if the random source fails or produces
/// zero; the enclosing send is aborted in that case.
pub fn generate_packet_id() -> Result<u32> {
    let mut bytes = [0u8; 4];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| Error::Randomness)?;

    let id = u32::from_le_bytes(bytes) % PACKET_ID_RANGE;
    if id == 0 {
        return Err(Error::Randomness);
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_id_in_range() {
        for _ in 0..1000 {
            let id = generate_packet_id().unwrap();
            assert!(id > 0);
            assert!(id < PACKET_ID_RANGE);
        }
    }

    #[test]
    fn test_packet_ids_vary() {
        let a = generate_packet_id().unwrap();
        let b = generate_packet_id().unwrap();
        let c = generate_packet_id().unwrap();
        // Three CSPRNG draws colliding is implausible enough to flag.
        assert!(!(a == b && b == c));
    }
}
