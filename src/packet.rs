use serde::{Deserialize, Serialize};

use crate::util;

pub const ECHO_REQUEST_V4: u8 = 8;

/// ICMP echo header in field order; serialized big endian, it yields the
/// canonical 8-byte wire layout.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ICMPEchoPacket {
    pub message_type: u8,
    pub message_code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence_num: u16,
}

impl ICMPEchoPacket {
    /// Echo request with identifier and sequence fixed at 0. No replies are
    /// matched against these, so per-session uniqueness is not maintained.
    pub fn echo_request() -> ICMPEchoPacket {
        ICMPEchoPacket {
            message_type: ECHO_REQUEST_V4,
            message_code: 0,
            checksum: 0,
            identifier: 0,
            sequence_num: 0,
        }
    }
}

/// Serialize an echo request and fill in its checksum, computed over the
/// 8 bytes with the checksum field still zero. The returned buffer carries
/// the true checksum in bytes 2-3, ready for the wire.
pub fn build_echo_request(coder: &bincode::Config) -> Vec<u8> {
    let pack = ICMPEchoPacket::echo_request();

    let mut wire = coder.serialize(&pack).unwrap();
    util::set_checksum(wire.as_mut_slice(), 1);
    wire
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coder() -> bincode::Config {
        let mut coder = bincode::config();
        coder.big_endian();
        coder
    }

    #[test]
    fn wire_form_is_eight_bytes() {
        assert_eq!(build_echo_request(&coder()).len(), 8);
    }

    #[test]
    fn type_and_code_are_echo_request() {
        let wire = build_echo_request(&coder());
        assert_eq!(wire[0], 0x08);
        assert_eq!(wire[1], 0x00);
    }

    #[test]
    fn identifier_and_sequence_stay_zero() {
        let wire = build_echo_request(&coder());
        assert_eq!(&wire[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn stored_checksum_matches_recomputation_over_zeroed_field() {
        let wire = build_echo_request(&coder());
        let stored = u16::from_be_bytes([wire[2], wire[3]]);

        let mut zeroed = wire.clone();
        zeroed[2] = 0;
        zeroed[3] = 0;
        assert_eq!(util::get_checksum(&zeroed), stored);
    }

    #[test]
    fn full_packet_verifies_to_zero() {
        // Summing a packet that already carries its checksum complements to 0
        let wire = build_echo_request(&coder());
        assert_eq!(util::get_checksum(&wire), 0);
    }
}
