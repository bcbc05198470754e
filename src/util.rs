use std::io::{Result, Error, ErrorKind};
use std::net::{IpAddr, Ipv4Addr};

use rand::Rng;

/// Turn a command-line address spec into a concrete IP address.
/// `"rand"` (any case) draws a fresh random IPv4 address; anything else
/// must be a literal IPv4/IPv6 address.
pub fn resolve(spec: &str) -> Result<IpAddr> {
    if spec.eq_ignore_ascii_case("rand") {
        Ok(IpAddr::V4(random_addr()))
    } else {
        spec.parse().map_err(|_| {
            Error::new(ErrorKind::InvalidInput, format!("invalid ip address '{}'", spec))
        })
    }
}

/// Random IPv4 address with every octet in 1..=254, so the degenerate
/// network/broadcast forms never come out.
pub fn random_addr() -> Ipv4Addr {
    let mut rng = rand::thread_rng();
    Ipv4Addr::new(
        rng.gen_range(1, 255),
        rng.gen_range(1, 255),
        rng.gen_range(1, 255),
        rng.gen_range(1, 255),
    )
}

#[allow(clippy::double_parens)] // For stylistic reasons
pub fn set_checksum(data: &mut [u8], location: usize) {
    let sum = get_checksum(data);
    data[location*2    ] = ((sum & 0xFF00) >> 8) as u8;
    data[location*2 + 1] = ((sum & 0x00FF)     ) as u8;
}

pub fn get_checksum(data: &[u8]) -> u16 {
    let mut sum = sum_be_words(data);
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }

    !sum as u16 // The checksum field should be the ones complement of the sum
}

/// Sum all words (16 bit chunks) in the given data. Each word is treated as
/// big endian; an odd trailing byte counts as the high byte of a final word.
fn sum_be_words(data: &[u8]) -> u32 {
    data.chunks(2)
        .map(|word| match *word {
            [w] => (w as u16) << 8,
            [wh, wl] => u16::from_be_bytes([wh, wl]),
            _ => unreachable!(),
        })
        .fold(0u32, |sum, w| sum.wrapping_add(w as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_of_empty_input_is_all_ones() {
        assert_eq!(get_checksum(&[]), 0xFFFF);
    }

    #[test]
    fn checksum_of_zero_word_is_all_ones() {
        assert_eq!(get_checksum(&[0x00, 0x00]), 0xFFFF);
    }

    #[test]
    fn checksum_matches_rfc1071_reference() {
        // 0x4500 + 0x001c = 0x451c, complemented
        assert_eq!(get_checksum(&[0x45, 0x00, 0x00, 0x1c]), 0xBAE3);
    }

    #[test]
    fn odd_trailing_byte_pads_the_low_position() {
        // 0x4500 + 0x1c00 = 0x6100, complemented
        assert_eq!(get_checksum(&[0x45, 0x00, 0x1c]), 0x9EFF);
    }

    #[test]
    fn set_checksum_writes_big_endian_at_the_word_offset() {
        let mut data = [0x45, 0x00, 0x00, 0x00, 0x00, 0x1c];
        set_checksum(&mut data, 1);
        // Sum computed with the field still zero
        assert_eq!(u16::from_be_bytes([data[2], data[3]]), 0xBAE3);
    }

    #[test]
    fn rand_spec_never_draws_degenerate_octets() {
        for _ in 0..1000 {
            match resolve("RaNd").unwrap() {
                IpAddr::V4(addr) => {
                    for octet in addr.octets().iter() {
                        assert_ne!(*octet, 0);
                        assert_ne!(*octet, 255);
                    }
                }
                IpAddr::V6(_) => panic!("rand must draw IPv4"),
            }
        }
    }

    #[test]
    fn literal_addresses_resolve_verbatim() {
        assert_eq!(resolve("192.0.2.1").unwrap(), "192.0.2.1".parse::<IpAddr>().unwrap());
        assert_eq!(resolve("::1").unwrap(), "::1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn garbage_fails_to_resolve() {
        let err = resolve("not-an-ip").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
