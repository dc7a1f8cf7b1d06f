//! Domain name lists encoded as RFC 1035 labels, as used by the domain
//! search option (RFC 3397). Compression pointers are followed on decode
//! but never emitted.

use super::err::{Error, Result};
use super::helpers::parse_utf8;

const MAX_LABEL_LEN: usize = 63;
const POINTER_MASK: u8 = 0xc0;

pub fn parse_domain_list(data: &[u8]) -> Result<Vec<String>> {
    let mut domains = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let (domain, next) = read_name(data, offset)?;
        domains.push(domain);
        offset = next;
    }

    return Ok(domains);
}

/// Reads the name starting at `start`. Returns the name and the offset
/// right after it in the uncompressed stream.
fn read_name(data: &[u8], start: usize) -> Result<(String, usize)> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = start;
    let mut next = None;
    // Pointers can only go backwards, so each jump moves strictly lower.
    let mut limit = start;

    loop {
        let len = *data.get(pos).ok_or(Error::ShortBuffer {
            wanted: 1,
            remaining: 0,
        })?;

        if len == 0 {
            pos += 1;
            break;
        }

        match len & POINTER_MASK {
            POINTER_MASK => {
                let low = *data.get(pos + 1).ok_or(Error::ShortBuffer {
                    wanted: 2,
                    remaining: 1,
                })?;
                let high = (len & !POINTER_MASK) as usize;
                let target = (high << 8) | low as usize;
                if target >= limit {
                    return Err(Error::InvalidLabel(format!(
                        "pointer to offset {} does not point backwards",
                        target
                    )));
                }
                if next.is_none() {
                    next = Some(pos + 2);
                }
                limit = target;
                pos = target;
            }
            0 => {
                let len = len as usize;
                let label = data.get(pos + 1..pos + 1 + len).ok_or(
                    Error::ShortBuffer {
                        wanted: len,
                        remaining: data.len() - pos - 1,
                    },
                )?;
                labels.push(parse_utf8(label)?);
                pos += 1 + len;
            }
            _ => {
                return Err(Error::InvalidLabel(format!(
                    "reserved label type 0x{:02x}",
                    len
                )))
            }
        }
    }

    return Ok((labels.join("."), next.unwrap_or(pos)));
}

/// Encodes every domain as a sequence of labels ended by a zero length
/// label. Labels longer than 63 bytes are refused.
pub fn build_domain_list(domains: &[String]) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    for domain in domains {
        for label in domain.split('.').filter(|l| !l.is_empty()) {
            if label.len() > MAX_LABEL_LEN {
                return Err(Error::InvalidLabel(format!(
                    "label '{}' longer than {} bytes",
                    label, MAX_LABEL_LEN
                )));
            }
            raw.push(label.len() as u8);
            raw.extend(label.as_bytes());
        }
        raw.push(0);
    }

    return Ok(raw);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain_list() {
        let data = [
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm',
            0, 3, b'l', b'a', b'b', 0,
        ];
        let domains = parse_domain_list(&data).unwrap();
        assert_eq!(domains, vec!["example.com", "lab"]);
    }

    #[test]
    fn test_parse_pointer() {
        let data = [
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm',
            0, 3, b'l', b'a', b'b', 0xc0, 0,
        ];
        let domains = parse_domain_list(&data).unwrap();
        assert_eq!(domains, vec!["example.com", "lab.example.com"]);
    }

    #[test]
    fn test_parse_forward_pointer() {
        let data = [0xc0, 0, 0];
        assert!(matches!(
            parse_domain_list(&data),
            Err(Error::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_parse_truncated() {
        assert!(parse_domain_list(&[7, b'e', b'x']).is_err());
        assert!(parse_domain_list(&[3, b'c', b'o', b'm']).is_err());
        assert!(parse_domain_list(&[0xc0]).is_err());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_domain_list(&[]).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_build_domain_list() {
        let domains = vec!["example.com.".to_string(), "lab".to_string()];
        assert_eq!(
            build_domain_list(&domains),
            Ok(vec![
                7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o',
                b'm', 0, 3, b'l', b'a', b'b', 0
            ])
        );
    }

    #[test]
    fn test_build_long_label() {
        let domains = vec![format!("{}.com", "a".repeat(63))];
        let raw = build_domain_list(&domains).unwrap();
        assert_eq!(raw[0], 63);
        assert_eq!(parse_domain_list(&raw), Ok(domains));

        let domains = vec![format!("{}.com", "a".repeat(64))];
        assert!(matches!(
            build_domain_list(&domains),
            Err(Error::InvalidLabel(_))
        ));
    }
}
