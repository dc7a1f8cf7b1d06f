use super::err::{Error, IResult};
use nom::bytes::complete::take;
use nom::number::complete::be_u32;
use pnet::util::MacAddr;
use std::convert::TryFrom;
use std::fmt::Display;
use std::net::Ipv4Addr;

pub fn parse_ipv4(raw: &[u8]) -> IResult<&[u8], Ipv4Addr> {
    be_u32(raw).map(|(r, i)| (r, Ipv4Addr::from(i)))
}

/// Reads the 16 bytes of the chaddr field, keeping the first 6.
pub fn parse_chaddr(raw: &[u8]) -> IResult<&[u8], MacAddr> {
    let (r, addr) = take(16u8)(raw)?;
    Ok((
        r,
        MacAddr::new(addr[0], addr[1], addr[2], addr[3], addr[4], addr[5]),
    ))
}

/// Fixed size field holding a NUL terminated string, like sname and file.
pub fn parse_cstring(raw: &[u8], size: usize) -> IResult<&[u8], String> {
    let (r, field) = take(size)(raw)?;
    let end = field.iter().position(|b| *b == 0).unwrap_or(size);
    let s = String::from_utf8_lossy(&field[..end]).to_string();
    Ok((r, s))
}

pub fn parse_utf8(raw: &[u8]) -> Result<String, Error> {
    match std::str::from_utf8(raw) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => {
            return Err(Error::NonUtf8String)
        }
    }
}

/// Length prefix of a record whose length is written in one byte.
pub fn len_u8(what: &'static str, len: usize) -> Result<u8, Error> {
    u8::try_from(len).map_err(|_| Error::ValueTooLarge {
        what,
        value: len as u64,
        max: u8::MAX as u64,
    })
}

/// Lossy text rendering of a byte string option.
pub fn text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_string()
}

pub fn join<I: Display>(v: &[I], separator: &str) -> String {
    v.iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cstring() {
        let mut raw = vec![b'p', b'x', b'e', 0, b'z'];
        raw.extend(&[0; 3]);
        let (rest, s) = parse_cstring(&raw, 6).unwrap();
        assert_eq!(s, "pxe");
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn test_parse_cstring_without_nul() {
        let (_, s) = parse_cstring(b"abcd", 4).unwrap();
        assert_eq!(s, "abcd");
    }

    #[test]
    fn test_parse_utf8_invalid() {
        assert_eq!(parse_utf8(&[0xff, 0xfe]), Err(Error::NonUtf8String));
    }

    #[test]
    fn test_len_u8() {
        assert_eq!(len_u8("class", 255), Ok(255));
        assert_eq!(
            len_u8("class", 256),
            Err(Error::ValueTooLarge {
                what: "class",
                value: 256,
                max: 255
            })
        );
    }

    #[test]
    fn test_join() {
        let ips = vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)];
        assert_eq!(join(&ips, ", "), "10.0.0.1, 10.0.0.2");
    }
}
