//! Bounds checked big-endian reader and writer used by the option codecs.
//!
//! The reader keeps the first error it finds. Once it is set, every read
//! returns zero (or nothing) without moving, so a codec can read all its
//! fields in a row and check the outcome once with [`Cursor::finish`].

use super::err::{Error, IResult, Result};
use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u32, be_u8};
use std::net::Ipv4Addr;

pub struct Cursor<'a> {
    rest: &'a [u8],
    err: Option<Error>,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        return Self {
            rest: data,
            err: None,
        };
    }

    pub fn remaining(&self) -> usize {
        return self.rest.len();
    }

    pub fn has(&self, n: usize) -> bool {
        return self.rest.len() >= n;
    }

    /// Unread bytes.
    pub fn rest(&self) -> &'a [u8] {
        return self.rest;
    }

    fn fail(&mut self, wanted: usize) {
        if self.err.is_none() {
            self.err = Some(Error::ShortBuffer {
                wanted,
                remaining: self.rest.len(),
            });
        }
    }

    fn run<O>(
        &mut self,
        wanted: usize,
        parser: impl Fn(&'a [u8]) -> IResult<&'a [u8], O>,
    ) -> Option<O> {
        if self.err.is_some() {
            return None;
        }

        match parser(self.rest) {
            Ok((rest, value)) => {
                self.rest = rest;
                return Some(value);
            }
            Err(_) => {
                self.fail(wanted);
                return None;
            }
        }
    }

    pub fn read_u8(&mut self) -> u8 {
        return self.run(1, be_u8).unwrap_or(0);
    }

    pub fn read_u16(&mut self) -> u16 {
        return self.run(2, be_u16).unwrap_or(0);
    }

    pub fn read_u32(&mut self) -> u32 {
        return self.run(4, be_u32).unwrap_or(0);
    }

    pub fn read_ipv4(&mut self) -> Ipv4Addr {
        return Ipv4Addr::from(self.read_u32());
    }

    /// Borrows exactly `n` bytes, or `None` if fewer remain.
    pub fn consume(&mut self, n: usize) -> Option<&'a [u8]> {
        return self.run(n, take(n));
    }

    /// Copies exactly `n` bytes. Empty when fewer remain.
    pub fn copy_n(&mut self, n: usize) -> Vec<u8> {
        return self.consume(n).map(|b| b.to_vec()).unwrap_or_default();
    }

    pub fn error(&self) -> Option<&Error> {
        return self.err.as_ref();
    }

    /// Only the sticky error, unread bytes are fine.
    pub fn check(self) -> Result<()> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// The sticky error, or an error if there are unread bytes.
    pub fn finish(self) -> Result<()> {
        if let Some(e) = self.err {
            return Err(e);
        }
        if !self.rest.is_empty() {
            return Err(Error::TrailingBytes(self.rest.len()));
        }
        return Ok(());
    }
}

#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        return Self::default();
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend(&v.to_be_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend(&v.to_be_bytes());
    }

    pub fn write_ipv4(&mut self, ip: &Ipv4Addr) {
        self.buf.extend(&ip.octets());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend(data);
    }

    pub fn len(&self) -> usize {
        return self.buf.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.buf.is_empty();
    }

    pub fn into_bytes(self) -> Vec<u8> {
        return self.buf;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_big_endian() {
        let mut c = Cursor::new(&[1, 0, 2, 0, 0, 0, 3]);
        assert_eq!(c.read_u8(), 1);
        assert_eq!(c.read_u16(), 2);
        assert_eq!(c.read_u32(), 3);
        assert_eq!(c.remaining(), 0);
        assert!(c.finish().is_ok());
    }

    #[test]
    fn test_sticky_error() {
        let mut c = Cursor::new(&[1, 2, 3]);
        assert_eq!(c.read_u32(), 0);
        // Enough bytes for this one, but the cursor already failed.
        assert_eq!(c.read_u8(), 0);
        assert_eq!(c.remaining(), 3);
        assert_eq!(
            c.finish(),
            Err(Error::ShortBuffer {
                wanted: 4,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_consume() {
        let mut c = Cursor::new(&[1, 2, 3]);
        assert_eq!(c.consume(2), Some(&[1u8, 2][..]));
        assert!(c.has(1));
        assert!(!c.has(2));
        assert_eq!(c.consume(2), None);
        assert!(c.error().is_some());
    }

    #[test]
    fn test_copy_n_short() {
        let mut c = Cursor::new(&[1]);
        assert!(c.copy_n(4).is_empty());
        assert!(c.check().is_err());
    }

    #[test]
    fn test_finish_trailing() {
        let mut c = Cursor::new(&[0, 0, 0, 1, 9]);
        assert_eq!(c.read_u32(), 1);
        assert_eq!(c.finish(), Err(Error::TrailingBytes(1)));
    }

    #[test]
    fn test_writer() {
        let mut w = Writer::new();
        w.write_u8(1);
        w.write_u16(0x0203);
        w.write_u32(0x04050607);
        w.write_ipv4(&Ipv4Addr::new(8, 9, 10, 11));
        w.write_bytes(&[12]);
        assert_eq!(w.len(), 12);
        assert_eq!(
            w.into_bytes(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
        );
    }
}
