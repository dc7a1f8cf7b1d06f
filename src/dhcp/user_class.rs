//! User class option (77).
//!
//! RFC 3004 defines the payload as a list of length prefixed classes, but
//! many clients (iPXE, u-root and friends) send a single bare string. The
//! two forms are told apart by checking whether the length prefixes add up
//! to exactly the payload size.

use super::cursor::Cursor;
use super::err::{Error, Result};
use super::helpers::len_u8;
use std::fmt;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum UserClassStyle {
    /// One opaque class, sent without length prefix.
    Legacy,
    Rfc3004,
}

#[derive(PartialEq, Debug, Clone)]
pub struct UserClass {
    pub classes: Vec<Vec<u8>>,
    pub style: UserClassStyle,
}

impl UserClass {
    pub fn legacy(class: Vec<u8>) -> Self {
        return Self {
            classes: vec![class],
            style: UserClassStyle::Legacy,
        };
    }

    pub fn rfc3004(classes: Vec<Vec<u8>>) -> Self {
        return Self {
            classes,
            style: UserClassStyle::Rfc3004,
        };
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        if !is_rfc3004(data) {
            return Ok(Self::legacy(data.to_vec()));
        }

        let mut buf = Cursor::new(data);
        let mut classes = Vec::new();
        while buf.has(1) {
            let len = buf.read_u8() as usize;
            if len == 0 {
                return Err(Error::ZeroLengthUserClass);
            }
            let class = buf.copy_n(len);
            if buf.error().is_some() {
                break;
            }
            classes.push(class);
        }
        buf.finish()?;

        if classes.is_empty() {
            return Err(Error::EmptyList("user class list"));
        }

        return Ok(Self::rfc3004(classes));
    }

    /// Payload bytes. The legacy form only carries its first class.
    /// Fails for lists that would not decode back, like an empty one or
    /// a class longer than 255 bytes in the RFC 3004 form.
    pub fn build(&self) -> Result<Vec<u8>> {
        let raw = match self.style {
            UserClassStyle::Legacy => {
                self.classes.first().cloned().unwrap_or_default()
            }
            UserClassStyle::Rfc3004 => {
                let mut raw = Vec::new();
                for class in self.classes.iter() {
                    if class.is_empty() {
                        return Err(Error::ZeroLengthUserClass);
                    }
                    raw.push(len_u8("user class length", class.len())?);
                    raw.extend(class);
                }
                raw
            }
        };

        if raw.is_empty() {
            return Err(Error::EmptyList("user class list"));
        }
        return Ok(raw);
    }
}

/// Whether walking the length prefixes lands exactly on the payload end.
fn is_rfc3004(data: &[u8]) -> bool {
    let mut counting = 0;
    while counting < data.len() {
        counting += data[counting] as usize + 1;
    }
    return counting == data.len();
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let classes: Vec<String> = self
            .classes
            .iter()
            .map(|c| String::from_utf8_lossy(c).to_string())
            .collect();
        write!(f, "{}", classes.join(", "))
    }
}
