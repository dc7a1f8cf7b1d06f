use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A length field or a fixed size field asks for more bytes than
    /// the buffer holds.
    ShortBuffer { wanted: usize, remaining: usize },

    /// Bytes left after a value that must consume its whole payload.
    TrailingBytes(usize),

    /// Top level option stream without End option.
    UnexpectedEnd,

    /// Something different from Pad after the last option.
    InvalidOptions,

    EmptyList(&'static str),
    ZeroLengthUserClass,
    NonUtf8String,
    InvalidLabel(String),
    BadMagicCookie([u8; 4]),

    /// Value that does not fit in its wire field, like a record longer
    /// than its one byte length prefix.
    ValueTooLarge {
        what: &'static str,
        value: u64,
        max: u64,
    },

    /// Option required to build a packet is not present.
    MissingOption(u8),
    NomError(nom::error::ErrorKind),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ShortBuffer { wanted, remaining } => write!(
                f,
                "short byte stream: wanted {} bytes, {} remaining",
                wanted, remaining
            ),
            Error::TrailingBytes(n) => {
                write!(f, "{} unexpected trailing bytes", n)
            }
            Error::UnexpectedEnd => {
                write!(f, "unexpected end of options, End option not found")
            }
            Error::InvalidOptions => write!(f, "invalid options data"),
            Error::EmptyList(what) => {
                write!(f, "{} must contain at least one element", what)
            }
            Error::ZeroLengthUserClass => {
                write!(f, "DHCP user class must have length greater than 0")
            }
            Error::NonUtf8String => write!(f, "string is not valid UTF-8"),
            Error::InvalidLabel(msg) => write!(f, "invalid label: {}", msg),
            Error::BadMagicCookie(cookie) => write!(
                f,
                "malformed DHCP packet: got magic cookie {:?}",
                cookie
            ),
            Error::ValueTooLarge { what, value, max } => write!(
                f,
                "{} of {} exceeds the maximum of {}",
                what, value, max
            ),
            Error::MissingOption(code) => {
                write!(f, "missing required option {}", code)
            }
            Error::NomError(kind) => {
                write!(f, "parse error: {:?}", kind)
            }
        }
    }
}

impl std::error::Error for Error {}

impl<I> nom::error::ParseError<I> for Error {
    fn from_error_kind(_input: I, kind: nom::error::ErrorKind) -> Self {
        Error::NomError(kind)
    }

    fn append(_input: I, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(e: nom::Err<Error>) -> Self {
        match e {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(_) => {
                Error::NomError(nom::error::ErrorKind::Eof)
            }
        }
    }
}

pub type IResult<I, O> = nom::IResult<I, O, Error>;

pub type Result<T> = std::result::Result<T, Error>;
