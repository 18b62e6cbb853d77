// https://redis.io/docs/reference/protocol-spec

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use thiserror::Error as ThisError;

use crate::buffer::ReadBuffer;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    #[error("protocol error; invalid number {0:?}")]
    InvalidNumber(String),
}

/// Which of the three wire encodings a null was read from, or should be written as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NullKind {
    /// `_\r\n`
    Plain,
    /// `$-1\r\n`
    BulkString,
    /// `*-1\r\n`
    Array,
}

/// One RESP value.
///
/// Map and Set do not keep their elements as frames: each key, value and member is kept as its
/// serialized wire form, so the original element types are only recoverable by parsing them
/// again.
#[derive(Clone, Debug)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Array(Vec<Frame>),
    Null(NullKind),
    Boolean(bool),
    Double(f64),
    BigNumber(i64),
    BulkError(Bytes),
    Verbatim { encoding: [u8; 3], text: Bytes },
    Map(HashMap<Bytes, Bytes>),
    Set(HashSet<Bytes>),
    Push(Vec<Frame>),
}

// Protocol specification: https://redis.io/docs/reference/protocol-spec/
impl Frame {
    /// The sentinel returned for missing or expired keys.
    pub fn null_bulk() -> Frame {
        Frame::Null(NullKind::BulkString)
    }

    /// Decodes exactly one frame starting at the buffer cursor.
    ///
    /// An unknown leading byte decodes to a plain null. Text that should hold a number but does
    /// not is a fatal error.
    pub fn parse(src: &mut ReadBuffer) -> Result<Self, Error> {
        // The first byte in an RESP-serialized payload always identifies its type.
        // Subsequent bytes constitute the type's contents.
        let first_byte = src.read_char();
        let Ok(data_type) = DataType::try_from(first_byte) else {
            return Ok(Frame::Null(NullKind::Plain));
        };

        match data_type {
            DataType::SimpleString => Ok(Frame::Simple(get_text(src))),
            DataType::SimpleError => Ok(Frame::Error(get_text(src))),
            DataType::Integer => Ok(Frame::Integer(get_number(src)?)),
            DataType::Double => Ok(Frame::Double(get_number(src)?)),
            DataType::BigNumber => Ok(Frame::BigNumber(get_number(src)?)),
            // $<length>\r\n<data>\r\n
            DataType::BulkString => match get_length(src)? {
                Some(length) => Ok(Frame::Bulk(get_payload(src, length))),
                None => Ok(Frame::Null(NullKind::BulkString)),
            },
            // !<length>\r\n<error>\r\n
            DataType::BulkError => match get_length(src)? {
                Some(length) => Ok(Frame::BulkError(get_payload(src, length))),
                // NOTE: the protocol does not specify a way to represent a null bulk error
                None => Ok(Frame::Null(NullKind::BulkString)),
            },
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => match get_length(src)? {
                Some(count) => Ok(Frame::Array(parse_sequence(src, count)?)),
                None => Ok(Frame::Null(NullKind::Array)),
            },
            DataType::Push => match get_length(src)? {
                Some(count) => Ok(Frame::Push(parse_sequence(src, count)?)),
                None => Ok(Frame::Null(NullKind::Array)),
            },
            DataType::Null => {
                src.skip(CRLF.len());
                Ok(Frame::Null(NullKind::Plain))
            }
            DataType::Boolean => {
                let value = src.read_char() == b't';
                src.skip(CRLF.len());
                Ok(Frame::Boolean(value))
            }
            // =<length>\r\n<encoding>:<data>\r\n
            DataType::VerbatimString => {
                let length = match get_length(src)? {
                    Some(length) if length >= 3 => length,
                    _ => return Ok(Frame::Null(NullKind::Plain)),
                };

                let mut encoding = [b'\0'; 3];
                let read = src.read_exact(encoding.len());
                encoding[..read.len()].copy_from_slice(&read);

                let text = if length > 3 {
                    // Skip the `:` separating the encoding from the data.
                    src.skip(1);
                    Bytes::from(src.read_exact(length - 4))
                } else {
                    Bytes::new()
                };
                src.skip(CRLF.len());

                Ok(Frame::Verbatim { encoding, text })
            }
            // %<number-of-entries>\r\n<key-1><value-1>...<key-n><value-n>
            DataType::Map => {
                let Some(count) = get_length(src)? else {
                    return Ok(Frame::Null(NullKind::Array));
                };

                let mut map = HashMap::new();
                for _ in 0..count {
                    if src.is_exhausted() {
                        break;
                    }
                    let key = Self::parse(src)?;
                    let value = Self::parse(src)?;
                    map.insert(Bytes::from(key.serialize()), Bytes::from(value.serialize()));
                }

                Ok(Frame::Map(map))
            }
            // ~<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Set => {
                let Some(count) = get_length(src)? else {
                    return Ok(Frame::Null(NullKind::Array));
                };

                let mut set = HashSet::new();
                for _ in 0..count {
                    if src.is_exhausted() {
                        break;
                    }
                    let member = Self::parse(src)?;
                    set.insert(Bytes::from(member.serialize()));
                }

                Ok(Frame::Set(set))
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Frame::Simple(s) => line(DataType::SimpleString, s.as_bytes()),
            Frame::Error(s) => line(DataType::SimpleError, s.as_bytes()),
            Frame::Integer(i) => line(DataType::Integer, i.to_string().as_bytes()),
            Frame::Bulk(bytes) => length_prefixed(DataType::BulkString, bytes),
            Frame::Array(arr) => {
                let mut bytes = header(DataType::Array, arr.len());
                for frame in arr {
                    bytes.extend(frame.serialize());
                }
                bytes
            }
            Frame::Null(NullKind::Plain) => line(DataType::Null, b""),
            Frame::Null(NullKind::BulkString) => line(DataType::BulkString, b"-1"),
            Frame::Null(NullKind::Array) => line(DataType::Array, b"-1"),
            Frame::Boolean(b) => line(DataType::Boolean, if *b { b"t" } else { b"f" }),
            Frame::Double(d) => line(DataType::Double, format_double(*d).as_bytes()),
            Frame::BigNumber(n) => line(DataType::BigNumber, n.to_string().as_bytes()),
            Frame::BulkError(bytes) => length_prefixed(DataType::BulkError, bytes),
            Frame::Verbatim { encoding, text } => {
                let mut payload = Vec::with_capacity(encoding.len() + 1 + text.len());
                payload.extend_from_slice(encoding);
                payload.push(b':');
                payload.extend_from_slice(text);
                length_prefixed(DataType::VerbatimString, &payload)
            }
            // Entries are already kept in wire form.
            Frame::Map(map) => {
                let mut bytes = header(DataType::Map, map.len());
                for (key, value) in map {
                    bytes.extend_from_slice(key);
                    bytes.extend_from_slice(value);
                }
                bytes
            }
            Frame::Set(set) => {
                let mut bytes = header(DataType::Set, set.len());
                for member in set {
                    bytes.extend_from_slice(member);
                }
                bytes
            }
            Frame::Push(arr) => {
                let mut bytes = header(DataType::Push, arr.len());
                for frame in arr {
                    bytes.extend(frame.serialize());
                }
                bytes
            }
        }
    }
}

/// Frames are equal when they are of the same kind and hold the same payload. Nulls are all
/// equal to each other, whatever encoding they came from.
impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Frame::Simple(a), Frame::Simple(b)) => a == b,
            (Frame::Error(a), Frame::Error(b)) => a == b,
            (Frame::Integer(a), Frame::Integer(b)) => a == b,
            (Frame::Bulk(a), Frame::Bulk(b)) => a == b,
            (Frame::Array(a), Frame::Array(b)) => a == b,
            (Frame::Null(_), Frame::Null(_)) => true,
            (Frame::Boolean(a), Frame::Boolean(b)) => a == b,
            (Frame::Double(a), Frame::Double(b)) => a == b,
            (Frame::BigNumber(a), Frame::BigNumber(b)) => a == b,
            (Frame::BulkError(a), Frame::BulkError(b)) => a == b,
            (
                Frame::Verbatim { encoding, text },
                Frame::Verbatim {
                    encoding: other_encoding,
                    text: other_text,
                },
            ) => encoding == other_encoding && text == other_text,
            (Frame::Map(a), Frame::Map(b)) => a == b,
            (Frame::Set(a), Frame::Set(b)) => a == b,
            (Frame::Push(a), Frame::Push(b)) => a == b,
            (Frame::Simple(_), _)
            | (Frame::Error(_), _)
            | (Frame::Integer(_), _)
            | (Frame::Bulk(_), _)
            | (Frame::Array(_), _)
            | (Frame::Null(_), _)
            | (Frame::Boolean(_), _)
            | (Frame::Double(_), _)
            | (Frame::BigNumber(_), _)
            | (Frame::BulkError(_), _)
            | (Frame::Verbatim { .. }, _)
            | (Frame::Map(_), _)
            | (Frame::Set(_), _)
            | (Frame::Push(_), _) => false,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Array(arr) | Frame::Push(arr) => {
                let tag = if matches!(self, Frame::Array(_)) { '*' } else { '>' };
                write!(f, "{}{}[", tag, arr.len())?;
                for (i, frame) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", frame)?;
                }
                write!(f, "]")
            }
            Frame::Null(_) => write!(f, "(nil)"),
            Frame::Boolean(b) => write!(f, "#{}", b),
            Frame::Double(d) => write!(f, ",{}", format_double(*d)),
            Frame::BigNumber(n) => write!(f, "({}", n),
            Frame::BulkError(bytes) => write!(f, "!{}", String::from_utf8_lossy(bytes)),
            Frame::Verbatim { encoding, text } => write!(
                f,
                "={}:{}",
                String::from_utf8_lossy(encoding),
                String::from_utf8_lossy(text)
            ),
            Frame::Map(map) => write!(f, "%{}", map.len()),
            Frame::Set(set) => write!(f, "~{}", set.len()),
        }
    }
}

fn parse_sequence(src: &mut ReadBuffer, count: usize) -> Result<Vec<Frame>, Error> {
    let mut frames = Vec::with_capacity(count.min(src.capacity()));
    for _ in 0..count {
        // A declared count larger than what one chunk can hold would otherwise keep producing
        // nulls read from past the end.
        if src.is_exhausted() {
            break;
        }
        frames.push(Frame::parse(src)?);
    }

    Ok(frames)
}

/// Text lines are never rejected: bytes that are not UTF-8 are replaced.
fn get_text(src: &mut ReadBuffer) -> String {
    String::from_utf8_lossy(&src.read_line()).into_owned()
}

fn get_number<T: FromStr>(src: &mut ReadBuffer) -> Result<T, Error> {
    let text = get_text(src);
    text.parse::<T>().map_err(|_| Error::InvalidNumber(text))
}

/// Reads a length or count line. Negative values announce a null.
fn get_length(src: &mut ReadBuffer) -> Result<Option<usize>, Error> {
    let length: i64 = get_number(src)?;
    Ok(usize::try_from(length).ok())
}

fn get_payload(src: &mut ReadBuffer, length: usize) -> Bytes {
    let data = src.read_exact(length);
    src.skip(CRLF.len());
    Bytes::from(data)
}

fn line(data_type: DataType, content: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(1 + content.len() + CRLF.len());
    bytes.push(u8::from(data_type));
    bytes.extend_from_slice(content);
    bytes.extend_from_slice(CRLF);
    bytes
}

fn header(data_type: DataType, length: usize) -> Vec<u8> {
    line(data_type, length.to_string().as_bytes())
}

fn length_prefixed(data_type: DataType, payload: &[u8]) -> Vec<u8> {
    let mut bytes = header(data_type, payload.len());
    bytes.reserve(payload.len() + CRLF.len());
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(CRLF);
    bytes
}

fn format_double(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        value.to_string()
    }
}

#[derive(Debug)]
enum DataType {
    SimpleString,   // '+'
    BulkString,     // '$'
    VerbatimString, // '='
    SimpleError,    // '-'
    BulkError,      // '!'
    Boolean,        // '#'
    Integer,        // ':'
    Double,         // ','
    BigNumber,      // '('
    Array,          // '*'
    Map,            // '%'
    Set,            // '~'
    Push,           // '>'
    // Due to historical reasons, RESP2 features two specially crafted values for representing null
    // values of bulk strings and arrays. The null type, introduced in RESP3, aims to fix this.
    Null, // '_'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'!' => Ok(Self::BulkError),
            b'*' => Ok(Self::Array),
            b'_' => Ok(Self::Null),
            b'#' => Ok(Self::Boolean),
            b',' => Ok(Self::Double),
            b'(' => Ok(Self::BigNumber),
            b'=' => Ok(Self::VerbatimString),
            b'%' => Ok(Self::Map),
            b'~' => Ok(Self::Set),
            b'>' => Ok(Self::Push),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::BulkError => b'!',
            DataType::Array => b'*',
            DataType::Null => b'_',
            DataType::Boolean => b'#',
            DataType::Double => b',',
            DataType::BigNumber => b'(',
            DataType::VerbatimString => b'=',
            DataType::Map => b'%',
            DataType::Set => b'~',
            DataType::Push => b'>',
        }
    }
}
