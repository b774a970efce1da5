//! OSC 1.0 primitives
//!
//! An OSC message is an address pattern, a type tag string, then the
//! argument payload. Strings are NUL-terminated and padded to the next
//! 4-byte boundary; int32, float32 and time-tag arguments are big-endian
//! and land 4-byte aligned by construction. Nothing here may emit an
//! unaligned value.

use bytes::{BufMut, BytesMut};

use tuio_core::Timestamp;

/// NTP-style OSC time tag: whole seconds + fractional word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeTag {
    pub seconds: u32,
    pub fractional: u32,
}

impl TimeTag {
    /// The "execute immediately" tag defined by the OSC spec.
    pub const IMMEDIATE: TimeTag = TimeTag {
        seconds: 0,
        fractional: 1,
    };

    pub fn from_timestamp(ts: Timestamp) -> Self {
        let (seconds, fractional) = ts.to_time_tag();
        TimeTag {
            seconds,
            fractional,
        }
    }
}

/// One OSC argument.
#[derive(Clone, Debug, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    Str(String),
    Time(TimeTag),
}

impl OscArg {
    #[inline]
    pub fn type_tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::Str(_) => 's',
            OscArg::Time(_) => 't',
        }
    }
}

/// One OSC message: address pattern plus arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct OscMessage {
    pub addr: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    pub fn new(addr: impl Into<String>) -> Self {
        OscMessage {
            addr: addr.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(addr: impl Into<String>, args: Vec<OscArg>) -> Self {
        OscMessage {
            addr: addr.into(),
            args,
        }
    }

    /// Encode into a standalone buffer. The result length is always a
    /// multiple of 4.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.encoded_len());

        put_padded_str(&mut buf, &self.addr);

        let mut tags = String::with_capacity(self.args.len() + 1);
        tags.push(',');
        for arg in &self.args {
            tags.push(arg.type_tag());
        }
        put_padded_str(&mut buf, &tags);

        for arg in &self.args {
            match arg {
                OscArg::Int(v) => buf.put_i32(*v),
                OscArg::Float(v) => buf.put_f32(*v),
                OscArg::Str(s) => put_padded_str(&mut buf, s),
                OscArg::Time(t) => {
                    buf.put_u32(t.seconds);
                    buf.put_u32(t.fractional);
                }
            }
        }

        buf
    }

    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        let mut len = padded_str_len(&self.addr) + padded_str_len_raw(self.args.len() + 1);
        for arg in &self.args {
            len += match arg {
                OscArg::Int(_) | OscArg::Float(_) => 4,
                OscArg::Time(_) => 8,
                OscArg::Str(s) => padded_str_len(s),
            };
        }
        len
    }
}

/// Write a NUL-terminated string padded to the next 4-byte boundary.
pub fn put_padded_str(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    let pad = 4 - (s.len() % 4);
    for _ in 0..pad {
        buf.put_u8(0);
    }
}

/// Encoded size of a padded string (terminator included).
#[inline]
pub fn padded_str_len(s: &str) -> usize {
    padded_str_len_raw(s.len())
}

#[inline]
fn padded_str_len_raw(len: usize) -> usize {
    len + (4 - len % 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_str_boundaries() {
        for s in ["", "a", "ab", "abc", "abcd", "abcde"] {
            let mut buf = BytesMut::new();
            put_padded_str(&mut buf, s);
            assert_eq!(buf.len() % 4, 0, "unaligned for {s:?}");
            assert!(buf.len() > s.len(), "missing terminator for {s:?}");
            assert_eq!(buf.len(), padded_str_len(s));
            assert_eq!(buf[s.len()], 0);
        }
    }

    #[test]
    fn test_message_encoding_aligned() {
        let msg = OscMessage::with_args(
            "/tuio2/frm",
            vec![
                OscArg::Int(1),
                OscArg::Time(TimeTag::IMMEDIATE),
                OscArg::Int(2),
                OscArg::Str("test".to_string()),
            ],
        );
        let buf = msg.encode();
        assert_eq!(buf.len() % 4, 0);
        assert_eq!(buf.len(), msg.encoded_len());
    }

    #[test]
    fn test_known_message_bytes() {
        // "/ab" + NUL, ",i" + 2 NULs, int32 1 big-endian
        let msg = OscMessage::with_args("/ab", vec![OscArg::Int(1)]);
        let buf = msg.encode();
        assert_eq!(
            &buf[..],
            &[b'/', b'a', b'b', 0, b',', b'i', 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_time_tag_from_timestamp() {
        let tag = TimeTag::from_timestamp(Timestamp::from_millis(5000));
        assert_eq!(tag.seconds, 5);
        assert_eq!(tag.fractional, 0);
    }

    #[test]
    fn test_big_endian_float() {
        let msg = OscMessage::with_args("/f", vec![OscArg::Float(1.0)]);
        let buf = msg.encode();
        // 1.0f32 is 0x3F800000
        assert_eq!(&buf[buf.len() - 4..], &[0x3F, 0x80, 0x00, 0x00]);
    }
}
