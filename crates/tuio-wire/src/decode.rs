//! Reference decoder for OSC packets
//!
//! Independent read-side used by round-trip tests and debugging tools.
//! The broadcast path never decodes; correctness of the encoder is
//! checked against this implementation.

use tuio_core::{SimError, SimResult};

use crate::{padded_str_len, OscArg, OscMessage, TimeTag, BUNDLE_MARKER};

/// A decoded OSC packet: either a single message or a bundle.
#[derive(Clone, Debug, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(OscBundle),
}

/// A decoded OSC bundle.
#[derive(Clone, Debug, PartialEq)]
pub struct OscBundle {
    pub time_tag: TimeTag,
    pub elements: Vec<OscPacket>,
}

impl OscBundle {
    /// Top-level messages in bundle order.
    pub fn messages(&self) -> impl Iterator<Item = &OscMessage> {
        self.elements.iter().filter_map(|e| match e {
            OscPacket::Message(msg) => Some(msg),
            OscPacket::Bundle(_) => None,
        })
    }

    /// Messages matching an address, in bundle order.
    pub fn messages_with_addr<'a>(&'a self, addr: &'a str) -> impl Iterator<Item = &'a OscMessage> {
        self.messages().filter(move |m| m.addr == addr)
    }
}

/// Decode a packet, dispatching on the bundle marker.
pub fn decode_packet(buf: &[u8]) -> SimResult<OscPacket> {
    if buf.len() >= BUNDLE_MARKER.len() && &buf[..BUNDLE_MARKER.len()] == BUNDLE_MARKER {
        decode_bundle(buf).map(OscPacket::Bundle)
    } else {
        decode_message(buf).map(OscPacket::Message)
    }
}

fn decode_bundle(buf: &[u8]) -> SimResult<OscBundle> {
    if buf.len() < 16 {
        return Err(SimError::BufferTooShort {
            expected: 16,
            actual: buf.len(),
        });
    }

    let time_tag = TimeTag {
        seconds: u32::from_be_bytes(buf[8..12].try_into().unwrap()),
        fractional: u32::from_be_bytes(buf[12..16].try_into().unwrap()),
    };

    let mut elements = Vec::new();
    let mut offset = 16;
    while offset < buf.len() {
        if buf.len() - offset < 4 {
            return Err(SimError::InvalidWireFormat(
                "dangling bytes after last bundle element".into(),
            ));
        }
        let len = u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap()) as usize;
        offset += 4;
        if buf.len() - offset < len {
            return Err(SimError::BufferTooShort {
                expected: offset + len,
                actual: buf.len(),
            });
        }
        elements.push(decode_packet(&buf[offset..offset + len])?);
        offset += len;
    }

    Ok(OscBundle { time_tag, elements })
}

fn decode_message(buf: &[u8]) -> SimResult<OscMessage> {
    let (addr, offset) = read_padded_str(buf, 0)?;
    if !addr.starts_with('/') {
        return Err(SimError::InvalidWireFormat(format!(
            "address {addr:?} does not start with '/'"
        )));
    }

    let (tags, mut offset) = read_padded_str(buf, offset)?;
    let tags = tags.strip_prefix(',').ok_or_else(|| {
        SimError::InvalidWireFormat(format!("type tag string {tags:?} does not start with ','"))
    })?;

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        match tag {
            'i' => {
                let bytes = take(buf, offset, 4)?;
                args.push(OscArg::Int(i32::from_be_bytes(bytes.try_into().unwrap())));
                offset += 4;
            }
            'f' => {
                let bytes = take(buf, offset, 4)?;
                args.push(OscArg::Float(f32::from_be_bytes(bytes.try_into().unwrap())));
                offset += 4;
            }
            's' => {
                let (s, next) = read_padded_str(buf, offset)?;
                args.push(OscArg::Str(s));
                offset = next;
            }
            't' => {
                let bytes = take(buf, offset, 8)?;
                args.push(OscArg::Time(TimeTag {
                    seconds: u32::from_be_bytes(bytes[0..4].try_into().unwrap()),
                    fractional: u32::from_be_bytes(bytes[4..8].try_into().unwrap()),
                }));
                offset += 8;
            }
            other => {
                return Err(SimError::InvalidWireFormat(format!(
                    "unsupported type tag '{other}'"
                )))
            }
        }
    }

    Ok(OscMessage {
        addr,
        args,
    })
}

fn take(buf: &[u8], offset: usize, len: usize) -> SimResult<&[u8]> {
    if buf.len() < offset + len {
        return Err(SimError::BufferTooShort {
            expected: offset + len,
            actual: buf.len(),
        });
    }
    Ok(&buf[offset..offset + len])
}

fn read_padded_str(buf: &[u8], offset: usize) -> SimResult<(String, usize)> {
    let rel = buf[offset..]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| SimError::InvalidWireFormat("unterminated string".into()))?;
    let s = std::str::from_utf8(&buf[offset..offset + rel])
        .map_err(|_| SimError::InvalidWireFormat("non-utf8 string".into()))?
        .to_string();
    let next = offset + padded_str_len(&s);
    if next > buf.len() {
        return Err(SimError::BufferTooShort {
            expected: next,
            actual: buf.len(),
        });
    }
    Ok((s, next))
}
