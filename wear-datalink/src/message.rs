/*
 * Sunface - digital weather watch face
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{DataLinkError, Result};

/// A typed value stored in a [`DataItem`] entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Asset(Vec<u8>),
}

impl Value {
    const TAG_FLOAT: u8 = 0x01;
    const TAG_ASSET: u8 = 0x02;
}

/// One pushed data item: a path plus keyed, typed entries.
///
/// The framed form is limited to a 64 KiB payload (u16 length field), which
/// comfortably fits watch-sized assets.
#[derive(Debug, Clone, PartialEq)]
pub struct DataItem {
    pub path: String,
    entries: Vec<(String, Value)>,
}

impl DataItem {
    pub(crate) const PREAMBLE: [u8; 3] = [0xd7, 0x57, 0x44];

    /// Preamble(3) + Len(2) + CRC(2)
    pub(crate) const MIN_RAW_LEN: usize = 7;

    pub fn new<P: Into<String>>(path: P) -> Self {
        Self { path: path.into(), entries: Vec::new() }
    }

    pub fn put_float<K: Into<String>>(&mut self, key: K, value: f64) {
        self.entries.push((key.into(), Value::Float(value)));
    }

    pub fn put_asset<K: Into<String>>(&mut self, key: K, data: Vec<u8>) {
        self.entries.push((key.into(), Value::Asset(data)));
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.entries.iter().find_map(|(k, v)| match v {
            Value::Float(val) if k == key => Some(*val),
            _ => None
        })
    }

    pub fn get_asset(&self, key: &str) -> Option<&[u8]> {
        self.entries.iter().find_map(|(k, v)| match v {
            Value::Asset(data) if k == key => Some(&data[..]),
            _ => None
        })
    }

    pub fn to_bytes(&self) -> Bytes {
        let payload = self.payload_bytes();

        let mut buf = BytesMut::new();
        buf.put(&Self::PREAMBLE[..]);
        buf.put_u16_le(payload.len() as u16);
        buf.put(&payload[..]);
        buf.put_u16_le(crc_from_bytes(&payload));

        buf.freeze()
    }

    fn payload_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();

        buf.put_u16_le(self.path.len() as u16);
        buf.put(self.path.as_bytes());
        buf.put_u8(self.entries.len() as u8);

        for (key, value) in &self.entries {
            buf.put_u8(key.len() as u8);
            buf.put(key.as_bytes());

            match value {
                Value::Float(val) => {
                    buf.put_u8(Value::TAG_FLOAT);
                    buf.put_f64_le(*val);
                }
                Value::Asset(data) => {
                    buf.put_u8(Value::TAG_ASSET);
                    buf.put_u32_le(data.len() as u32);
                    buf.put(&data[..]);
                }
            }
        }

        buf.freeze()
    }

    /// Parse one framed item from the front of `buffer`. The caller has
    /// already located the preamble at offset zero. Returns `None` when the
    /// buffer does not yet hold the complete frame.
    pub(crate) fn parse(mut buffer: Bytes) -> Result<Option<(usize, Self)>> {
        if buffer.remaining() < Self::MIN_RAW_LEN {
            return Ok(None);
        }

        buffer.advance(Self::PREAMBLE.len());
        let payload_len = buffer.get_u16_le() as usize;

        // check if buffer len includes payload and crc field
        if buffer.remaining() < payload_len + 2 {
            return Ok(None);
        }

        let mut payload = vec![0; payload_len];
        buffer.copy_to_slice(&mut payload);

        let checksum = buffer.get_u16_le();
        let calc_checksum = crc_from_bytes(&payload);
        if checksum != calc_checksum {
            return Err(DataLinkError::ChecksumMismatch {
                recv: checksum,
                calc: calc_checksum
            });
        }

        let item = Self::decode_payload(Bytes::from(payload))?;
        let read_len = Self::MIN_RAW_LEN + payload_len;

        Ok(Some((read_len, item)))
    }

    fn decode_payload(mut payload: Bytes) -> Result<Self> {
        let path = take_string(&mut payload, "path")?;
        if payload.remaining() < 1 {
            return Err(DataLinkError::Truncated);
        }
        let entry_count = payload.get_u8();

        let mut item = DataItem::new(path);
        for _ in 0..entry_count {
            let key = take_key(&mut payload)?;

            if payload.remaining() < 1 {
                return Err(DataLinkError::Truncated);
            }
            match payload.get_u8() {
                Value::TAG_FLOAT => {
                    if payload.remaining() < 8 {
                        return Err(DataLinkError::Truncated);
                    }
                    item.put_float(key, payload.get_f64_le());
                }
                Value::TAG_ASSET => {
                    if payload.remaining() < 4 {
                        return Err(DataLinkError::Truncated);
                    }
                    let len = payload.get_u32_le() as usize;
                    if payload.remaining() < len {
                        return Err(DataLinkError::Truncated);
                    }
                    let mut data = vec![0; len];
                    payload.copy_to_slice(&mut data);
                    item.put_asset(key, data);
                }
                tag => return Err(DataLinkError::UnknownValueTag(tag))
            }
        }

        Ok(item)
    }
}

fn take_string(buffer: &mut Bytes, field: &'static str) -> Result<String> {
    if buffer.remaining() < 2 {
        return Err(DataLinkError::Truncated);
    }
    let len = buffer.get_u16_le() as usize;
    take_utf8(buffer, len, field)
}

fn take_key(buffer: &mut Bytes) -> Result<String> {
    if buffer.remaining() < 1 {
        return Err(DataLinkError::Truncated);
    }
    let len = buffer.get_u8() as usize;
    take_utf8(buffer, len, "entry key")
}

fn take_utf8(buffer: &mut Bytes, len: usize, field: &'static str) -> Result<String> {
    if buffer.remaining() < len {
        return Err(DataLinkError::Truncated);
    }
    let mut data = vec![0; len];
    buffer.copy_to_slice(&mut data);
    String::from_utf8(data).map_err(|_| DataLinkError::InvalidUtf8(field))
}

fn crc_from_bytes(input: &[u8]) -> u16 {
    crc16::State::<crc16::XMODEM>::calculate(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> DataItem {
        let mut item = DataItem::new("/weather");
        item.put_float("temp_max", 75.3);
        item.put_float("temp_min", 58.1);
        item.put_asset("condition_image", vec![0x42, 0x4d, 0x00, 0x01]);
        item
    }

    #[test]
    fn frame_round_trip() {
        let item = sample_item();
        let raw = item.to_bytes();

        let (read_len, parsed) = DataItem::parse(raw.clone())
            .expect("parse ok")
            .expect("complete frame");

        assert_eq!(read_len, raw.len());
        assert_eq!(parsed, item);
        assert_eq!(parsed.get_float("temp_max"), Some(75.3));
        assert_eq!(parsed.get_asset("condition_image"), Some(&[0x42, 0x4d, 0x00, 0x01][..]));
    }

    #[test]
    fn partial_frame_is_not_an_error() {
        let raw = sample_item().to_bytes();
        let partial = raw.slice(..raw.len() - 3);

        assert!(DataItem::parse(partial).expect("parse ok").is_none());
    }

    #[test]
    fn corrupt_crc_rejected() {
        let mut raw = sample_item().to_bytes().to_vec();
        let idx = raw.len() - 1;
        raw[idx] ^= 0xff;

        match DataItem::parse(Bytes::from(raw)) {
            Err(DataLinkError::ChecksumMismatch { .. }) => {}
            other => panic!("expected checksum mismatch, got {:?}", other)
        }
    }

    #[test]
    fn corrupt_payload_fails_crc_before_decode() {
        let mut raw = sample_item().to_bytes().to_vec();
        // flip a byte inside the path string
        raw[7] ^= 0xff;

        assert!(DataItem::parse(Bytes::from(raw)).is_err());
    }

    #[test]
    fn unknown_value_tag_rejected() {
        let mut item = DataItem::new("/x");
        item.put_float("k", 1.0);
        let payload = item.payload_bytes().to_vec();

        // corrupt the tag byte and reframe with a valid checksum
        let mut payload = payload;
        let tag_idx = 2 + 2 + 1 + 1 + 1; // path len + path + count + key len + key
        assert_eq!(payload[tag_idx], Value::TAG_FLOAT);
        payload[tag_idx] = 0x7f;

        let mut buf = BytesMut::new();
        buf.put(&DataItem::PREAMBLE[..]);
        buf.put_u16_le(payload.len() as u16);
        buf.put(&payload[..]);
        buf.put_u16_le(crc_from_bytes(&payload));

        match DataItem::parse(buf.freeze()) {
            Err(DataLinkError::UnknownValueTag(0x7f)) => {}
            other => panic!("expected unknown tag error, got {:?}", other)
        }
    }

    #[test]
    fn missing_key_lookups_return_none() {
        let item = sample_item();
        assert_eq!(item.get_float("nope"), None);
        assert_eq!(item.get_asset("temp_max"), None);
    }
}
