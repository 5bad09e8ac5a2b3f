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

use std::io::{BufReader, Read};

use bytes::{BufMut, Bytes};
use log::trace;

use crate::{DataItem, DataLinkError, Result};

/// Incremental frame parser over any byte stream.
///
/// Transport is the caller's business (TCP, serial, an in-memory cursor in
/// tests); this only needs `Read`.
pub struct MessageReader<R: Read> {
    reader: BufReader<R>,
    buffer: Vec<u8>
}

impl<R: Read> MessageReader<R> {
    pub fn new(stream: R) -> Self {
        Self {
            reader: BufReader::new(stream),
            buffer: Vec::new()
        }
    }

    fn fill_buffer(&mut self) -> Result<usize> {
        let mut buf = vec![0; 512];
        let len = self.reader.read(&mut buf)?;
        if len == 0 {
            return Err(DataLinkError::Disconnected);
        }
        self.buffer.put(&buf[..len]);
        trace!("Read {:x?}", &buf[..len]);
        Ok(len)
    }

    /// Block until one complete data item has been read. Garbage between
    /// frames is discarded while scanning for the next preamble.
    pub fn read_item(&mut self) -> Result<DataItem> {
        loop {
            if let Some(item) = self.try_parse()? {
                return Ok(item);
            }
            self.fill_buffer()?;
        }
    }

    fn try_parse(&mut self) -> Result<Option<DataItem>> {
        // search for preamble in buffer
        let preamble_pos = self.buffer
            .windows(DataItem::PREAMBLE.len())
            .enumerate()
            .find(|(_, data)| *data == &DataItem::PREAMBLE)
            .map(|(idx, _)| idx);

        let Some(idx) = preamble_pos else {
            return Ok(None);
        };

        // discard any data before preamble
        if idx > 0 {
            trace!("Discarding unexpected data {:x?}", &self.buffer[..idx]);
            self.buffer.drain(..idx);
        }

        let frame_data = Bytes::from(self.buffer.clone());
        if let Some((len, item)) = DataItem::parse(frame_data)? {
            trace!("Parsed item, consumed {} bytes from buffer", len);
            // remove parsed frame data from buffer
            self.buffer.drain(..len);
            Ok(Some(item))
        } else {
            // incomplete frame; caller reads more
            Ok(None)
        }
    }
}
