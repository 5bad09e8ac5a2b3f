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

//! Wire format for the phone to watch data-sync channel.
//!
//! A peer pushes *data items*: a path string plus a small map of typed
//! values, optionally carrying a binary asset (e.g. an image). Items are
//! framed with a preamble, a little-endian length, and a CRC16 so they can
//! be parsed out of any byte stream regardless of transport.

mod connection;
mod message;
pub mod weather;

pub use connection::MessageReader;
pub use message::{DataItem, Value};

#[derive(thiserror::Error, Debug)]
pub enum DataLinkError {
    #[error("IoError {0}")]
    IoError(#[from] std::io::Error),
    #[error("Checksum mismatch (recv {recv:#06x}, calc {calc:#06x})")]
    ChecksumMismatch { recv: u16, calc: u16 },
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),
    #[error("Unknown value tag {0:#04x}")]
    UnknownValueTag(u8),
    #[error("Frame truncated")]
    Truncated,
    #[error("Peer closed the stream")]
    Disconnected,
    #[error("Missing entry `{0}`")]
    MissingEntry(&'static str),
}

pub type Result<T> = std::result::Result<T, DataLinkError>;
