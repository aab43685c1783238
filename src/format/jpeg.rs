//! JPEG tile stream preparation.
//!
//! Slide scanners commonly write *abbreviated* JPEG tiles: each tile holds
//! only its scan data, while the quantization (DQT) and Huffman (DHT) tables
//! are stored once per level in the `JPEGTables` tag. Before a tile can be
//! decoded the two streams must be spliced together:
//!
//! ```text
//!   tables: SOI DQT DHT EOI
//!   tile:   SOI SOS <scan> EOI
//!   result: SOI DQT DHT SOS <scan> EOI
//! ```

use bytes::{Bytes, BytesMut};

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];
const DHT: u8 = 0xC4;
const DQT: u8 = 0xDB;
const SOS: u8 = 0xDA;

/// First table or scan marker found after SOI, walking segment headers.
///
/// Returns the marker code (the byte after `0xFF`), or `None` if the stream
/// does not start with SOI or ends before a table/scan marker shows up.
fn first_table_or_scan(data: &[u8]) -> Option<u8> {
    if data.len() < 4 || data[..2] != SOI {
        return None;
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }

        let code = data[pos + 1];
        match code {
            DQT | DHT | SOS => return Some(code),
            // Standalone markers and fill bytes carry no length
            0x00 | 0xD8 | 0xD9 | 0xFF => pos += 2,
            _ if pos + 3 < data.len() => {
                let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                pos += 2 + length;
            }
            _ => pos += 2,
        }
    }

    None
}

/// True when the stream reaches its scan before defining any table.
pub fn is_abbreviated_stream(data: &[u8]) -> bool {
    first_table_or_scan(data) == Some(SOS)
}

/// True when the stream starts with SOI and carries a quantization table.
pub fn is_complete_stream(data: &[u8]) -> bool {
    data.len() >= 4
        && data[..2] == SOI
        && data[2..].windows(2).any(|w| w[0] == 0xFF && w[1] == DQT)
}

/// Splice shared `tables` in front of an abbreviated `tile`.
///
/// The trailing EOI of the tables and the leading SOI of the tile are
/// dropped so that the result holds exactly one of each.
pub fn merge_jpeg_tables(tables: &[u8], tile: &[u8]) -> Bytes {
    if tables.is_empty() {
        return Bytes::copy_from_slice(tile);
    }
    if tile.is_empty() {
        return Bytes::new();
    }

    let tables = tables.strip_suffix(&EOI).unwrap_or(tables);
    let tile = tile.strip_prefix(&SOI).unwrap_or(tile);

    let mut merged = BytesMut::with_capacity(tables.len() + tile.len());
    merged.extend_from_slice(tables);
    merged.extend_from_slice(tile);
    merged.freeze()
}

/// Return a decodable JPEG for `tile`, merging `tables` only when needed.
pub fn prepare_tile_jpeg(tables: Option<&[u8]>, tile: &[u8]) -> Bytes {
    match tables {
        Some(tables) if !is_complete_stream(tile) && is_abbreviated_stream(tile) => {
            merge_jpeg_tables(tables, tile)
        }
        _ => Bytes::copy_from_slice(tile),
    }
}
