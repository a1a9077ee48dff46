//! TIFF header and IFD (Image File Directory) parsing.
//!
//! Works on a leading slice of the file rather than `Read + Seek`, so that
//! only the first bytes of a remote COG have to be fetched. Offsets past
//! the end of the slice surface as [`GeoTiffError::Truncated`].

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{GeoTiffError, GeoTiffResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffByteOrder {
    LittleEndian,
    BigEndian,
}

/// Classic TIFF (32-bit offsets) or BigTIFF (64-bit offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffFlavor {
    Classic,
    BigTiff,
}

impl TiffFlavor {
    fn entry_size(self) -> usize {
        match self {
            TiffFlavor::Classic => 12,
            TiffFlavor::BigTiff => 20,
        }
    }

    fn count_size(self) -> usize {
        match self {
            TiffFlavor::Classic => 2,
            TiffFlavor::BigTiff => 8,
        }
    }

    /// Width of the value/offset field of an entry, and of the next-IFD pointer.
    fn offset_size(self) -> usize {
        match self {
            TiffFlavor::Classic => 4,
            TiffFlavor::BigTiff => 8,
        }
    }
}

/// Tag IDs this crate reads.
pub mod tags {
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const MODEL_PIXEL_SCALE: u16 = 33550;
    pub const MODEL_TIEPOINT: u16 = 33922;
    pub const MODEL_TRANSFORMATION: u16 = 34264;
    pub const GEO_KEY_DIRECTORY: u16 = 34735;
}

fn type_byte_size(type_id: u16) -> Option<u64> {
    match type_id {
        1 | 2 | 6 | 7 => Some(1), // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => Some(2),         // SHORT, SSHORT
        4 | 9 | 11 | 13 => Some(4), // LONG, SLONG, FLOAT, IFD
        5 | 10 | 12 => Some(8),   // RATIONAL, SRATIONAL, DOUBLE
        16 | 17 | 18 => Some(8),  // LONG8, SLONG8, IFD8
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct TiffHeader {
    pub byte_order: TiffByteOrder,
    pub flavor: TiffFlavor,
    pub first_ifd_offset: u64,
}

/// One IFD entry with its value location resolved.
#[derive(Debug, Clone)]
pub struct TagEntry {
    pub tag: u16,
    pub type_id: u16,
    pub count: u64,
    /// Absolute file offset of the value bytes.
    pub value_offset: u64,
}

impl TagEntry {
    pub fn value_len(&self) -> u64 {
        type_byte_size(self.type_id).unwrap_or(1) * self.count
    }
}

#[derive(Debug, Clone)]
pub struct Ifd {
    pub entries: Vec<TagEntry>,
    pub next_ifd_offset: u64,
}

impl Ifd {
    pub fn get(&self, tag: u16) -> Option<&TagEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }
}

/// Parse the TIFF or BigTIFF header.
pub fn parse_header(data: &[u8]) -> GeoTiffResult<TiffHeader> {
    ensure(data, 0, 8)?;

    let byte_order = match (data[0], data[1]) {
        (b'I', b'I') => TiffByteOrder::LittleEndian,
        (b'M', b'M') => TiffByteOrder::BigEndian,
        _ => return Err(GeoTiffError::InvalidTiff("invalid byte order marker".into())),
    };

    match read_u16(byte_order, &data[2..4]) {
        42 => Ok(TiffHeader {
            byte_order,
            flavor: TiffFlavor::Classic,
            first_ifd_offset: read_u32(byte_order, &data[4..8]) as u64,
        }),
        43 => {
            ensure(data, 0, 16)?;
            let offset_size = read_u16(byte_order, &data[4..6]);
            if offset_size != 8 {
                return Err(GeoTiffError::InvalidTiff(format!(
                    "BigTIFF offset size {}",
                    offset_size
                )));
            }
            Ok(TiffHeader {
                byte_order,
                flavor: TiffFlavor::BigTiff,
                first_ifd_offset: read_u64(byte_order, &data[8..16]),
            })
        }
        magic => Err(GeoTiffError::InvalidTiff(format!(
            "expected magic 42 or 43, got {}",
            magic
        ))),
    }
}

/// Parse the IFD starting at `offset`.
///
/// `data` is the leading part of the file, starting at byte 0.
pub fn parse_ifd(header: &TiffHeader, data: &[u8], offset: u64) -> GeoTiffResult<Ifd> {
    let order = header.byte_order;
    let flavor = header.flavor;
    let count_size = flavor.count_size();

    let start = ensure(data, offset, count_size as u64)?;
    let entry_count = read_uint(order, &data[start..start + count_size]);

    let entries_len = entry_count
        .checked_mul(flavor.entry_size() as u64)
        .ok_or_else(|| GeoTiffError::InvalidTiff(format!("absurd entry count {}", entry_count)))?;
    let body = ensure(
        data,
        offset + count_size as u64,
        entries_len + flavor.offset_size() as u64,
    )?;

    let mut entries = Vec::with_capacity(entry_count as usize);
    for i in 0..entry_count as usize {
        let pos = body + i * flavor.entry_size();
        let tag = read_u16(order, &data[pos..pos + 2]);
        let type_id = read_u16(order, &data[pos + 2..pos + 4]);

        let (count, field_pos) = match flavor {
            TiffFlavor::Classic => (read_u32(order, &data[pos + 4..pos + 8]) as u64, pos + 8),
            TiffFlavor::BigTiff => (read_u64(order, &data[pos + 4..pos + 12]), pos + 12),
        };
        let field_len = flavor.offset_size();

        let value_len = type_byte_size(type_id).unwrap_or(1) * count;
        let value_offset = if value_len <= field_len as u64 {
            field_pos as u64
        } else {
            read_uint(order, &data[field_pos..field_pos + field_len])
        };

        entries.push(TagEntry {
            tag,
            type_id,
            count,
            value_offset,
        });
    }

    let next_pos = body + entry_count as usize * flavor.entry_size();
    let next_ifd_offset = read_uint(order, &data[next_pos..next_pos + flavor.offset_size()]);

    Ok(Ifd {
        entries,
        next_ifd_offset,
    })
}

/// Read an integer-typed tag (BYTE/SHORT/LONG/LONG8) as `u64` values.
pub fn read_uints(order: TiffByteOrder, entry: &TagEntry, data: &[u8]) -> GeoTiffResult<Vec<u64>> {
    let bytes = value_bytes(entry, data)?;
    let values = match entry.type_id {
        1 => bytes.iter().map(|&b| b as u64).collect(),
        3 => bytes.chunks_exact(2).map(|c| read_u16(order, c) as u64).collect(),
        4 | 13 => bytes.chunks_exact(4).map(|c| read_u32(order, c) as u64).collect(),
        16 | 18 => bytes.chunks_exact(8).map(|c| read_u64(order, c)).collect(),
        other => {
            return Err(GeoTiffError::Unsupported(format!(
                "tag {} has non-integer type {}",
                entry.tag, other
            )))
        }
    };
    Ok(values)
}

/// Read a floating-point tag (FLOAT/DOUBLE) as `f64` values.
pub fn read_f64s(order: TiffByteOrder, entry: &TagEntry, data: &[u8]) -> GeoTiffResult<Vec<f64>> {
    let bytes = value_bytes(entry, data)?;
    let values = match entry.type_id {
        11 => bytes.chunks_exact(4).map(|c| read_f32(order, c) as f64).collect(),
        12 => bytes.chunks_exact(8).map(|c| read_f64(order, c)).collect(),
        other => {
            return Err(GeoTiffError::Unsupported(format!(
                "tag {} has non-float type {}",
                entry.tag, other
            )))
        }
    };
    Ok(values)
}

fn value_bytes<'a>(entry: &TagEntry, data: &'a [u8]) -> GeoTiffResult<&'a [u8]> {
    let start = ensure(data, entry.value_offset, entry.value_len())?;
    Ok(&data[start..start + entry.value_len() as usize])
}

/// Check that `len` bytes at `offset` are present; returns `offset` as an index.
fn ensure(data: &[u8], offset: u64, len: u64) -> GeoTiffResult<usize> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| GeoTiffError::InvalidTiff(format!("offset overflow at {}", offset)))?;
    if end > data.len() as u64 {
        return Err(GeoTiffError::Truncated {
            needed: end,
            available: data.len() as u64,
        });
    }
    Ok(offset as usize)
}

// ---- Byte order helpers ----

fn read_uint(order: TiffByteOrder, data: &[u8]) -> u64 {
    match data.len() {
        2 => read_u16(order, data) as u64,
        4 => read_u32(order, data) as u64,
        _ => read_u64(order, data),
    }
}

fn read_u16(order: TiffByteOrder, data: &[u8]) -> u16 {
    match order {
        TiffByteOrder::LittleEndian => LittleEndian::read_u16(data),
        TiffByteOrder::BigEndian => BigEndian::read_u16(data),
    }
}

fn read_u32(order: TiffByteOrder, data: &[u8]) -> u32 {
    match order {
        TiffByteOrder::LittleEndian => LittleEndian::read_u32(data),
        TiffByteOrder::BigEndian => BigEndian::read_u32(data),
    }
}

fn read_u64(order: TiffByteOrder, data: &[u8]) -> u64 {
    match order {
        TiffByteOrder::LittleEndian => LittleEndian::read_u64(data),
        TiffByteOrder::BigEndian => BigEndian::read_u64(data),
    }
}

fn read_f32(order: TiffByteOrder, data: &[u8]) -> f32 {
    match order {
        TiffByteOrder::LittleEndian => LittleEndian::read_f32(data),
        TiffByteOrder::BigEndian => BigEndian::read_f32(data),
    }
}

fn read_f64(order: TiffByteOrder, data: &[u8]) -> f64 {
    match order {
        TiffByteOrder::LittleEndian => LittleEndian::read_f64(data),
        TiffByteOrder::BigEndian => BigEndian::read_f64(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_both_orders() {
        let header = parse_header(&[b'I', b'I', 42, 0, 8, 0, 0, 0]).unwrap();
        assert_eq!(header.byte_order, TiffByteOrder::LittleEndian);
        assert_eq!(header.flavor, TiffFlavor::Classic);
        assert_eq!(header.first_ifd_offset, 8);

        let header = parse_header(&[b'M', b'M', 0, 42, 0, 0, 0, 8]).unwrap();
        assert_eq!(header.byte_order, TiffByteOrder::BigEndian);
        assert_eq!(header.first_ifd_offset, 8);
    }

    #[test]
    fn test_parse_header_bigtiff() {
        let mut data = vec![b'I', b'I', 43, 0, 8, 0, 0, 0];
        data.extend_from_slice(&16u64.to_le_bytes());
        let header = parse_header(&data).unwrap();
        assert_eq!(header.flavor, TiffFlavor::BigTiff);
        assert_eq!(header.first_ifd_offset, 16);
    }

    #[test]
    fn test_parse_header_rejects_garbage() {
        assert!(matches!(
            parse_header(b"GIF89a\0\0"),
            Err(GeoTiffError::InvalidTiff(_))
        ));
        assert!(matches!(
            parse_header(b"II"),
            Err(GeoTiffError::Truncated { needed: 8, available: 2 })
        ));
    }

    #[test]
    fn test_parse_ifd_inline_short() {
        let mut data = vec![b'I', b'I', 42, 0, 8, 0, 0, 0];
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&tags::IMAGE_WIDTH.to_le_bytes());
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&512u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());

        let header = parse_header(&data).unwrap();
        let ifd = parse_ifd(&header, &data, header.first_ifd_offset).unwrap();
        assert_eq!(ifd.entries.len(), 1);
        assert_eq!(ifd.next_ifd_offset, 0);

        let entry = ifd.get(tags::IMAGE_WIDTH).unwrap();
        assert_eq!(entry.value_offset, 8 + 2 + 8);
        assert_eq!(read_uints(header.byte_order, entry, &data).unwrap(), vec![512]);
    }

    #[test]
    fn test_parse_ifd_reports_needed_bytes() {
        let data = vec![b'I', b'I', 42, 0, 8, 0, 0, 0, 3, 0];
        let header = parse_header(&data).unwrap();
        match parse_ifd(&header, &data, 8) {
            Err(GeoTiffError::Truncated { needed, .. }) => assert_eq!(needed, 8 + 2 + 3 * 12 + 4),
            other => panic!("expected truncation, got {:?}", other),
        }
    }
}
