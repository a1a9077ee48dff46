//! Synthetic GeoTIFF generator for header tests.

#![allow(dead_code)]

/// Builds a classic TIFF with one IFD and no pixel data.
pub struct TiffBuilder {
    big_endian: bool,
    entries: Vec<(u16, u16, u32, Vec<u8>)>,
}

impl TiffBuilder {
    pub fn little_endian() -> Self {
        Self {
            big_endian: false,
            entries: Vec::new(),
        }
    }

    pub fn big_endian() -> Self {
        Self {
            big_endian: true,
            entries: Vec::new(),
        }
    }

    fn u16_bytes(&self, v: u16) -> [u8; 2] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn u32_bytes(&self, v: u32) -> [u8; 4] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    pub fn long(mut self, tag: u16, value: u32) -> Self {
        let bytes = self.u32_bytes(value).to_vec();
        self.entries.push((tag, 4, 1, bytes));
        self
    }

    pub fn shorts(mut self, tag: u16, values: &[u16]) -> Self {
        let bytes = values.iter().flat_map(|&v| self.u16_bytes(v)).collect();
        self.entries.push((tag, 3, values.len() as u32, bytes));
        self
    }

    pub fn doubles(mut self, tag: u16, values: &[f64]) -> Self {
        let bytes = values
            .iter()
            .flat_map(|v| {
                if self.big_endian {
                    v.to_be_bytes()
                } else {
                    v.to_le_bytes()
                }
            })
            .collect();
        self.entries.push((tag, 12, values.len() as u32, bytes));
        self
    }

    /// Standard north-up GeoTIFF in EPSG:3067.
    pub fn tm35fin(width: u32, height: u32, pixel: f64, origin_x: f64, origin_y: f64) -> Self {
        Self::little_endian()
            .long(256, width)
            .long(257, height)
            .doubles(33550, &[pixel, pixel, 0.0])
            .doubles(33922, &[0.0, 0.0, 0.0, origin_x, origin_y, 0.0])
            .shorts(34735, &[1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 3067])
    }

    pub fn build(mut self) -> Vec<u8> {
        self.entries.sort_by_key(|e| e.0);

        let mut out = Vec::new();
        if self.big_endian {
            out.extend_from_slice(b"MM");
        } else {
            out.extend_from_slice(b"II");
        }
        out.extend_from_slice(&self.u16_bytes(42));
        out.extend_from_slice(&self.u32_bytes(8));

        let n = self.entries.len();
        let mut extra_offset = 8 + 2 + n * 12 + 4;
        let mut extra = Vec::new();

        out.extend_from_slice(&self.u16_bytes(n as u16));
        for (tag, type_id, count, bytes) in &self.entries {
            out.extend_from_slice(&self.u16_bytes(*tag));
            out.extend_from_slice(&self.u16_bytes(*type_id));
            out.extend_from_slice(&self.u32_bytes(*count));
            if bytes.len() <= 4 {
                let mut field = bytes.clone();
                field.resize(4, 0);
                out.extend_from_slice(&field);
            } else {
                out.extend_from_slice(&self.u32_bytes(extra_offset as u32));
                extra.extend_from_slice(bytes);
                extra_offset += bytes.len();
            }
        }
        out.extend_from_slice(&self.u32_bytes(0));
        out.extend_from_slice(&extra);
        out
    }
}
