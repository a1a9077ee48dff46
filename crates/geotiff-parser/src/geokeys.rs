//! GeoKeyDirectory (tag 34735) decoding.

/// GTModelTypeGeoKey
pub const GT_MODEL_TYPE: u16 = 1024;
/// GeographicTypeGeoKey
pub const GEOGRAPHIC_TYPE: u16 = 2048;
/// ProjectedCSTypeGeoKey
pub const PROJECTED_CS_TYPE: u16 = 3072;

/// "User-defined" marker in GeoKey values.
const USER_DEFINED: u16 = 32767;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;

/// The subset of GeoKeys needed to name the raster's CRS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoKeys {
    pub model_type: Option<u16>,
    pub projected_cs: Option<u16>,
    pub geographic_type: Option<u16>,
}

impl GeoKeys {
    /// Decode from the SHORT values of the directory tag:
    /// `[version, revision, minor, num_keys, (key, location, count, value)*]`.
    ///
    /// Only keys stored directly in the directory (location 0) are read.
    pub fn parse(directory: &[u64]) -> Self {
        let mut keys = GeoKeys::default();
        let Some(&num_keys) = directory.get(3) else {
            return keys;
        };

        for entry in directory[4..].chunks_exact(4).take(num_keys as usize) {
            let (key_id, location, value) = (entry[0] as u16, entry[1], entry[3] as u16);
            if location != 0 {
                continue;
            }
            match key_id {
                GT_MODEL_TYPE => keys.model_type = Some(value),
                PROJECTED_CS_TYPE => keys.projected_cs = Some(value),
                GEOGRAPHIC_TYPE => keys.geographic_type = Some(value),
                _ => {}
            }
        }
        keys
    }

    /// EPSG code of the raster CRS, if it is a registered one.
    pub fn epsg(&self) -> Option<u32> {
        let registered = |code: Option<u16>| code.filter(|&c| c != 0 && c != USER_DEFINED);

        match self.model_type {
            Some(MODEL_TYPE_GEOGRAPHIC) => registered(self.geographic_type),
            Some(MODEL_TYPE_PROJECTED) => registered(self.projected_cs),
            _ => registered(self.projected_cs).or(registered(self.geographic_type)),
        }
        .map(u32::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projected_epsg() {
        let dir = [1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 3067];
        let keys = GeoKeys::parse(&dir);
        assert_eq!(keys.model_type, Some(1));
        assert_eq!(keys.epsg(), Some(3067));
    }

    #[test]
    fn test_geographic_epsg() {
        let dir = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326];
        assert_eq!(GeoKeys::parse(&dir).epsg(), Some(4326));
    }

    #[test]
    fn test_user_defined_has_no_epsg() {
        let dir = [1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32767];
        assert_eq!(GeoKeys::parse(&dir).epsg(), None);
    }

    #[test]
    fn test_short_directory() {
        assert_eq!(GeoKeys::parse(&[1, 1]), GeoKeys::default());
        // num_keys larger than the entries present
        let dir = [1, 1, 0, 9, 3072, 0, 1, 3067];
        assert_eq!(GeoKeys::parse(&dir).epsg(), Some(3067));
    }
}
