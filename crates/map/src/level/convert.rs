//! Map format conversion.

use tracing::info;

use super::LevelMap;
use crate::types::{LineId, MapError, MapFormat};

/// Hexen line flag argument bits and the UDMF boolean each becomes
const FLAG_PROPERTIES: [(i32, &str); 7] = [
    (1, "zoneboundary"),
    (2, "jumpover"),
    (4, "blockfloaters"),
    (8, "clipmidtex"),
    (16, "wrapmidtex"),
    (32, "midtex3d"),
    (64, "checkswitchrange"),
];

impl LevelMap {
    /// Convert the map to Hexen format. Only a map that already is Hexen
    /// can be converted.
    pub fn convert_to_hexen(&mut self) -> Result<(), MapError> {
        if self.format == MapFormat::Hexen {
            return Ok(());
        }
        Err(MapError::UnsupportedConversion {
            from: self.format,
            to: MapFormat::Hexen,
        })
    }

    /// Convert the map to UDMF format.
    ///
    /// From Hexen, specials that carried a line id or line flags in their
    /// arguments (Line_SetIdentification and friends) have those moved to the
    /// line id and boolean flag properties. Doom maps cannot be converted.
    pub fn convert_to_udmf(&mut self) -> Result<(), MapError> {
        match self.format {
            MapFormat::Udmf => return Ok(()),
            MapFormat::Doom => {
                return Err(MapError::UnsupportedConversion {
                    from: MapFormat::Doom,
                    to: MapFormat::Udmf,
                });
            }
            MapFormat::Hexen => {}
        }

        for line in self.lines.clone() {
            self.convert_hexen_line(line)?;
        }
        self.format = MapFormat::Udmf;
        info!("Converted map from Hexen to UDMF ({} lines)", self.lines.len());
        Ok(())
    }

    fn convert_hexen_line(&mut self, line: LineId) -> Result<(), MapError> {
        let arg = |map: &LevelMap, n: usize| map.int_property(line, &format!("arg{n}"));
        let mut flags = 0;

        match self.int_property(line, "special") {
            1 => {
                self.set_int_property(line, "id", arg(self, 3))?;
                self.set_int_property(line, "arg3", 0)?;
            }
            5 => {
                self.set_int_property(line, "id", arg(self, 4))?;
                self.set_int_property(line, "arg4", 0)?;
            }
            121 => {
                let id = arg(self, 4) * 256 + arg(self, 0);
                flags = arg(self, 1);
                self.set_int_property(line, "special", 0)?;
                self.set_int_property(line, "id", id)?;
                for n in 0..5 {
                    self.set_int_property(line, &format!("arg{n}"), 0)?;
                }
            }
            160 => {
                let high = arg(self, 4);
                let id = if arg(self, 1) & 8 != 0 {
                    high
                } else {
                    high * 256 + arg(self, 0)
                };
                self.set_int_property(line, "id", id)?;
                self.set_int_property(line, "arg4", 0)?;
            }
            181 => {
                self.set_int_property(line, "id", arg(self, 2))?;
                self.set_int_property(line, "arg2", 0)?;
            }
            208 => {
                // arg0 stays: the special still uses it
                flags = arg(self, 3);
                self.set_int_property(line, "id", arg(self, 0))?;
                self.set_int_property(line, "arg3", 0)?;
            }
            215 => {
                self.set_int_property(line, "id", arg(self, 0))?;
                self.set_int_property(line, "arg0", 0)?;
            }
            222 => {
                self.set_int_property(line, "id", arg(self, 0))?;
            }
            _ => {}
        }

        for (bit, name) in FLAG_PROPERTIES {
            if flags & bit != 0 {
                self.set_bool_property(line, name, true)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use planar_config::EditConfig;

    use super::*;

    fn hexen_line(map: &mut LevelMap, special: i32, args: [i32; 5]) -> LineId {
        let y = map.line_count() as f64 * 16.0;
        let line = map.create_line(0.0, y, 64.0, y, -1.0).unwrap();
        map.set_int_property(line, "special", special).unwrap();
        for (n, value) in args.iter().enumerate() {
            map.set_int_property(line, &format!("arg{n}"), *value).unwrap();
        }
        line
    }

    #[test]
    fn test_hexen_to_udmf() {
        let mut map = LevelMap::new(MapFormat::Hexen, EditConfig::default());
        let set_id = hexen_line(&mut map, 121, [5, 3, 0, 0, 1]);
        let polyobj = hexen_line(&mut map, 1, [1, 0, 0, 9, 0]);
        let midtex = hexen_line(&mut map, 208, [7, 0, 0, 8, 0]);
        let plane_align = hexen_line(&mut map, 160, [4, 8, 0, 0, 2]);
        let door = hexen_line(&mut map, 12, [1, 16, 0, 0, 0]);

        map.convert_to_udmf().unwrap();
        assert_eq!(map.format(), MapFormat::Udmf);

        assert_eq!(map.int_property(set_id, "id"), 261);
        assert_eq!(map.int_property(set_id, "special"), 0);
        assert_eq!(map.int_property(set_id, "arg0"), 0);
        assert!(map.bool_property(set_id, "zoneboundary"));
        assert!(map.bool_property(set_id, "jumpover"));
        assert!(!map.bool_property(set_id, "blockfloaters"));

        assert_eq!(map.int_property(polyobj, "id"), 9);
        assert_eq!(map.int_property(polyobj, "arg3"), 0);
        assert_eq!(map.int_property(polyobj, "arg0"), 1);

        assert_eq!(map.int_property(midtex, "id"), 7);
        assert_eq!(map.int_property(midtex, "arg0"), 7);
        assert!(map.bool_property(midtex, "clipmidtex"));

        // Flag bit 8 means arg4 is the whole id; no flags are kept
        assert_eq!(map.int_property(plane_align, "id"), 2);
        assert_eq!(map.int_property(plane_align, "arg4"), 0);
        assert!(!map.bool_property(plane_align, "clipmidtex"));

        assert_eq!(map.int_property(door, "id"), 0);
        assert_eq!(map.int_property(door, "arg1"), 16);
    }

    #[test]
    fn test_unsupported_conversions() {
        let mut doom = LevelMap::new(MapFormat::Doom, EditConfig::default());
        assert_eq!(
            doom.convert_to_udmf(),
            Err(MapError::UnsupportedConversion {
                from: MapFormat::Doom,
                to: MapFormat::Udmf
            })
        );
        assert_eq!(doom.format(), MapFormat::Doom);
        assert!(doom.convert_to_hexen().is_err());

        let mut hexen = LevelMap::new(MapFormat::Hexen, EditConfig::default());
        assert!(hexen.convert_to_hexen().is_ok());

        let mut udmf = LevelMap::new(MapFormat::Udmf, EditConfig::default());
        assert!(udmf.convert_to_udmf().is_ok());
        assert!(udmf.convert_to_hexen().is_err());
    }
}
