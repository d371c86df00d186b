//! Tag and id lookups, and line texture requirements.

use planar_config::NO_TEXTURE;

use super::LevelMap;
use super::properties::SidePart;
use crate::rules::{RuleLookup, TagType};
use crate::types::{LineId, MapFormat, ObjectKind, SectorId, TextureParts, ThingId, VertexId};

/// Height differences at or below this are treated as level
const HEIGHT_EPSILON: f64 = 0.001;

impl LevelMap {
    // ========================================================================
    // Tag and id lookups
    // ========================================================================

    /// Sectors with tag `tag` (never matches tag 0)
    pub fn sectors_by_tag(&self, tag: i32) -> Vec<SectorId> {
        if tag == 0 {
            return Vec::new();
        }
        self.sectors().filter(|s| s.tag == tag).map(|s| s.id).collect()
    }

    /// Things with thing id `id`, optionally restricted to `thing_type`
    /// (0 for any type)
    pub fn things_by_id(&self, id: i32, thing_type: i32) -> Vec<ThingId> {
        if id == 0 {
            return Vec::new();
        }
        self.things()
            .filter(|t| t.properties.int_or("id", 0) == id)
            .filter(|t| thing_type == 0 || t.thing_type == thing_type)
            .map(|t| t.id)
            .collect()
    }

    /// Lines with line id `id` (never matches id 0)
    pub fn lines_by_id(&self, id: i32) -> Vec<LineId> {
        if id == 0 {
            return Vec::new();
        }
        self.lines().filter(|l| l.line_id == id).map(|l| l.id).collect()
    }

    /// Lines whose special targets objects of `kind` with id `id`, as
    /// described by `rules`
    pub fn tagging_lines_by_id(&self, id: i32, kind: ObjectKind, rules: &dyn RuleLookup) -> Vec<LineId> {
        let matches = |value: i32| value != 0 && value == id;

        self.lines()
            .filter(|line| line.special != 0)
            .filter(|line| {
                let arg0 = line.properties.int_or("arg0", 0);
                let arg1 = line.properties.int_or("arg1", 0);
                match rules.special_tag_type(line.special, self.format) {
                    TagType::None => false,
                    TagType::Sector => kind == ObjectKind::Sector && matches(arg0),
                    TagType::Line => kind == ObjectKind::Line && matches(arg0),
                    TagType::LineNegative => kind == ObjectKind::Line && matches(arg0.abs()),
                    TagType::Thing => kind == ObjectKind::Thing && matches(arg0),
                    TagType::Thing1Sector2 => match kind {
                        ObjectKind::Thing => matches(arg0),
                        ObjectKind::Sector => matches(arg1),
                        _ => false,
                    },
                    TagType::Sector1Sector2 => {
                        kind == ObjectKind::Sector && (matches(arg0) || matches(arg1))
                    }
                    TagType::Line1Sector2 => match kind {
                        ObjectKind::Line => matches(arg0),
                        ObjectKind::Sector => matches(arg1),
                        _ => false,
                    },
                }
            })
            .map(|line| line.id)
            .collect()
    }

    /// Lowest sector tag not used by any sector
    pub fn find_unused_sector_tag(&self) -> i32 {
        lowest_unused(self.sectors().map(|s| s.tag))
    }

    /// Lowest thing id not used by any thing
    pub fn find_unused_thing_id(&self) -> i32 {
        lowest_unused(self.things().map(|t| t.properties.int_or("id", 0)))
    }

    /// Lowest line id not in use. Where the id lives depends on the format:
    /// the line id field (UDMF), arg0 of special 121 (Hexen), or arg0 (Doom).
    pub fn find_unused_line_id(&self) -> i32 {
        match self.format {
            MapFormat::Udmf => lowest_unused(self.lines().map(|l| l.line_id)),
            MapFormat::Hexen => lowest_unused(
                self.lines()
                    .filter(|l| l.special == 121)
                    .map(|l| l.properties.int_or("arg0", 0)),
            ),
            MapFormat::Doom => lowest_unused(self.lines().map(|l| l.properties.int_or("arg0", 0))),
        }
    }

    // ========================================================================
    // Textures
    // ========================================================================

    /// First texture other than `"-"` in `parts` on any line touching
    /// `vertex`, or `"-"` if there is none
    pub fn adjacent_line_texture(&self, vertex: VertexId, parts: TextureParts) -> String {
        let Some(vertex) = self.vertex(vertex) else {
            return NO_TEXTURE.to_string();
        };

        for &line_id in vertex.connected_lines() {
            let Some(line) = self.line(line_id) else {
                continue;
            };
            let sides = [
                (line.side1, [TextureParts::FRONT_MIDDLE, TextureParts::FRONT_UPPER, TextureParts::FRONT_LOWER]),
                (line.side2, [TextureParts::BACK_MIDDLE, TextureParts::BACK_UPPER, TextureParts::BACK_LOWER]),
            ];
            for (side, side_parts) in sides {
                let Some(side) = side.and_then(|s| self.side(s)) else {
                    continue;
                };
                let textures = [&side.tex_middle, &side.tex_upper, &side.tex_lower];
                for (texture, part) in textures.into_iter().zip(side_parts) {
                    if parts.contains(part) && texture != NO_TEXTURE {
                        return texture.clone();
                    }
                }
            }
        }
        NO_TEXTURE.to_string()
    }

    /// Texture parts the line needs to be drawn without gaps.
    ///
    /// One-sided lines need their front middle texture. Two-sided lines need
    /// upper and lower textures where the floor or ceiling heights of the
    /// two sectors differ at either endpoint.
    pub fn needs_texture(&self, id: LineId) -> TextureParts {
        let Some(front) = self.line_front_sector(id).and_then(|s| self.sector(s)) else {
            return TextureParts::NONE;
        };
        let Some(back) = self.line_back_sector(id).and_then(|s| self.sector(s)) else {
            return TextureParts::FRONT_MIDDLE;
        };
        let Some(seg) = self.line_seg(id) else {
            return TextureParts::NONE;
        };

        let (floor_front, floor_back) = (front.floor_plane(), back.floor_plane());
        let (ceiling_front, ceiling_back) = (front.ceiling_plane(), back.ceiling_plane());

        let mut parts = TextureParts::NONE;
        for p in [seg.p1, seg.p2] {
            let front_height = floor_front.height_at(p.x, p.y);
            let back_height = floor_back.height_at(p.x, p.y);
            if front_height - back_height > HEIGHT_EPSILON {
                parts |= TextureParts::BACK_LOWER;
            }
            if back_height - front_height > HEIGHT_EPSILON {
                parts |= TextureParts::FRONT_LOWER;
            }

            let front_height = ceiling_front.height_at(p.x, p.y);
            let back_height = ceiling_back.height_at(p.x, p.y);
            if back_height - front_height > HEIGHT_EPSILON {
                parts |= TextureParts::BACK_UPPER;
            }
            if front_height - back_height > HEIGHT_EPSILON {
                parts |= TextureParts::FRONT_UPPER;
            }
        }
        parts
    }

    /// Set every texture the line does not need to `"-"`
    pub fn clear_unneeded_textures(&mut self, id: LineId) {
        let needed = self.needs_texture(id);
        let Some(line) = self.line(id) else {
            return;
        };
        let slots = [
            (line.side1, [TextureParts::FRONT_UPPER, TextureParts::FRONT_MIDDLE, TextureParts::FRONT_LOWER]),
            (line.side2, [TextureParts::BACK_UPPER, TextureParts::BACK_MIDDLE, TextureParts::BACK_LOWER]),
        ];

        for (side, parts) in slots {
            let Some(side) = side else {
                continue;
            };
            let side_parts = [SidePart::Upper, SidePart::Middle, SidePart::Lower];
            for (slot, part) in side_parts.into_iter().zip(parts) {
                if !needed.contains(part) {
                    self.set_side_texture(side, slot, NO_TEXTURE);
                }
            }
            self.touch::<crate::entities::Side>(side);
        }
    }
}

/// Smallest positive integer not produced by `used`
fn lowest_unused(used: impl Iterator<Item = i32>) -> i32 {
    let mut used: Vec<i32> = used.filter(|&v| v > 0).collect();
    used.sort_unstable();
    used.dedup();

    let mut candidate = 1;
    for value in used {
        if value != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::test_util::square_room;

    struct TestRules;

    impl RuleLookup for TestRules {
        fn special_tag_type(&self, special: i32, _format: MapFormat) -> TagType {
            match special {
                62 => TagType::Sector,
                70 => TagType::Thing1Sector2,
                90 => TagType::LineNegative,
                _ => TagType::None,
            }
        }
    }

    #[test]
    fn test_lowest_unused() {
        assert_eq!(lowest_unused([].into_iter()), 1);
        assert_eq!(lowest_unused([1, 2, 4].into_iter()), 3);
        assert_eq!(lowest_unused([3, 2, 2, 1, 0, -5].into_iter()), 4);
    }

    #[test]
    fn test_sectors_by_tag() {
        let mut map = LevelMap::default();
        let (a, _) = square_room(&mut map, 0.0, 0.0, 64.0);
        let (b, _) = square_room(&mut map, 128.0, 0.0, 64.0);
        map.set_int_property(a, "id", 5).unwrap();
        map.set_int_property(b, "id", 5).unwrap();

        assert_eq!(map.sectors_by_tag(5), vec![a, b]);
        assert!(map.sectors_by_tag(0).is_empty());
        assert_eq!(map.find_unused_sector_tag(), 1);
        map.set_int_property(a, "id", 1).unwrap();
        assert_eq!(map.find_unused_sector_tag(), 2);
    }

    #[test]
    fn test_things_by_id() {
        let mut map = LevelMap::new(MapFormat::Hexen, Default::default());
        let a = map.create_thing(0.0, 0.0);
        let b = map.create_thing(10.0, 0.0);
        map.set_int_property(a, "id", 3).unwrap();
        map.set_int_property(b, "id", 3).unwrap();
        map.set_int_property(b, "type", 9001).unwrap();

        assert_eq!(map.things_by_id(3, 0), vec![a, b]);
        assert_eq!(map.things_by_id(3, 9001), vec![b]);
        assert!(map.things_by_id(0, 0).is_empty());
        assert_eq!(map.find_unused_thing_id(), 1);
    }

    #[test]
    fn test_tagging_lines_by_id() {
        let mut map = LevelMap::new(MapFormat::Hexen, Default::default());
        let door = map.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        let teleport = map.create_line(0.0, 64.0, 64.0, 64.0, -1.0).unwrap();
        let mirror = map.create_line(0.0, 128.0, 64.0, 128.0, -1.0).unwrap();

        map.set_int_property(door, "special", 62).unwrap();
        map.set_int_property(door, "arg0", 4).unwrap();
        map.set_int_property(teleport, "special", 70).unwrap();
        map.set_int_property(teleport, "arg0", 4).unwrap();
        map.set_int_property(teleport, "arg1", 7).unwrap();
        map.set_int_property(mirror, "special", 90).unwrap();
        map.set_int_property(mirror, "arg0", -4).unwrap();

        assert_eq!(map.tagging_lines_by_id(4, ObjectKind::Sector, &TestRules), vec![door]);
        assert_eq!(map.tagging_lines_by_id(7, ObjectKind::Sector, &TestRules), vec![teleport]);
        assert_eq!(map.tagging_lines_by_id(4, ObjectKind::Thing, &TestRules), vec![teleport]);
        assert_eq!(map.tagging_lines_by_id(4, ObjectKind::Line, &TestRules), vec![mirror]);
        assert!(map.tagging_lines_by_id(0, ObjectKind::Sector, &TestRules).is_empty());
    }

    #[test]
    fn test_find_unused_line_id_by_format() {
        let mut udmf = LevelMap::new(MapFormat::Udmf, Default::default());
        let line = udmf.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        udmf.set_int_property(line, "id", 1).unwrap();
        assert_eq!(udmf.find_unused_line_id(), 2);

        let mut hexen = LevelMap::new(MapFormat::Hexen, Default::default());
        let line = hexen.create_line(0.0, 0.0, 64.0, 0.0, -1.0).unwrap();
        hexen.set_int_property(line, "arg0", 1).unwrap();
        assert_eq!(hexen.find_unused_line_id(), 1);
        hexen.set_int_property(line, "special", 121).unwrap();
        assert_eq!(hexen.find_unused_line_id(), 2);
    }

    #[test]
    fn test_adjacent_line_texture() {
        let mut map = LevelMap::default();
        let (_, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        let corner = map.line(lines[0]).unwrap().v2();
        assert_eq!(map.adjacent_line_texture(corner, TextureParts::ALL), "-");

        map.set_string_property(lines[1], "side1.texturetop", "METAL").unwrap();
        assert_eq!(map.adjacent_line_texture(corner, TextureParts::ALL), "METAL");
        assert_eq!(map.adjacent_line_texture(corner, TextureParts::FRONT_MIDDLE), "-");
    }

    #[test]
    fn test_needs_texture() {
        let mut map = LevelMap::default();
        let (_, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        assert_eq!(map.needs_texture(lines[0]), TextureParts::FRONT_MIDDLE);

        let lone = map.create_line(200.0, 0.0, 264.0, 0.0, -1.0).unwrap();
        assert_eq!(map.needs_texture(lone), TextureParts::NONE);

        // Raised neighbour behind the left wall
        let b = map.create_sector();
        map.apply_sector_defaults(b).unwrap();
        map.set_int_property(b, "heightfloor", 24).unwrap();
        map.set_int_property(b, "heightceiling", 96).unwrap();
        map.set_line_sector(lines[0], b, false).unwrap();

        let parts = map.needs_texture(lines[0]);
        assert_eq!(parts, TextureParts::FRONT_LOWER | TextureParts::FRONT_UPPER);
    }

    #[test]
    fn test_clear_unneeded_textures() {
        let mut map = LevelMap::default();
        let (sector, lines) = square_room(&mut map, 0.0, 0.0, 64.0);
        map.set_line_sector(lines[0], sector, false).unwrap();
        map.set_string_property(lines[0], "side1.texturemiddle", "GRATE").unwrap();
        map.set_string_property(lines[0], "side2.texturetop", "WOOD").unwrap();

        map.clear_unneeded_textures(lines[0]);
        assert_eq!(map.string_property(lines[0], "side1.texturemiddle"), "-");
        assert_eq!(map.string_property(lines[0], "side2.texturetop"), "-");
        assert_eq!(map.texture_usage("GRATE"), 0);
    }
}
