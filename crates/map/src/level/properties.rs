//! Typed get/set of entity properties by string key.
//!
//! Built-in keys (positions, relations, textures, heights) are routed to
//! struct fields so that relation and cache bookkeeping runs; any other key
//! lives in the entity's property bag. Lines forward `side1.` / `side2.`
//! prefixed keys to the corresponding side.

use glam::DVec2;

use super::LevelMap;
use crate::entities::{Line, MapEntity, MapObject, Sector, Side, Thing, Vertex};
use crate::property::PropertyValue;
use crate::types::{LineId, MapError, ObjectId, ObjectKind, SectorId, SideId, ThingId, VertexId};

/// Texture slot of a side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SidePart {
    Upper,
    Middle,
    Lower,
}

impl LevelMap {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Value of a property, or `None` if the object or key is unknown
    pub fn property(&self, id: impl Into<ObjectId>, key: &str) -> Option<PropertyValue> {
        let object = self.object(id.into())?;
        match object {
            MapObject::Vertex(v) => match key {
                "x" => Some(v.position.x.into()),
                "y" => Some(v.position.y.into()),
                _ => v.properties.get(key).cloned(),
            },
            MapObject::Line(l) => self.line_property(l, key),
            MapObject::Side(s) => match key {
                "sector" => Some(self.index_or_none::<Sector>(s.sector).into()),
                "texturetop" => Some(s.tex_upper.as_str().into()),
                "texturemiddle" => Some(s.tex_middle.as_str().into()),
                "texturebottom" => Some(s.tex_lower.as_str().into()),
                "offsetx" => Some(s.offset_x.into()),
                "offsety" => Some(s.offset_y.into()),
                _ => s.properties.get(key).cloned(),
            },
            MapObject::Sector(s) => match key {
                "texturefloor" => Some(s.floor_texture.as_str().into()),
                "textureceiling" => Some(s.ceiling_texture.as_str().into()),
                "heightfloor" => Some(s.floor_height.into()),
                "heightceiling" => Some(s.ceiling_height.into()),
                "lightlevel" => Some(s.light.into()),
                "special" => Some(s.special.into()),
                "id" => Some(s.tag.into()),
                _ => s.properties.get(key).cloned(),
            },
            MapObject::Thing(t) => match key {
                "x" => Some(t.position.x.into()),
                "y" => Some(t.position.y.into()),
                "type" => Some(t.thing_type.into()),
                "angle" => Some(t.angle.into()),
                "flags" => Some(t.flags.into()),
                _ => t.properties.get(key).cloned(),
            },
        }
    }

    fn line_property(&self, line: &Line, key: &str) -> Option<PropertyValue> {
        if let Some(rest) = key.strip_prefix("side1.") {
            return line.side1.and_then(|s| self.property(s, rest));
        }
        if let Some(rest) = key.strip_prefix("side2.") {
            return line.side2.and_then(|s| self.property(s, rest));
        }
        match key {
            "v1" => Some(self.index_or_none::<Vertex>(Some(line.v1)).into()),
            "v2" => Some(self.index_or_none::<Vertex>(Some(line.v2)).into()),
            "sidefront" => Some(self.index_or_none::<Side>(line.side1).into()),
            "sideback" => Some(self.index_or_none::<Side>(line.side2).into()),
            "special" => Some(line.special.into()),
            "id" => Some(line.line_id.into()),
            _ => line.properties.get(key).cloned(),
        }
    }

    fn index_or_none<T: MapEntity>(&self, id: Option<T::Id>) -> i32 {
        id.and_then(|id| self.entity_index::<T>(id))
            .map_or(-1, |index| index as i32)
    }

    pub fn bool_property(&self, id: impl Into<ObjectId>, key: &str) -> bool {
        self.property(id, key).is_some_and(|v| v.as_bool())
    }

    pub fn int_property(&self, id: impl Into<ObjectId>, key: &str) -> i32 {
        self.property(id, key).map_or(0, |v| v.as_int())
    }

    pub fn float_property(&self, id: impl Into<ObjectId>, key: &str) -> f64 {
        self.property(id, key).map_or(0.0, |v| v.as_float())
    }

    pub fn string_property(&self, id: impl Into<ObjectId>, key: &str) -> String {
        self.property(id, key).map(|v| v.as_string()).unwrap_or_default()
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Set a property on any live object
    pub fn set_property(
        &mut self,
        id: impl Into<ObjectId>,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), MapError> {
        let id = id.into();
        let kind = self.object_kind(id).ok_or(MapError::UnknownObject(id.0))?;
        match kind {
            ObjectKind::Vertex => self.set_vertex_property(id.into(), key, value),
            ObjectKind::Line => self.set_line_property(id.into(), key, value),
            ObjectKind::Side => self.set_side_property(id.into(), key, value),
            ObjectKind::Sector => self.set_sector_property(id.into(), key, value),
            ObjectKind::Thing => self.set_thing_property(id.into(), key, value),
        }
    }

    pub fn set_bool_property(&mut self, id: impl Into<ObjectId>, key: &str, value: bool) -> Result<(), MapError> {
        self.set_property(id, key, value.into())
    }

    pub fn set_int_property(&mut self, id: impl Into<ObjectId>, key: &str, value: i32) -> Result<(), MapError> {
        self.set_property(id, key, value.into())
    }

    pub fn set_float_property(&mut self, id: impl Into<ObjectId>, key: &str, value: f64) -> Result<(), MapError> {
        self.set_property(id, key, value.into())
    }

    pub fn set_string_property(&mut self, id: impl Into<ObjectId>, key: &str, value: &str) -> Result<(), MapError> {
        self.set_property(id, key, value.into())
    }

    fn set_vertex_property(&mut self, id: VertexId, key: &str, value: PropertyValue) -> Result<(), MapError> {
        let position = self.entity::<Vertex>(id)?.position;
        match key {
            "x" => self.move_vertex(id, value.as_float(), position.y),
            "y" => self.move_vertex(id, position.x, value.as_float()),
            _ => {
                self.entity_mut::<Vertex>(id)?.properties.set(key, value);
                self.touch::<Vertex>(id);
                Ok(())
            }
        }
    }

    fn set_line_property(&mut self, id: LineId, key: &str, value: PropertyValue) -> Result<(), MapError> {
        let line = self.entity::<Line>(id)?;
        if let Some(rest) = key.strip_prefix("side1.") {
            return match line.side1 {
                Some(side) => self.set_side_property(side, rest, value),
                None => Ok(()),
            };
        }
        if let Some(rest) = key.strip_prefix("side2.") {
            return match line.side2 {
                Some(side) => self.set_side_property(side, rest, value),
                None => Ok(()),
            };
        }

        match key {
            "v1" | "v2" => {
                let vertex = self.id_at_index(&self.vertices, ObjectKind::Vertex, value.as_int())?;
                self.set_line_vertex(id, key == "v1", vertex)
            }
            "sidefront" | "sideback" => {
                let side = self.id_at_index(&self.sides, ObjectKind::Side, value.as_int())?;
                self.set_line_side(id, side, key == "sidefront")
            }
            _ => {
                let line = self.entity_mut::<Line>(id)?;
                match key {
                    "special" => line.special = value.as_int(),
                    "id" => line.line_id = value.as_int(),
                    _ => line.properties.set(key, value),
                }
                self.touch::<Line>(id);
                Ok(())
            }
        }
    }

    fn set_side_property(&mut self, id: SideId, key: &str, value: PropertyValue) -> Result<(), MapError> {
        self.entity::<Side>(id)?;
        match key {
            "sector" => {
                let sector = self.id_at_index(&self.sectors, ObjectKind::Sector, value.as_int())?;
                return self.set_side_sector(id, sector);
            }
            "texturetop" => self.set_side_texture(id, SidePart::Upper, &value.as_string()),
            "texturemiddle" => self.set_side_texture(id, SidePart::Middle, &value.as_string()),
            "texturebottom" => self.set_side_texture(id, SidePart::Lower, &value.as_string()),
            _ => {
                let side = self.entity_mut::<Side>(id)?;
                match key {
                    "offsetx" => side.offset_x = value.as_int(),
                    "offsety" => side.offset_y = value.as_int(),
                    _ => side.properties.set(key, value),
                }
            }
        }
        self.touch::<Side>(id);
        Ok(())
    }

    fn set_sector_property(&mut self, id: SectorId, key: &str, value: PropertyValue) -> Result<(), MapError> {
        self.entity::<Sector>(id)?;
        match key {
            "texturefloor" => self.set_sector_flat(id, false, &value.as_string()),
            "textureceiling" => self.set_sector_flat(id, true, &value.as_string()),
            _ => {
                let sector = self.entity_mut::<Sector>(id)?;
                match key {
                    "heightfloor" => sector.floor_height = value.as_int(),
                    "heightceiling" => sector.ceiling_height = value.as_int(),
                    "lightlevel" => sector.light = value.as_int(),
                    "special" => sector.special = value.as_int(),
                    "id" => sector.tag = value.as_int(),
                    _ => sector.properties.set(key, value),
                }
            }
        }
        self.touch::<Sector>(id);
        Ok(())
    }

    fn set_thing_property(&mut self, id: ThingId, key: &str, value: PropertyValue) -> Result<(), MapError> {
        let thing = self.entity_mut::<Thing>(id)?;
        let position = thing.position;
        match key {
            "x" => return self.move_thing(id, value.as_float(), position.y),
            "y" => return self.move_thing(id, position.x, value.as_float()),
            "type" => {
                let old = std::mem::replace(&mut thing.thing_type, value.as_int());
                let new = thing.thing_type;
                self.usage.adjust_thing_type(old, -1);
                self.usage.adjust_thing_type(new, 1);
            }
            "angle" => thing.angle = value.as_int(),
            "flags" => thing.flags = value.as_int(),
            _ => thing.properties.set(key, value),
        }
        self.touch::<Thing>(id);
        self.set_things_updated();
        Ok(())
    }

    fn id_at_index<I: Copy>(&self, list: &[I], kind: ObjectKind, index: i32) -> Result<I, MapError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| list.get(i).copied())
            .ok_or(MapError::InvalidIndex {
                kind,
                index: index.max(0) as usize,
            })
    }

    // ========================================================================
    // Texture setters with usage bookkeeping
    // ========================================================================

    pub(crate) fn set_side_texture(&mut self, id: SideId, part: SidePart, texture: &str) {
        let Some(side) = self.store.get_mut::<Side>(id) else {
            return;
        };
        let slot = match part {
            SidePart::Upper => &mut side.tex_upper,
            SidePart::Middle => &mut side.tex_middle,
            SidePart::Lower => &mut side.tex_lower,
        };
        let old = std::mem::replace(slot, texture.to_string());
        self.usage.adjust_texture(&old, -1);
        self.usage.adjust_texture(texture, 1);
    }

    pub(crate) fn set_sector_flat(&mut self, id: SectorId, ceiling: bool, texture: &str) {
        let Some(sector) = self.store.get_mut::<Sector>(id) else {
            return;
        };
        let slot = if ceiling {
            &mut sector.ceiling_texture
        } else {
            &mut sector.floor_texture
        };
        let old = std::mem::replace(slot, texture.to_string());
        self.usage.adjust_flat(&old, -1);
        self.usage.adjust_flat(texture, 1);
    }

    /// Copy all properties of `source` onto `target` with usage bookkeeping
    pub(crate) fn copy_sector_properties(&mut self, target: SectorId, source: SectorId) {
        let Some(source) = self.sector(source).cloned() else {
            return;
        };
        self.set_sector_flat(target, false, &source.floor_texture);
        self.set_sector_flat(target, true, &source.ceiling_texture);
        if let Some(sector) = self.store.get_mut::<Sector>(target) {
            sector.copy_properties_from(&source);
        }
        self.touch::<Sector>(target);
    }

    pub(crate) fn thing_position(&self, id: ThingId) -> Option<DVec2> {
        self.thing(id).map(Thing::position)
    }
}
