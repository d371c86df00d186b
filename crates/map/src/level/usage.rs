//! Texture, flat and thing-type usage counts.

use std::collections::HashMap;

use super::LevelMap;

/// Incrementally maintained usage counts. Texture and flat names are
/// compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct UsageCounts {
    textures: HashMap<String, i32>,
    flats: HashMap<String, i32>,
    thing_types: HashMap<i32, i32>,
}

impl UsageCounts {
    pub(crate) fn adjust_texture(&mut self, name: &str, delta: i32) {
        *self.textures.entry(name.to_ascii_uppercase()).or_insert(0) += delta;
    }

    pub(crate) fn adjust_flat(&mut self, name: &str, delta: i32) {
        *self.flats.entry(name.to_ascii_uppercase()).or_insert(0) += delta;
    }

    pub(crate) fn adjust_thing_type(&mut self, thing_type: i32, delta: i32) {
        *self.thing_types.entry(thing_type).or_insert(0) += delta;
    }

    pub fn texture(&self, name: &str) -> i32 {
        self.textures
            .get(&name.to_ascii_uppercase())
            .copied()
            .unwrap_or(0)
    }

    pub fn flat(&self, name: &str) -> i32 {
        self.flats.get(&name.to_ascii_uppercase()).copied().unwrap_or(0)
    }

    pub fn thing_type(&self, thing_type: i32) -> i32 {
        self.thing_types.get(&thing_type).copied().unwrap_or(0)
    }
}

impl LevelMap {
    pub fn texture_usage(&self, name: &str) -> i32 {
        self.usage.texture(name)
    }

    pub fn flat_usage(&self, name: &str) -> i32 {
        self.usage.flat(name)
    }

    pub fn thing_type_usage(&self, thing_type: i32) -> i32 {
        self.usage.thing_type(thing_type)
    }

    pub fn usage_counts(&self) -> &UsageCounts {
        &self.usage
    }

    /// Rebuild every usage count from the live collections
    pub fn recount_usage(&mut self) {
        let mut usage = UsageCounts::default();
        for side in self.sides() {
            for texture in side.textures() {
                usage.adjust_texture(texture, 1);
            }
        }
        for sector in self.sectors() {
            usage.adjust_flat(&sector.floor_texture, 1);
            usage.adjust_flat(&sector.ceiling_texture, 1);
        }
        for thing in self.things() {
            usage.adjust_thing_type(thing.thing_type, 1);
        }
        self.usage = usage;
    }
}
