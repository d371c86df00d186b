//! Injected action-special rule lookup.
//!
//! The map core does not know what line specials mean. Tag resolution
//! helpers ask a [`RuleLookup`] implementation which argument of a special
//! refers to which kind of object.

use crate::types::MapFormat;

/// What a special's arguments refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagType {
    /// The special does not reference anything
    #[default]
    None,
    /// arg0 is a sector tag
    Sector,
    /// arg0 is a line id
    Line,
    /// arg0 is a line id, possibly negated
    LineNegative,
    /// arg0 is a thing id
    Thing,
    /// arg0 is a thing id, arg1 a sector tag
    Thing1Sector2,
    /// arg0 and arg1 are sector tags
    Sector1Sector2,
    /// arg0 is a line id, arg1 a sector tag
    Line1Sector2,
}

/// Structural metadata about specials, supplied by the game configuration
pub trait RuleLookup {
    /// What the arguments of `special` refer to in `format`
    fn special_tag_type(&self, special: i32, format: MapFormat) -> TagType;

    /// True if `special` needs a tag to do anything
    fn special_needs_tag(&self, special: i32, format: MapFormat) -> bool {
        self.special_tag_type(special, format) != TagType::None
    }
}

/// Rule lookup that knows no specials
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl RuleLookup for NoRules {
    fn special_tag_type(&self, _special: i32, _format: MapFormat) -> TagType {
        TagType::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rules() {
        assert_eq!(NoRules.special_tag_type(80, MapFormat::Hexen), TagType::None);
        assert!(!NoRules.special_needs_tag(80, MapFormat::Hexen));
    }

    struct DoorRules;

    impl RuleLookup for DoorRules {
        fn special_tag_type(&self, special: i32, _format: MapFormat) -> TagType {
            if special == 62 { TagType::Sector } else { TagType::None }
        }
    }

    #[test]
    fn test_needs_tag_default() {
        assert!(DoorRules.special_needs_tag(62, MapFormat::Doom));
        assert!(!DoorRules.special_needs_tag(1, MapFormat::Doom));
    }
}
