//! Object presets - fixed display and physics attributes per object kind

use serde::{Deserialize, Serialize};

use super::physics::Shape;

/// Preset kinds a client may spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    /// Long solid barrier
    Fence,
    /// Square solid block
    Obstacle,
    /// Decoration, walkable
    Flower,
    /// Light bouncy ball
    Ball,
    /// Heavy pushable crate
    Crate,
}

/// Whether a preset spawns as a static or a dynamic object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetCategory {
    Static,
    Dynamic,
}

/// Attributes the renderer needs to draw an object
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayAttributes {
    pub texture: &'static str,
    pub scale: f32,
    /// Draw order, higher is on top
    pub depth: i32,
}

/// Attributes the simulation needs for the object's body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyAttributes {
    pub shape: Shape,
    /// Non-solid objects are walkable and skipped by collision
    pub solid: bool,
    /// Linear drag in px/s²
    pub drag: f32,
    /// Restitution on impact (0 = dead stop, 1 = perfectly elastic)
    pub bounce: f32,
    pub mass: f32,
}

/// Complete attribute record for one preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetAttributes {
    pub category: PresetCategory,
    pub display: DisplayAttributes,
    pub body: BodyAttributes,
}

const FENCE: PresetAttributes = PresetAttributes {
    category: PresetCategory::Static,
    display: DisplayAttributes {
        texture: "fence",
        scale: 1.0,
        depth: 1,
    },
    body: BodyAttributes {
        shape: Shape::Rect {
            half_width: 48.0,
            half_height: 12.0,
        },
        solid: true,
        drag: 0.0,
        bounce: 0.0,
        mass: 1.0,
    },
};

const OBSTACLE: PresetAttributes = PresetAttributes {
    category: PresetCategory::Static,
    display: DisplayAttributes {
        texture: "obstacle",
        scale: 1.0,
        depth: 1,
    },
    body: BodyAttributes {
        shape: Shape::Rect {
            half_width: 32.0,
            half_height: 32.0,
        },
        solid: true,
        drag: 0.0,
        bounce: 0.0,
        mass: 1.0,
    },
};

const FLOWER: PresetAttributes = PresetAttributes {
    category: PresetCategory::Static,
    display: DisplayAttributes {
        texture: "flower",
        scale: 0.5,
        depth: 0,
    },
    body: BodyAttributes {
        shape: Shape::Circle { radius: 8.0 },
        solid: false,
        drag: 0.0,
        bounce: 0.0,
        mass: 1.0,
    },
};

const BALL: PresetAttributes = PresetAttributes {
    category: PresetCategory::Dynamic,
    display: DisplayAttributes {
        texture: "circle",
        scale: 0.35,
        depth: 2,
    },
    body: BodyAttributes {
        shape: Shape::Circle { radius: 12.0 },
        solid: true,
        drag: 300.0,
        bounce: 0.8,
        mass: 1.0,
    },
};

const CRATE: PresetAttributes = PresetAttributes {
    category: PresetCategory::Dynamic,
    display: DisplayAttributes {
        texture: "crate",
        scale: 0.6,
        depth: 2,
    },
    body: BodyAttributes {
        shape: Shape::Circle { radius: 20.0 },
        solid: true,
        drag: 600.0,
        bounce: 0.2,
        mass: 4.0,
    },
};

impl PresetKind {
    pub const ALL: [PresetKind; 5] = [
        PresetKind::Fence,
        PresetKind::Obstacle,
        PresetKind::Flower,
        PresetKind::Ball,
        PresetKind::Crate,
    ];

    /// Look up the fixed attribute record for this preset
    pub fn attributes(self) -> &'static PresetAttributes {
        match self {
            PresetKind::Fence => &FENCE,
            PresetKind::Obstacle => &OBSTACLE,
            PresetKind::Flower => &FLOWER,
            PresetKind::Ball => &BALL,
            PresetKind::Crate => &CRATE,
        }
    }

    pub fn category(self) -> PresetCategory {
        self.attributes().category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parses_from_lowercase_name() {
        let kind: PresetKind = serde_json::from_str("\"fence\"").unwrap();
        assert_eq!(kind, PresetKind::Fence);

        assert!(serde_json::from_str::<PresetKind>("\"spaceship\"").is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(PresetKind::Fence.category(), PresetCategory::Static);
        assert_eq!(PresetKind::Flower.category(), PresetCategory::Static);
        assert_eq!(PresetKind::Ball.category(), PresetCategory::Dynamic);
        assert_eq!(PresetKind::Crate.category(), PresetCategory::Dynamic);
    }

    #[test]
    fn test_dynamic_presets_are_solid_circles() {
        for kind in PresetKind::ALL {
            let attrs = kind.attributes();
            if attrs.category == PresetCategory::Dynamic {
                assert!(attrs.body.solid);
                assert!(matches!(attrs.body.shape, Shape::Circle { .. }));
                assert!(attrs.body.mass > 0.0);
            }
        }
    }

    #[test]
    fn test_flower_is_walkable() {
        assert!(!PresetKind::Flower.attributes().body.solid);
    }
}
