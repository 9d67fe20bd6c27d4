//! Canonical render layers

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Fixed draw-order tiers; lower values draw first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RenderLayer {
    /// Sky gradient
    Background = 0,
    /// Parallax stars
    Starfield = 1,
    /// Nebulae and ambient decoration
    BackgroundEffects = 2,
    /// Collectable elements
    GameObjects = 3,
    /// Snakes
    Entities = 4,
    /// Particle effects
    Particles = 5,
    /// World-space foreground
    Foreground = 6,
    /// Heads-up display
    Ui = 7,
    /// Overlays drawn above everything, including the arena border
    UiOverlay = 8,
}

impl RenderLayer {
    /// Every layer in draw order
    pub const ALL: [Self; 9] = [
        Self::Background,
        Self::Starfield,
        Self::BackgroundEffects,
        Self::GameObjects,
        Self::Entities,
        Self::Particles,
        Self::Foreground,
        Self::Ui,
        Self::UiOverlay,
    ];

    /// Numeric draw order
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Human readable name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Starfield => "starfield",
            Self::BackgroundEffects => "background_effects",
            Self::GameObjects => "game_objects",
            Self::Entities => "entities",
            Self::Particles => "particles",
            Self::Foreground => "foreground",
            Self::Ui => "ui",
            Self::UiOverlay => "ui_overlay",
        }
    }
}

impl TryFrom<u8> for RenderLayer {
    type Error = PipelineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(PipelineError::UnknownLayer(value))
    }
}

impl std::fmt::Display for RenderLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_are_ordered() {
        for pair in RenderLayer::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].index() + 1, pair[1].index());
        }
    }

    #[test]
    fn test_raw_index_conversion() {
        assert_eq!(RenderLayer::try_from(4), Ok(RenderLayer::Entities));
        assert_eq!(RenderLayer::try_from(9), Err(PipelineError::UnknownLayer(9)));
    }
}
