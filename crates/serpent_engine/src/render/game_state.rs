//! Read-only game state consumed by the renderers
//!
//! Game rules live elsewhere; this is the slice of the world the renderers
//! need, rebuilt or updated by the host every frame.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::camera::{Interpolatable, Pose};

/// One body segment of a snake, head first
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    /// World X
    pub x: f32,
    /// World Y
    pub y: f32,
}

impl Segment {
    /// Create a segment
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A snake as seen by the renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    /// Head X
    pub x: f32,
    /// Head Y
    pub y: f32,
    /// Heading in radians
    pub angle: f32,
    /// Head pose at the previous simulation step
    pub previous: Option<Pose>,
    /// Body segments from head to tail
    pub segments: Vec<Segment>,
    /// Whether the snake is alive
    pub alive: bool,
    /// Whether the death animation is playing
    pub is_dying: bool,
    /// Death animation progress in `[0, 1]`
    pub death_segment_phase: f32,
    /// Controlled by the local player
    pub is_player: bool,
    /// Currently boosting
    pub is_boosting: bool,
    /// Top of the leaderboard
    pub is_leader: bool,
    /// Boss snake
    pub is_boss: bool,
    /// Display name
    pub name: String,
    /// Skin identifier
    pub skin: String,
    /// Head segment radius
    pub size: f32,
}

impl Snake {
    /// Living snake at a position with no segments
    pub fn new(name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            angle: 0.0,
            previous: None,
            segments: Vec::new(),
            alive: true,
            is_dying: false,
            death_segment_phase: 0.0,
            is_player: false,
            is_boosting: false,
            is_leader: false,
            is_boss: false,
            name: name.into(),
            skin: "default".to_string(),
            size: 12.0,
        }
    }

    /// Lay out `count` segments in a straight line behind the head
    pub fn with_body(mut self, count: usize, spacing: f32) -> Self {
        let (dx, dy) = (-self.angle.cos() * spacing, -self.angle.sin() * spacing);
        self.segments = (0..count)
            .map(|i| {
                let step = i as f32;
                Segment::new(self.x + dx * step, self.y + dy * step)
            })
            .collect();
        self
    }

    /// Set the skin identifier
    pub fn with_skin(mut self, skin: impl Into<String>) -> Self {
        self.skin = skin.into();
        self
    }

    /// Mark as the local player
    pub const fn as_player(mut self) -> Self {
        self.is_player = true;
        self
    }

    /// Move the head, remembering the previous pose
    pub fn advance_to(&mut self, x: f32, y: f32, angle: f32) {
        self.previous = Some(self.current_pose());
        self.x = x;
        self.y = y;
        self.angle = angle;
    }
}

impl Interpolatable for Snake {
    fn previous_pose(&self) -> Pose {
        self.previous.unwrap_or_else(|| self.current_pose())
    }

    fn current_pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.angle)
    }
}

/// Catalogue entry for an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementData {
    /// Glyph drawn for the element
    pub emoji: String,
    /// Display name
    pub name: String,
    /// Rarity tier, 0 is the most common
    pub tier: u8,
}

impl ElementData {
    /// Create element data
    pub fn new(emoji: impl Into<String>, name: impl Into<String>, tier: u8) -> Self {
        Self {
            emoji: emoji.into(),
            name: name.into(),
            tier,
        }
    }
}

/// A collectable element lying in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// World X
    pub x: f32,
    /// World Y
    pub y: f32,
    /// Element identifier
    pub id: String,
    /// Catalogue data, absent when the loader has not resolved it
    pub data: Option<ElementData>,
    /// Pulse animation phase in radians
    pub pulse: f32,
    /// Spawned by a catalyst
    pub is_catalyst_spawned: bool,
    /// Part of a combination awaiting confirmation
    pub pending_combination: bool,
}

impl Element {
    /// Element with resolved catalogue data
    pub fn new(id: impl Into<String>, x: f32, y: f32, data: Option<ElementData>) -> Self {
        Self {
            x,
            y,
            id: id.into(),
            data,
            pulse: 0.0,
            is_catalyst_spawned: false,
            pending_combination: false,
        }
    }
}

/// Decorative space station drawn by the background
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// World X
    pub x: f32,
    /// World Y
    pub y: f32,
    /// Hull radius
    pub radius: f32,
    /// Rotation phase in radians
    pub rotation: f32,
}

/// Everything the renderers read in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    /// Snakes, drawn in order
    pub snakes: Vec<Snake>,
    /// Collectable elements
    pub elements: Vec<Element>,
    /// Background stations
    pub stations: Vec<Station>,
    /// Element ids that take part in an already discovered combination
    pub discovered_combinations: HashSet<String>,
    /// Highlight discovered elements
    pub alchemy_vision: bool,
    /// Game clock in milliseconds, drives animation phases
    pub time_ms: f32,
    /// Blend between previous and current simulation step
    pub interpolation: f32,
}

impl GameState {
    /// Whether an element id takes part in a discovered combination
    pub fn is_discovered(&self, element_id: &str) -> bool {
        self.discovered_combinations.contains(element_id)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            snakes: Vec::new(),
            elements: Vec::new(),
            stations: Vec::new(),
            discovered_combinations: HashSet::new(),
            alchemy_vision: false,
            time_ms: 0.0,
            interpolation: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_body_trails_behind_head() {
        let snake = Snake::new("a", 10.0, 0.0).with_body(3, 5.0);
        assert_eq!(snake.segments.len(), 3);
        assert_relative_eq!(snake.segments[0].x, 10.0);
        assert_relative_eq!(snake.segments[2].x, 0.0);
    }

    #[test]
    fn test_snake_previous_pose_defaults_to_current() {
        let mut snake = Snake::new("a", 1.0, 2.0);
        assert_eq!(snake.previous_pose(), snake.current_pose());
        snake.advance_to(5.0, 2.0, 0.0);
        assert_eq!(snake.previous_pose(), Pose::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_partial_snapshot_fills_defaults() {
        let json = r#"{
            "elements": [{
                "x": 4.0, "y": -2.0, "id": "fire-1",
                "data": { "emoji": "F", "name": "fire", "tier": 0 },
                "pulse": 0.5, "is_catalyst_spawned": false, "pending_combination": true
            }],
            "discovered_combinations": ["fire-1"],
            "time_ms": 1200.0
        }"#;
        let state: GameState = serde_json::from_str(json).unwrap();
        assert!(state.snakes.is_empty());
        assert_eq!(state.elements[0].data, Some(ElementData::new("F", "fire", 0)));
        assert!(state.is_discovered("fire-1"));
        assert_relative_eq!(state.interpolation, 1.0);
        assert_relative_eq!(state.time_ms, 1200.0);
    }

    #[test]
    fn test_snake_survives_snapshot() {
        let mut snake = Snake::new("b", 0.0, 0.0).with_body(2, 4.0).as_player();
        snake.advance_to(3.0, 0.0, 0.1);
        let state = GameState {
            snakes: vec![snake],
            ..GameState::default()
        };
        let restored: GameState = serde_json::from_str(&serde_json::to_string(&state).unwrap()).unwrap();
        assert_eq!(restored, state);
    }
}
