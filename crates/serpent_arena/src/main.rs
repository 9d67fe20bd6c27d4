//! Headless arena driver
//!
//! Runs the frame loop against a recording surface: the ECS moves snake heads
//! and ages element pickups, the rendering system draws every frame, and the
//! pipeline metrics are logged at the end.
//!
//! Usage: `serpent_arena [config.toml|config.ron] [frames]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use serpent_engine::ecs::components::{
    LifetimeComponent, PlayerComponent, RenderableComponent, TransformComponent, VelocityComponent,
};
use serpent_engine::ecs::systems::{LifetimeSystem, MovementSystem};
use serpent_engine::foundation::logging;
use serpent_engine::foundation::time::FRAME_MS;
use serpent_engine::prelude::*;
use serpent_engine::render::renderers::snake::palette_color;

const MAP_WIDTH: f32 = 4000.0;
const MAP_HEIGHT: f32 = 4000.0;
const DEFAULT_FRAMES: u32 = 600;
const SNAKE_COUNT: usize = 8;
const SNAKE_LENGTH: usize = 40;
const SEGMENT_SPACING: f32 = 6.0;
const ELEMENT_COUNT: usize = 60;

const ELEMENTS: [(&str, &str, u8); 6] = [
    ("water", "💧", 0),
    ("fire", "🔥", 0),
    ("earth", "🪨", 0),
    ("steam", "♨️", 1),
    ("lava", "🌋", 2),
    ("life", "🌱", 4),
];

struct Arena {
    coordinator: Coordinator,
    rendering: RenderingSystem<RecordingSurface>,
    state: GameState,
    snake_entities: Vec<EntityId>,
    element_entities: Vec<(EntityId, usize)>,
    rng: StdRng,
}

impl Arena {
    fn new(config: RenderConfig) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Creating arena...");
        let rng = StdRng::seed_from_u64(config.seed);
        let surface = RecordingSurface::new(
            config.camera.viewport_width,
            config.camera.viewport_height,
        );
        let mut rendering = RenderingSystem::new(surface, config)?;
        rendering.initialize(
            InitOptions::new(MAP_WIDTH, MAP_HEIGHT)
                .with_skin("default", ImageHandle::pending("skins/default.png")),
        )?;

        let mut coordinator = Coordinator::new();
        coordinator.register_system(Box::new(MovementSystem::default()));
        coordinator.register_system(Box::new(LifetimeSystem::default()));

        Ok(Self {
            coordinator,
            rendering,
            state: GameState::default(),
            snake_entities: Vec::new(),
            element_entities: Vec::new(),
            rng,
        })
    }

    fn populate(&mut self) {
        let half = Vec2::new(MAP_WIDTH, MAP_HEIGHT) * 0.4;
        for i in 0..SNAKE_COUNT {
            let x = self.rng.gen_range(-half.x..half.x);
            let y = self.rng.gen_range(-half.y..half.y);
            let heading = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.gen_range(2.0..4.0);

            let id = self.coordinator.create_entity(None);
            if let Some(mut editor) = self.coordinator.edit_entity(id) {
                editor
                    .add(TransformComponent::new(x, y, heading))
                    .add(
                        VelocityComponent::new(heading.cos() * speed, heading.sin() * speed)
                            .with_max_speed(6.0),
                    )
                    .add(RenderableComponent::new(RenderLayer::Entities, "snake"));
                if i == 0 {
                    editor.add(PlayerComponent::new("Player"));
                }
            }

            let mut snake = Snake::new(format!("Snake {}", i + 1), x, y);
            snake.angle = heading;
            let mut snake = snake.with_body(SNAKE_LENGTH, SEGMENT_SPACING);
            if i == 0 {
                snake = snake.as_player().with_skin("default");
            }
            snake.is_leader = i == 1;
            self.state.snakes.push(snake);
            self.snake_entities.push(id);
        }

        for _ in 0..ELEMENT_COUNT {
            self.spawn_element();
        }
        log::info!(
            "Arena populated with {} snakes and {} elements",
            self.state.snakes.len(),
            self.state.elements.len()
        );
    }

    fn spawn_element(&mut self) {
        let kind = self.rng.gen_range(0..ELEMENTS.len());
        let (name, emoji, tier) = ELEMENTS[kind];
        let x = self.rng.gen_range(-MAP_WIDTH * 0.45..MAP_WIDTH * 0.45);
        let y = self.rng.gen_range(-MAP_HEIGHT * 0.45..MAP_HEIGHT * 0.45);

        let id = self.coordinator.create_entity(None);
        if let Some(mut editor) = self.coordinator.edit_entity(id) {
            editor
                .add(TransformComponent::new(x, y, 0.0))
                .add(LifetimeComponent::new(self.rng.gen_range(2000.0..8000.0)))
                .add(RenderableComponent::new(RenderLayer::GameObjects, "element"));
        }

        let mut element = Element::new(
            format!("{name}-{}", id.raw()),
            x,
            y,
            Some(ElementData::new(emoji, name, tier)),
        );
        element.pulse = self.rng.gen_range(0.0..std::f32::consts::TAU);
        element.is_catalyst_spawned = tier >= 2;
        self.element_entities.push((id, self.state.elements.len()));
        self.state.elements.push(element);
    }

    fn step(&mut self, delta_time: f32) {
        self.coordinator.update(delta_time);
        self.sync_snakes();
        self.expire_elements();

        if let Some(player) = self.state.snakes.iter().find(|snake| snake.is_player) {
            let head = Vec2::new(player.x, player.y);
            let camera = self.rendering.camera_mut();
            camera.follow(head, false);
            camera.update(delta_time);
        }

        for snake in &self.state.snakes {
            if snake.is_boosting {
                let color = palette_color(&snake.skin);
                self.rendering
                    .create_boost_particle(snake.x, snake.y, snake.angle, color);
            }
        }

        self.state.time_ms += delta_time;
        self.rendering.update(delta_time);
        self.rendering.render(&self.state);
    }

    fn sync_snakes(&mut self) {
        let bounds = self.rendering.camera().bounds();
        for (index, id) in self.snake_entities.iter().enumerate() {
            let Some(transform) = self
                .coordinator
                .entity(*id)
                .and_then(|entity| entity.get::<TransformComponent>())
            else {
                continue;
            };
            let (x, y, angle) = (transform.x, transform.y, transform.angle);
            let snake = &mut self.state.snakes[index];
            snake.advance_to(x, y, angle);
            snake.segments.insert(0, Segment::new(x, y));
            snake.segments.truncate(SNAKE_LENGTH);
            snake.is_boosting = index % 3 == 0 && (self.state.time_ms / 1000.0) as u32 % 2 == 0;

            let out_of_bounds = bounds.is_some_and(|bounds| !bounds.contains(x, y));
            if out_of_bounds && snake.alive {
                snake.alive = false;
                snake.is_dying = true;
                let color = palette_color(&snake.skin);
                log::info!("{} left the arena", snake.name);
                self.rendering.create_death_particles(snake, color);
                if snake.is_player {
                    self.rendering.camera_mut().shake(12.0);
                }
                if let Some(mut editor) = self.coordinator.edit_entity(*id) {
                    editor.remove(ComponentKind::Velocity);
                }
            }
            if snake.is_dying {
                snake.death_segment_phase = (snake.death_segment_phase + 0.02).min(1.0);
            }
        }
    }

    fn expire_elements(&mut self) {
        let expired = LifetimeSystem::expired_in(&self.coordinator);
        if expired.is_empty() {
            return;
        }
        for id in &expired {
            let Some(position) = self.element_entities.iter().position(|(entity, _)| entity == id) else {
                continue;
            };
            let (_, index) = self.element_entities.swap_remove(position);
            let element = self.state.elements.swap_remove(index);
            if let Some(moved) = self
                .element_entities
                .iter_mut()
                .find(|(_, slot)| *slot == self.state.elements.len())
            {
                moved.1 = index;
            }
            self.coordinator.destroy_entity(*id);
            self.state.discovered_combinations.insert(element.id.clone());
            self.rendering
                .create_combination_particles(element.x, element.y, Color::rgb(255, 215, 0));
        }
        for _ in 0..expired.len() {
            self.spawn_element();
        }
    }

    fn run(&mut self, frames: u32) {
        log::info!("Running {} frames", frames);
        self.populate();
        for frame in 0..frames {
            self.state.interpolation = 1.0;
            self.state.alchemy_vision = frame % 300 < 60;
            self.step(FRAME_MS);
            self.rendering.surface_mut().take_commands();

            if frame % 120 == 0 {
                let metrics = self.rendering.metrics();
                log::debug!(
                    "Frame {}: {} draw calls, {} culled, {} particles",
                    frame,
                    metrics.draw_calls,
                    metrics.culled_entities,
                    self.rendering.particle_count()
                );
            }
        }
        self.report();
    }

    fn report(&self) {
        let metrics = self.rendering.metrics();
        let timings = self.rendering.timings();
        log::info!(
            "Rendered {} frames, last frame {} draw calls ({} of {} entities culled)",
            timings.frame_count,
            metrics.draw_calls,
            metrics.culled_entities,
            metrics.total_entities
        );
        for (layer, ms) in &metrics.layer_timings {
            log::info!("  {:<12} {:.3} ms", layer.name(), ms);
        }
        for fault in &metrics.errors {
            log::warn!("  {} failed on frame {}: {}", fault.renderer, fault.frame, fault.message);
        }
        let disabled = self.rendering.pipeline().disabled_renderers();
        if !disabled.is_empty() {
            log::warn!("Disabled renderers: {}", disabled.join(", "));
        }
    }
}

/// Config from an optional `.toml`/`.ron` path, defaults otherwise
fn load_config(path: Option<&str>) -> Result<RenderConfig, ConfigError> {
    path.map_or_else(|| Ok(RenderConfig::default()), RenderConfig::load_from_file)
}

fn main() {
    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let frames = args
        .next()
        .and_then(|frames| frames.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    // The log level lives in the config, so the load result is reported once
    // the logger exists
    let loaded = load_config(config_path.as_deref());
    let level = loaded
        .as_ref()
        .map_or_else(|_| "info".to_string(), |config| config.log_level.clone());
    logging::init_with_level(&level);

    let config = match loaded {
        Ok(config) => {
            match &config_path {
                Some(path) => log::info!("Loaded configuration from {}", path),
                None => log::info!("Using default configuration"),
            }
            config
        }
        Err(e) => {
            log::error!(
                "Failed to load {}: {}",
                config_path.as_deref().unwrap_or("configuration"),
                e
            );
            std::process::exit(1);
        }
    };

    match Arena::new(config) {
        Ok(mut arena) => arena.run(frames),
        Err(e) => {
            log::error!("Arena error: {}", e);
            std::process::exit(1);
        }
    }
}
