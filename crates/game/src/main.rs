//! Headless climbing sandbox.
//!
//! Builds a walled level in the collision world, spawns scripted characters
//! and steps them with jittered frame times, logging every movement mode change.

mod animation;
mod config;
mod level;
mod script;

use animation::MontagePlayer;
use anyhow::{Context, Result};
use climbing::{ClimbingCharacter, LogDebugDraw};
use config::{CharacterSpawn, SandboxConfig};
use engine_core::{MovementMode, Time, Transform};
use glam::Vec3;
use hecs::World;
use input::{ClimbBindings, InputState};
use physics::{PhysicsBody, PhysicsWorld};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use script::InputScript;
use std::path::PathBuf;
use std::time::Duration;

/// Display name of a sandbox character.
struct Name(String);

/// Mode seen at the end of the previous frame.
struct LastMode(MovementMode);

/// One entry of the mode timeline.
#[derive(Debug, Clone)]
struct ModeChange {
    time: f32,
    character: String,
    from: MovementMode,
    to: MovementMode,
}

struct Sandbox {
    world: World,
    physics: PhysicsWorld,
    time: Time,
    rng: StdRng,
    bindings: ClimbBindings,
    config: SandboxConfig,
    timeline: Vec<ModeChange>,
}

impl Sandbox {
    fn new(config: SandboxConfig) -> Self {
        let mut physics = PhysicsWorld::new();
        let blocks = level::build_level(&mut physics, &config.level);
        log::info!("Level: ground plane + {} blocks", blocks.len());

        let mut time = Time::new();
        if config.fixed_step {
            time.set_fixed_rate(config.fixed_rate);
        }

        let mut world = World::new();
        for spawn in &config.characters {
            spawn_character(&mut world, &mut physics, &config, spawn);
        }
        physics.update_query_pipeline();

        Self {
            world,
            physics,
            time,
            rng: StdRng::seed_from_u64(config.seed),
            bindings: ClimbBindings::default(),
            config,
            timeline: Vec::new(),
        }
    }

    fn run(&mut self) {
        for _ in 0..self.config.frames {
            self.frame();
        }
    }

    fn next_frame_time(&mut self) -> f32 {
        let jitter = self.config.frame_jitter;
        let scale = if jitter > 0.0 {
            1.0 + self.rng.gen_range(-jitter..=jitter)
        } else {
            1.0
        };
        self.config.frame_time * scale
    }

    fn frame(&mut self) {
        let frame_time = self.next_frame_time();
        self.time.advance(Duration::from_secs_f32(frame_time));
        let now = self.time.elapsed_seconds();

        let steps: Vec<f32> = if self.config.fixed_step {
            let mut steps = Vec::new();
            while self.time.should_fixed_update() {
                steps.push(self.time.fixed_timestep_seconds());
            }
            steps
        } else {
            vec![self.time.delta_seconds()]
        };

        let physics = &self.physics;
        let bindings = &self.bindings;
        let timeline = &mut self.timeline;
        let mut poses = Vec::new();

        for (_, (name, character, body, input, script, animation, last_mode)) in self.world.query_mut::<(
            &Name,
            &mut ClimbingCharacter,
            &PhysicsBody,
            &mut InputState,
            &mut InputScript,
            &mut MontagePlayer,
            &mut LastMode,
        )>() {
            input.begin_frame();
            script.feed(now, input, bindings);
            let commands = input.climb_commands(bindings);

            if commands.climb {
                character.request_climb(physics);
            }
            if commands.cancel {
                character.request_cancel_climb();
            }
            if commands.dash {
                character.request_dash();
            }

            for &dt in &steps {
                character.supply_move_vector(commands.movement.y, commands.movement.x);
                character.tick(dt, physics, animation, &mut LogDebugDraw);
                animation.advance(dt);
            }

            let mode = character.mode();
            if mode != last_mode.0 {
                log::info!(
                    "{:>7.3}s  {:<8} {} -> {} at {:.2?}",
                    now,
                    name.0,
                    last_mode.0.name(),
                    mode.name(),
                    character.body().location()
                );
                timeline.push(ModeChange {
                    time: now,
                    character: name.0.clone(),
                    from: last_mode.0,
                    to: mode,
                });
                last_mode.0 = mode;
            }

            let body_state = character.body();
            poses.push((body.collider, body_state.location(), body_state.rotation(), body_state.capsule()));
        }

        for (collider, position, rotation, capsule) in poses {
            self.physics.set_character_capsule(collider, capsule);
            self.physics.set_character_pose(collider, position, rotation);
        }
        self.physics.update_query_pipeline();
    }

    fn report(&self) {
        log::info!(
            "Simulated {} frames ({:.2}s), {} mode changes",
            self.time.frame_count(),
            self.time.elapsed_seconds(),
            self.timeline.len()
        );
        for change in &self.timeline {
            log::debug!(
                "{:>7.3}s  {:<8} {:?} -> {:?}",
                change.time,
                change.character,
                change.from,
                change.to
            );
        }
        for (_, (name, character, script)) in self.world.query::<(&Name, &ClimbingCharacter, &InputScript)>().iter() {
            log::info!(
                "{:<8} ends {} at {:.2?}",
                name.0,
                character.mode().name(),
                character.body().location()
            );
            if !script.is_finished() {
                log::warn!("{} still had scripted input left when the run ended", name.0);
            }
        }
    }
}

fn spawn_character(world: &mut World, physics: &mut PhysicsWorld, config: &SandboxConfig, spawn: &CharacterSpawn) {
    let transform = Transform::facing(Vec3::from_array(spawn.position), Vec3::from_array(spawn.facing).with_y(0.0));
    let mut character = ClimbingCharacter::new(transform, config.locomotion.clone(), config.climbing.clone());

    let collider = physics.add_character_capsule(transform.position, character.body().capsule());
    physics.set_character_pose(collider, transform.position, transform.rotation);
    character.set_collider(collider);

    let mode = character.mode();
    world.spawn((
        Name(spawn.name.clone()),
        character,
        PhysicsBody::new(collider),
        InputState::new(),
        InputScript::new(spawn.script.clone()),
        MontagePlayer::new(vec![config.mantle.clone()]),
        LastMode(mode),
    ));
    log::info!("Spawned {} at {:?}", spawn.name, spawn.position);
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(config::default_path);
    let config = SandboxConfig::load(&path);
    config
        .validate()
        .with_context(|| format!("Sandbox config {:?} is not usable", path))?;

    log::info!(
        "Starting climb sandbox: {} characters, {} frames of ~{:.1} ms{}",
        config.characters.len(),
        config.frames,
        config.frame_time * 1000.0,
        if config.fixed_step { " (fixed step)" } else { "" }
    );

    let mut sandbox = Sandbox::new(config);
    sandbox.run();
    sandbox.report();
    Ok(())
}
