//! Sandbox configuration (run length, frame pacing, level, characters and
//! their scripts). Loaded from sandbox.ron at startup.

use crate::animation::MontageConfig;
use crate::level::{default_level, BlockSpec};
use crate::script::{ScriptAction, ScriptEvent};
use anyhow::{ensure, Context, Result};
use climbing::{ClimbingConfig, ClipId, FloatCurve, LocomotionConfig};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A character placed in the level with the input script that drives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSpawn {
    pub name: String,
    /// Capsule center.
    pub position: [f32; 3],
    /// Initial facing; only the horizontal part is used.
    pub facing: [f32; 3],
    #[serde(default)]
    pub script: Vec<ScriptEvent>,
}

/// Settings for one sandbox run. Loaded from `sandbox.ron` in the current
/// directory unless another path is given on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Number of frames to simulate.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Nominal frame duration in seconds.
    #[serde(default = "default_frame_time")]
    pub frame_time: f32,
    /// Each frame lasts `frame_time * (1 ± frame_jitter)`.
    #[serde(default = "default_frame_jitter")]
    pub frame_jitter: f32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Tick characters at `fixed_rate` Hz instead of once per frame.
    #[serde(default)]
    pub fixed_step: bool,
    #[serde(default = "default_fixed_rate")]
    pub fixed_rate: f64,
    #[serde(default)]
    pub locomotion: LocomotionConfig,
    #[serde(default = "default_climbing")]
    pub climbing: ClimbingConfig,
    /// Root motion played for the mantle clip.
    #[serde(default)]
    pub mantle: MontageConfig,
    #[serde(default = "default_level")]
    pub level: Vec<BlockSpec>,
    #[serde(default = "default_characters")]
    pub characters: Vec<CharacterSpawn>,
}

fn default_frames() -> u32 {
    480
}
fn default_frame_time() -> f32 {
    1.0 / 60.0
}
fn default_frame_jitter() -> f32 {
    0.3
}
fn default_seed() -> u64 {
    7
}
fn default_fixed_rate() -> f64 {
    120.0
}

fn default_climbing() -> ClimbingConfig {
    ClimbingConfig {
        dash_curve: Some(FloatCurve::from_points(&[(0.0, 2.0), (0.1, 9.0), (0.35, 1.0)])),
        mantle_clip: Some(ClipId::new("ledge_climb")),
        ..Default::default()
    }
}

/// A climber that walks into the wall, climbs it and mantles onto the top,
/// and a second one that climbs, dashes sideways and lets go.
fn default_characters() -> Vec<CharacterSpawn> {
    use ScriptAction::*;

    let mut climber = Vec::new();
    climber.extend(ScriptEvent::hold(0.2, 6.0, Forward));
    climber.extend(ScriptEvent::tap(0.7, Climb));
    climber.extend(ScriptEvent::tap(1.0, Climb));

    let mut dasher = Vec::new();
    dasher.extend(ScriptEvent::hold(0.2, 1.4, Forward));
    dasher.extend(ScriptEvent::tap(0.7, Climb));
    dasher.extend(ScriptEvent::tap(1.0, Climb));
    dasher.extend(ScriptEvent::hold(1.4, 2.4, Left));
    dasher.extend(ScriptEvent::tap(1.8, Dash));
    dasher.extend(ScriptEvent::tap(3.2, Cancel));

    vec![
        CharacterSpawn {
            name: "climber".into(),
            position: [1.5, 1.0, 0.0],
            facing: [1.0, 0.0, 0.0],
            script: climber,
        },
        CharacterSpawn {
            name: "dasher".into(),
            position: [1.5, 1.0, 2.0],
            facing: [1.0, 0.0, 0.0],
            script: dasher,
        },
    ]
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            frame_time: default_frame_time(),
            frame_jitter: default_frame_jitter(),
            seed: default_seed(),
            fixed_step: false,
            fixed_rate: default_fixed_rate(),
            locomotion: LocomotionConfig::default(),
            climbing: default_climbing(),
            mantle: MontageConfig::default(),
            level: default_level(),
            characters: default_characters(),
        }
    }
}

impl SandboxConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid sandbox config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::info!("No sandbox config at {:?}, using defaults", path),
        }
        Self::default()
    }

    /// Reject settings the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.frame_time > 0.0, "frame_time must be positive, got {}", self.frame_time);
        ensure!(
            (0.0..1.0).contains(&self.frame_jitter),
            "frame_jitter must be in [0, 1), got {}",
            self.frame_jitter
        );
        ensure!(
            !self.fixed_step || self.fixed_rate > 0.0,
            "fixed_rate must be positive, got {}",
            self.fixed_rate
        );
        self.climbing
            .validate(self.locomotion.capsule())
            .context("invalid climbing settings")?;

        for spawn in &self.characters {
            let facing = Vec3::from_array(spawn.facing).with_y(0.0);
            ensure!(
                facing.length_squared() > 0.0,
                "character {:?} needs a horizontal facing",
                spawn.name
            );
        }

        if let Some(clip) = &self.climbing.mantle_clip {
            if *clip != self.mantle.clip {
                log::warn!(
                    "Mantle clip {:?} has no montage (montage is {:?}); mantles will not move the character",
                    clip,
                    self.mantle.clip
                );
            }
        }
        Ok(())
    }
}

pub fn default_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("sandbox.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SandboxConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config: SandboxConfig = ron::from_str("(frames: 10, fixed_step: true)").unwrap();
        assert_eq!(config.frames, 10);
        assert!(config.fixed_step);
        assert_eq!(config.characters.len(), 2);
        assert_eq!(config.climbing.mantle_clip, Some(ClipId::new("ledge_climb")));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SandboxConfig::load(Path::new("definitely/not/here/sandbox.ron"));
        assert_eq!(config, SandboxConfig::default());
    }

    #[test]
    fn bad_settings_are_rejected() {
        let mut config = SandboxConfig {
            frame_jitter: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.frame_jitter = 0.0;
        config.climbing.climbing_shrink_amount = 5.0;
        let message = format!("{:#}", config.validate().unwrap_err());
        assert!(message.contains("invalid climbing settings"));

        config.climbing = default_climbing();
        config.characters[0].facing = [0.0, 1.0, 0.0];
        assert!(config.validate().is_err());
    }
}
