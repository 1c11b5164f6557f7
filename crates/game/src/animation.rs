//! Montage playback for the sandbox: fixed root-motion segments on a timeline.

use climbing::{AnimationPlayer, ClipId};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Constant root-motion velocity for part of a montage, in character-local
/// space (x right, y up, -z forward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootMotionSegment {
    pub duration: f32,
    pub velocity: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MontageConfig {
    pub clip: ClipId,
    pub segments: Vec<RootMotionSegment>,
}

impl Default for MontageConfig {
    /// Pull up over the lip, then step forward onto the ledge.
    fn default() -> Self {
        Self {
            clip: ClipId::new("ledge_climb"),
            segments: vec![
                RootMotionSegment {
                    duration: 0.6,
                    velocity: [0.0, 2.8, 0.0],
                },
                RootMotionSegment {
                    duration: 0.6,
                    velocity: [0.0, 0.0, -1.5],
                },
            ],
        }
    }
}

impl MontageConfig {
    pub fn duration(&self) -> f32 {
        self.segments.iter().map(|segment| segment.duration).sum()
    }

    fn velocity_at(&self, time: f32) -> Option<Vec3> {
        let mut end = 0.0;
        for segment in &self.segments {
            end += segment.duration;
            if time < end {
                return Some(Vec3::from_array(segment.velocity));
            }
        }
        None
    }
}

/// Plays one montage at a time. The sandbox advances it after every tick.
#[derive(Debug, Clone, Default)]
pub struct MontagePlayer {
    montages: Vec<MontageConfig>,
    /// Index of the playing montage and its elapsed time.
    playing: Option<(usize, f32)>,
}

impl MontagePlayer {
    pub fn new(montages: Vec<MontageConfig>) -> Self {
        Self {
            montages,
            playing: None,
        }
    }

    fn current(&self) -> Option<(&MontageConfig, f32)> {
        let (index, elapsed) = self.playing?;
        Some((self.montages.get(index)?, elapsed))
    }

    pub fn advance(&mut self, dt: f32) {
        let Some((index, elapsed)) = self.playing.as_mut() else {
            return;
        };
        *elapsed += dt;
        let finished = self
            .montages
            .get(*index)
            .map_or(true, |montage| *elapsed >= montage.duration());
        if finished {
            log::debug!("montage {:?} finished", self.current().map(|(m, _)| &m.clip));
            self.playing = None;
        }
    }
}

impl AnimationPlayer for MontagePlayer {
    fn is_playing(&self, clip: &ClipId) -> bool {
        self.current().is_some_and(|(montage, _)| montage.clip == *clip)
    }

    fn play(&mut self, clip: &ClipId) {
        match self.montages.iter().position(|montage| montage.clip == *clip) {
            Some(index) => self.playing = Some((index, 0.0)),
            None => log::warn!("No montage for clip {:?}", clip),
        }
    }

    fn root_motion_velocity(&self) -> Option<Vec3> {
        let (montage, elapsed) = self.current()?;
        montage.velocity_at(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> MontagePlayer {
        MontagePlayer::new(vec![MontageConfig::default()])
    }

    #[test]
    fn root_motion_follows_segments() {
        let clip = ClipId::new("ledge_climb");
        let mut player = player();
        assert_eq!(player.root_motion_velocity(), None);

        player.play(&clip);
        assert!(player.is_playing(&clip));
        assert_eq!(player.root_motion_velocity(), Some(Vec3::new(0.0, 2.8, 0.0)));

        player.advance(0.7);
        assert_eq!(player.root_motion_velocity(), Some(Vec3::new(0.0, 0.0, -1.5)));

        player.advance(0.6);
        assert!(!player.is_playing(&clip));
        assert_eq!(player.root_motion_velocity(), None);
    }

    #[test]
    fn unknown_clip_does_not_play() {
        let mut player = player();
        player.play(&ClipId::new("vault"));
        assert!(!player.is_playing(&ClipId::new("vault")));
        assert!(!player.is_playing(&ClipId::new("ledge_climb")));
    }

    #[test]
    fn replay_restarts_from_the_beginning() {
        let clip = ClipId::new("ledge_climb");
        let mut player = player();
        player.play(&clip);
        player.advance(0.9);
        player.play(&clip);
        assert_eq!(player.root_motion_velocity(), Some(Vec3::new(0.0, 2.8, 0.0)));
    }
}
