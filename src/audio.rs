//! Audio sink
//!
//! The level reports what happened as `GameEvent`s; this module turns them into
//! named cues and hands those to whatever backend the shell plugs in.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Frog hops
    Croak,
    /// Frog dies
    Splat,
    /// Frog reaches an exit
    Trill,
}

impl Cue {
    /// Sound file name
    pub fn file(&self) -> &'static str {
        match self {
            Cue::Croak => "croak.wav",
            Cue::Splat => "splat.wav",
            Cue::Trill => "trill.wav",
        }
    }

    /// Cue for a level event, if it makes a sound
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Hopped { into_exit: true, .. } => Some(Cue::Trill),
            GameEvent::Hopped { .. } => Some(Cue::Croak),
            GameEvent::Died { .. } => Some(Cue::Splat),
            GameEvent::GoalCaptured { .. } => Some(Cue::Trill),
            GameEvent::LifeLost { .. } | GameEvent::LevelWon | GameEvent::Respawned => None,
        }
    }
}

/// Fire-and-forget playback backend
pub trait AudioSink {
    fn play(&mut self, cue: Cue, volume: f32);
}

/// Backend that only logs cues (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, cue: Cue, volume: f32) {
        log::debug!("Play {} at volume {volume:.2}", cue.file());
    }
}

/// Audio manager for the game
#[derive(Debug)]
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(sink: S, settings: &Settings) -> Self {
        let mut audio = Self::new(sink);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&mut self, cue: Cue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(cue, vol);
    }

    /// Play the cue for every event that has one, in order
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for cue in events.iter().filter_map(Cue::for_event) {
            self.play(cue);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
