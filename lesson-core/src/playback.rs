//! Read-aloud control over a single shared speech engine.
//!
//! Two text tracks each have a play/pause/resume control, but only one
//! utterance may be speaking at a time. Starting anything new cancels
//! whatever is in flight. Every utterance carries an id so that engine
//! notifications for a cancelled utterance are recognised as stale.

use crate::error::PlaybackError;
use crate::models::Track;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub type UtteranceId = u64;

pub const MIN_RATE: f32 = 0.1;
pub const MAX_RATE: f32 = 10.0;

/// A voice as reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub lang: String,
}

/// Entry of a voice selector. `id: None` is the engine default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceOption {
    pub id: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub voice: Option<String>,
}

/// Instruction for the engine collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SpeechCommand {
    Speak { utterance: Utterance },
    Pause,
    Resume,
    Cancel,
}

/// The four operations consumed from a speech synthesis engine
pub trait SpeechEngine {
    fn speak(&mut self, utterance: Utterance);
    fn pause(&mut self);
    fn resume(&mut self);
    fn cancel(&mut self);
}

/// Engine that records commands for a remote synthesizer to replay in order
#[derive(Debug, Default)]
pub struct SpeechQueue {
    commands: Vec<SpeechCommand>,
}

impl SpeechQueue {
    pub fn drain(&mut self) -> Vec<SpeechCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl SpeechEngine for SpeechQueue {
    fn speak(&mut self, utterance: Utterance) {
        self.commands.push(SpeechCommand::Speak { utterance });
    }

    fn pause(&mut self) {
        self.commands.push(SpeechCommand::Pause);
    }

    fn resume(&mut self) {
        self.commands.push(SpeechCommand::Resume);
    }

    fn cancel(&mut self) {
        self.commands.push(SpeechCommand::Cancel);
    }
}

/// Notification from the engine about one utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeechEvent {
    Started { id: UtteranceId },
    Ended { id: UtteranceId },
    Failed { id: UtteranceId, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayButton {
    Idle,
    Playing,
    Paused,
}

impl PlayButton {
    pub fn label(self) -> &'static str {
        match self {
            PlayButton::Idle => "朗读",
            PlayButton::Playing => "暂停",
            PlayButton::Paused => "继续",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonUpdate {
    pub track: Track,
    pub state: PlayButton,
    pub label: &'static str,
}

/// Speed and voice chosen next to a track's play button
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackOptions {
    #[serde(default)]
    pub rate: Option<f32>,
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Speaker {
    Track(Track),
    Word,
}

#[derive(Debug, Clone, Copy)]
struct Active {
    id: UtteranceId,
    speaker: Speaker,
    paused: bool,
}

#[derive(Debug)]
pub struct PlaybackController {
    lang: String,
    default_rate: f32,
    next_id: UtteranceId,
    active: Option<Active>,
    buttons: [PlayButton; 2],
    voices: Vec<Voice>,
}

impl PlaybackController {
    pub fn new(lang: impl Into<String>, default_rate: f32) -> Self {
        Self {
            lang: lang.into(),
            default_rate,
            next_id: 1,
            active: None,
            buttons: [PlayButton::Idle; 2],
            voices: Vec::new(),
        }
    }

    pub fn set_defaults(&mut self, lang: impl Into<String>, default_rate: f32) {
        self.lang = lang.into();
        self.default_rate = default_rate;
    }

    pub fn button(&self, track: Track) -> PlayButton {
        self.buttons[track.index()]
    }

    /// Track currently holding the engine, if any
    pub fn active_track(&self) -> Option<Track> {
        match self.active?.speaker {
            Speaker::Track(track) => Some(track),
            Speaker::Word => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.active.is_some_and(|a| a.paused)
    }

    /// Play, pause or resume `track`. A different track that is speaking
    /// is cancelled first.
    pub fn toggle<E: SpeechEngine>(
        &mut self,
        track: Track,
        text: &str,
        options: &PlaybackOptions,
        engine: &mut E,
    ) -> Result<Vec<ButtonUpdate>, PlaybackError> {
        let before = self.buttons;

        if let Some(active) = self.active.as_mut() {
            if active.speaker == Speaker::Track(track) {
                if active.paused {
                    engine.resume();
                    active.paused = false;
                    self.buttons[track.index()] = PlayButton::Playing;
                } else {
                    engine.pause();
                    active.paused = true;
                    self.buttons[track.index()] = PlayButton::Paused;
                }
                return Ok(self.changes_since(before));
            }
        }

        if text.trim().is_empty() {
            return Err(PlaybackError::NothingToRead(track));
        }

        engine.cancel();
        self.buttons = [PlayButton::Idle; 2];

        let id = self.allocate_id();
        self.active = Some(Active {
            id,
            speaker: Speaker::Track(track),
            paused: false,
        });
        let utterance = Utterance {
            id,
            text: text.to_string(),
            lang: self.lang.clone(),
            rate: self.clamp_rate(options.rate),
            voice: self.resolve_voice(options.voice.as_deref()),
        };
        info!(
            "[playback] Speaking {} text (utterance {}, rate {})",
            track, id, utterance.rate
        );
        engine.speak(utterance);

        Ok(self.changes_since(before))
    }

    /// Cancels anything in flight and resets both controls
    pub fn stop<E: SpeechEngine>(&mut self, engine: &mut E) -> Vec<ButtonUpdate> {
        engine.cancel();
        self.active = None;
        self.buttons = [PlayButton::Idle; 2];
        Track::ALL.into_iter().map(|t| self.update(t)).collect()
    }

    /// Speaks one word right away, pre-empting the track players
    pub fn speak_word<E: SpeechEngine>(&mut self, word: &str, engine: &mut E) -> Vec<ButtonUpdate> {
        let word = word.trim();
        if word.is_empty() {
            return Vec::new();
        }
        let before = self.buttons;

        engine.cancel();
        self.buttons = [PlayButton::Idle; 2];
        let id = self.allocate_id();
        self.active = Some(Active {
            id,
            speaker: Speaker::Word,
            paused: false,
        });
        debug!("[playback] Pronouncing {:?} (utterance {})", word, id);
        engine.speak(Utterance {
            id,
            text: word.to_string(),
            lang: self.lang.clone(),
            rate: self.default_rate,
            voice: None,
        });

        self.changes_since(before)
    }

    /// Applies an engine notification. Notifications for anything but the
    /// current utterance are ignored.
    pub fn on_event(&mut self, event: &SpeechEvent) -> Vec<ButtonUpdate> {
        let before = self.buttons;
        let id = match event {
            SpeechEvent::Started { id } | SpeechEvent::Ended { id } | SpeechEvent::Failed { id, .. } => *id,
        };
        let Some(active) = self.active.filter(|a| a.id == id) else {
            debug!("[playback] Ignoring stale event for utterance {}", id);
            return Vec::new();
        };

        match event {
            SpeechEvent::Started { .. } => {
                if let Speaker::Track(track) = active.speaker {
                    if !active.paused {
                        self.buttons[track.index()] = PlayButton::Playing;
                    }
                }
            }
            SpeechEvent::Ended { .. } => self.finish(active),
            SpeechEvent::Failed { message, .. } => {
                warn!(
                    "[playback] Utterance {} failed: {}",
                    id,
                    PlaybackError::Engine(message.clone())
                );
                self.finish(active);
            }
        }

        self.changes_since(before)
    }

    /// Stores the engine's voice list and returns the selector options:
    /// the engine default followed by the English voices.
    pub fn voices_changed(&mut self, voices: Vec<Voice>) -> Vec<VoiceOption> {
        self.voices = voices;
        info!("[playback] {} voices available", self.voices.len());
        self.voice_options()
    }

    pub fn voice_options(&self) -> Vec<VoiceOption> {
        let default = VoiceOption {
            id: None,
            label: "Default".to_string(),
        };
        std::iter::once(default)
            .chain(
                self.voices
                    .iter()
                    .filter(|v| v.lang.to_ascii_lowercase().contains("en"))
                    .map(|v| VoiceOption {
                        id: Some(v.id.clone()),
                        label: format!("{} ({})", v.name, v.lang),
                    }),
            )
            .collect()
    }

    fn finish(&mut self, active: Active) {
        self.active = None;
        if let Speaker::Track(track) = active.speaker {
            self.buttons[track.index()] = PlayButton::Idle;
        }
    }

    fn allocate_id(&mut self) -> UtteranceId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn clamp_rate(&self, rate: Option<f32>) -> f32 {
        match rate {
            Some(r) if r.is_finite() => r.clamp(MIN_RATE, MAX_RATE),
            _ => self.default_rate,
        }
    }

    fn resolve_voice(&self, voice: Option<&str>) -> Option<String> {
        let wanted = voice.filter(|v| !v.is_empty())?;
        if self.voices.iter().any(|v| v.id == wanted) {
            Some(wanted.to_string())
        } else {
            warn!("[playback] Voice {:?} not available, using engine default", wanted);
            None
        }
    }

    fn update(&self, track: Track) -> ButtonUpdate {
        let state = self.button(track);
        ButtonUpdate {
            track,
            state,
            label: state.label(),
        }
    }

    fn changes_since(&self, before: [PlayButton; 2]) -> Vec<ButtonUpdate> {
        Track::ALL
            .into_iter()
            .filter(|&t| before[t.index()] != self.button(t))
            .map(|t| self.update(t))
            .collect()
    }
}
