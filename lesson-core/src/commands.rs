//! Render instructions sent to the UI, and the events it sends back

use crate::models::{OptionLabel, Track};
use crate::playback::{ButtonUpdate, PlaybackOptions, SpeechCommand, SpeechEvent, Voice, VoiceOption};
use crate::quiz::{QuizResult, QuizView};
use crate::render::LessonView;
use serde::{Deserialize, Serialize};

pub const GENERATE_READY_LABEL: &str = "✨ 生成语境故事 (Weave Context)";
pub const GENERATE_BUSY_LABEL: &str = "Generating...";

/// One instruction for the page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RenderCommand {
    SetGenerateButton { busy: bool, label: &'static str },
    ShowLesson(LessonView),
    ShowQuiz(QuizView),
    HideQuiz { track: Track },
    ShowQuizResult(QuizResult),
    SetPlayButton(ButtonUpdate),
    SetTranslationCollapsed { track: Track, collapsed: bool },
    SetVoiceOptions { voices: Vec<VoiceOption> },
    Speech(SpeechCommand),
    Notify { message: String },
}

impl RenderCommand {
    pub fn generate_button(busy: bool) -> Self {
        RenderCommand::SetGenerateButton {
            busy,
            label: if busy {
                GENERATE_BUSY_LABEL
            } else {
                GENERATE_READY_LABEL
            },
        }
    }
}

/// Ordered instructions produced by handling one event
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderBatch(pub Vec<RenderCommand>);

impl RenderBatch {
    pub fn push(&mut self, command: RenderCommand) {
        self.0.push(command);
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.0
    }

    pub fn buttons(&mut self, updates: Vec<ButtonUpdate>) {
        self.0.extend(updates.into_iter().map(RenderCommand::SetPlayButton));
    }

    pub fn speech(&mut self, commands: Vec<SpeechCommand>) {
        self.0.extend(commands.into_iter().map(RenderCommand::Speech));
    }
}

impl From<Vec<RenderCommand>> for RenderBatch {
    fn from(commands: Vec<RenderCommand>) -> Self {
        RenderBatch(commands)
    }
}

/// Something the learner or the speech engine did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    SelectAnswer {
        track: Track,
        question: usize,
        answer: OptionLabel,
    },
    SubmitQuiz {
        track: Track,
    },
    TogglePlayback {
        track: Track,
        #[serde(default)]
        options: PlaybackOptions,
    },
    StopPlayback,
    SpeakWord {
        word: String,
    },
    ToggleTranslation {
        track: Track,
    },
    VoicesChanged {
        voices: Vec<Voice>,
    },
    Speech {
        event: SpeechEvent,
    },
}
