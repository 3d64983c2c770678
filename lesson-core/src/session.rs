//! Session controller: owns the live lesson, quiz answers, playback state
//! and the busy flag, and turns UI events into render batches.

use crate::client::{parse_lesson, CompletionService};
use crate::commands::{RenderBatch, RenderCommand, UiEvent};
use crate::config::Settings;
use crate::error::{PlaybackError, QuizError, WeaveError};
use crate::models::{GenerationRequest, Lesson, LessonForm, OptionLabel, Track};
use crate::playback::{PlaybackController, PlaybackOptions, SpeechEvent, SpeechQueue, Voice};
use crate::prompts::{build_prompt, Prompt};
use crate::quiz::QuizState;
use crate::render::{render_lesson, LessonView};
use chrono::Utc;
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared "generation in flight" flag
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Marks the flag busy, or returns `None` when it already is
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }
}

/// Clears the busy flag when dropped
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A validated request waiting on the network. Holds the busy flag.
#[derive(Debug)]
pub struct PendingGeneration {
    pub request: GenerationRequest,
    pub prompt: Prompt,
    _busy: BusyGuard,
}

#[derive(Debug)]
pub struct Session {
    lesson: Option<Lesson>,
    view: Option<LessonView>,
    quizzes: [QuizState; 2],
    playback: PlaybackController,
    speech: SpeechQueue,
    busy: BusyFlag,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            lesson: None,
            view: None,
            quizzes: [QuizState::new(Track::Simple), QuizState::new(Track::Complex)],
            playback: PlaybackController::new(settings.speech_lang.clone(), settings.default_rate),
            speech: SpeechQueue::default(),
            busy: BusyFlag::default(),
        }
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        self.lesson.as_ref()
    }

    pub fn view(&self) -> Option<&LessonView> {
        self.view.as_ref()
    }

    pub fn quiz(&self, track: Track) -> &QuizState {
        &self.quizzes[track.index()]
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.playback
            .set_defaults(settings.speech_lang.clone(), settings.default_rate);
    }

    /// Validates the form and takes the busy flag. Nothing is sent yet.
    pub fn begin_generation(
        &mut self,
        form: &LessonForm,
        settings: &Settings,
    ) -> Result<PendingGeneration, WeaveError> {
        let busy = self.busy.try_acquire().ok_or(WeaveError::Busy)?;
        let request = GenerationRequest::new(form, settings)?;
        let prompt = build_prompt(&request);
        info!(
            "[generate] Starting {} {} lesson with {} words",
            request.level,
            request.length.label(),
            request.words.len()
        );
        Ok(PendingGeneration {
            request,
            prompt,
            _busy: busy,
        })
    }

    /// Installs the completion as the new lesson. On any failure the
    /// previous lesson stays untouched. The busy flag is released either way.
    pub fn finish_generation(
        &mut self,
        pending: PendingGeneration,
        outcome: Result<String, WeaveError>,
    ) -> Result<RenderBatch, WeaveError> {
        let PendingGeneration { request, _busy, .. } = pending;
        let payload = parse_lesson(&outcome?)?;

        let lesson = Lesson {
            payload,
            words: request.words,
            theme: request.theme,
            level: request.level,
            generated_at: Utc::now(),
        };
        info!(
            "[generate] Lesson ready at {}: {} + {} quiz questions, {} vocabulary entries",
            lesson.generated_at.to_rfc3339(),
            lesson.payload.simple_quiz.len(),
            lesson.payload.complex_quiz.len(),
            lesson.payload.vocabulary_data.len()
        );

        Ok(self.install(lesson))
    }

    fn install(&mut self, lesson: Lesson) -> RenderBatch {
        let mut batch = RenderBatch::default();

        let stopped = self.playback.stop(&mut self.speech);
        batch.buttons(stopped);
        batch.speech(self.speech.drain());

        let view = render_lesson(&lesson);
        batch.push(RenderCommand::ShowLesson(view.clone()));

        for track in Track::ALL {
            let questions = lesson.payload.quiz(track);
            match self.quizzes[track.index()].render(questions) {
                Some(quiz) => batch.push(RenderCommand::ShowQuiz(quiz)),
                None => batch.push(RenderCommand::HideQuiz { track }),
            }
        }

        batch.push(RenderCommand::generate_button(false));
        self.view = Some(view);
        self.lesson = Some(lesson);
        batch
    }

    /// Handles one UI or engine event
    pub fn handle(&mut self, event: UiEvent) -> Result<RenderBatch, WeaveError> {
        match event {
            UiEvent::SelectAnswer {
                track,
                question,
                answer,
            } => self.select_answer(track, question, answer),
            UiEvent::SubmitQuiz { track } => self.submit_quiz(track),
            UiEvent::TogglePlayback { track, options } => self.toggle_playback(track, &options),
            UiEvent::StopPlayback => Ok(self.stop_playback()),
            UiEvent::SpeakWord { word } => Ok(self.speak_word(&word)),
            UiEvent::ToggleTranslation { track } => Ok(self.toggle_translation(track)),
            UiEvent::VoicesChanged { voices } => Ok(self.voices_changed(voices)),
            UiEvent::Speech { event } => Ok(self.speech_event(&event)),
        }
    }

    fn select_answer(
        &mut self,
        track: Track,
        question: usize,
        answer: OptionLabel,
    ) -> Result<RenderBatch, WeaveError> {
        self.quizzes[track.index()].select(question, answer)?;
        Ok(RenderBatch::default())
    }

    fn submit_quiz(&mut self, track: Track) -> Result<RenderBatch, WeaveError> {
        let lesson = self.lesson.as_ref().ok_or(QuizError::NotRendered)?;
        let result = self.quizzes[track.index()].submit(lesson.payload.quiz(track))?;
        Ok(vec![RenderCommand::ShowQuizResult(result.clone())].into())
    }

    fn toggle_playback(
        &mut self,
        track: Track,
        options: &PlaybackOptions,
    ) -> Result<RenderBatch, WeaveError> {
        let text = self
            .view
            .as_ref()
            .map(|view| view.panel(track).plain_text())
            .unwrap_or_default();

        let updates = self
            .playback
            .toggle(track, &text, options, &mut self.speech)
            .inspect_err(|e: &PlaybackError| warn!("[playback] {}", e))?;

        let mut batch = RenderBatch::default();
        batch.buttons(updates);
        batch.speech(self.speech.drain());
        Ok(batch)
    }

    fn stop_playback(&mut self) -> RenderBatch {
        let mut batch = RenderBatch::default();
        batch.buttons(self.playback.stop(&mut self.speech));
        batch.speech(self.speech.drain());
        batch
    }

    fn speak_word(&mut self, word: &str) -> RenderBatch {
        let mut batch = RenderBatch::default();
        batch.buttons(self.playback.speak_word(word, &mut self.speech));
        batch.speech(self.speech.drain());
        batch
    }

    fn toggle_translation(&mut self, track: Track) -> RenderBatch {
        let Some(panel) = self
            .view
            .as_mut()
            .and_then(|view| view.panel_mut(track).translation.as_mut())
        else {
            return RenderBatch::default();
        };
        panel.collapsed = !panel.collapsed;
        vec![RenderCommand::SetTranslationCollapsed {
            track,
            collapsed: panel.collapsed,
        }]
        .into()
    }

    fn voices_changed(&mut self, voices: Vec<Voice>) -> RenderBatch {
        let voices = self.playback.voices_changed(voices);
        vec![RenderCommand::SetVoiceOptions { voices }].into()
    }

    fn speech_event(&mut self, event: &SpeechEvent) -> RenderBatch {
        let mut batch = RenderBatch::default();
        batch.buttons(self.playback.on_event(event));
        batch
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One notification plus, unless another generation owns the trigger, a
/// ready generate button
fn failure_batch(err: &WeaveError) -> RenderBatch {
    let message = match err {
        WeaveError::Input(message) => message.clone(),
        WeaveError::Busy => return vec![RenderCommand::Notify { message: err.to_string() }].into(),
        other => format!("Error generating content: {}", other),
    };
    vec![
        RenderCommand::Notify { message },
        RenderCommand::generate_button(false),
    ]
    .into()
}

/// Runs one full generation: validate, mark busy, call the model, parse and
/// install. Never fails; errors come back as a notification. `on_busy`
/// receives the busy-state batch before the network round trip starts.
pub async fn generate_lesson<C, F>(
    session: &Mutex<Session>,
    client: &C,
    form: &LessonForm,
    settings: &Settings,
    on_busy: F,
) -> RenderBatch
where
    C: CompletionService,
    F: FnOnce(RenderBatch),
{
    let started = lock(session).begin_generation(form, settings);
    let pending = match started {
        Ok(pending) => pending,
        Err(e) => {
            warn!("[generate] Not started: {}", e);
            return failure_batch(&e);
        }
    };
    on_busy(vec![RenderCommand::generate_button(true)].into());

    let outcome = client.complete(&pending.request, &pending.prompt).await;

    let finished = lock(session).finish_generation(pending, outcome);
    match finished {
        Ok(batch) => batch,
        Err(e) => {
            error!("[generate] {}", e);
            failure_batch(&e)
        }
    }
}
