// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use lesson_core::{
    generate_lesson as run_generation, level_options, GenerationClient, LessonForm, LevelOption,
    RenderBatch, Session, Settings, SettingsView, UiEvent,
};
use log::{error, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tauri::{command, AppHandle, Emitter};

/// Event carrying render batches produced outside a command's return value
const RENDER_EVENT: &str = "render";

// ============ App State ============

pub struct AppState {
    pub settings: Mutex<Settings>,
    pub client: Mutex<GenerationClient>,
    pub session: Mutex<Session>,
}

impl AppState {
    fn new(settings: Settings) -> Self {
        Self {
            client: Mutex::new(GenerationClient::new(
                settings.endpoint.clone(),
                settings.temperature,
            )),
            session: Mutex::new(Session::new(&settings)),
            settings: Mutex::new(settings),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============ Settings Commands ============

#[command]
fn get_levels() -> Vec<LevelOption> {
    level_options()
}

#[command]
fn get_settings(state: tauri::State<'_, AppState>) -> SettingsView {
    lock(&state.settings).view()
}

#[command]
fn save_settings(state: tauri::State<'_, AppState>, settings: Settings) {
    let mut current = lock(&state.settings);
    current.merge(settings);

    // A generation already in flight finishes on the client it cloned
    *lock(&state.client) = GenerationClient::new(current.endpoint.clone(), current.temperature);
    lock(&state.session).apply_settings(&current);
    info!(
        "[settings] Saved: endpoint={}, model={}",
        current.endpoint, current.model
    );
}

// ============ Lesson Commands ============

#[command]
async fn generate_lesson(
    app: AppHandle,
    state: tauri::State<'_, AppState>,
    form: LessonForm,
) -> Result<RenderBatch, String> {
    let settings = lock(&state.settings).clone();
    let client = lock(&state.client).clone();

    let batch = run_generation(&state.session, &client, &form, &settings, |busy| {
        if let Err(e) = app.emit(RENDER_EVENT, busy) {
            warn!("[generate] Failed to emit busy state: {}", e);
        }
    })
    .await;
    Ok(batch)
}

#[command]
fn dispatch_event(state: tauri::State<'_, AppState>, event: UiEvent) -> Result<RenderBatch, String> {
    lock(&state.session).handle(event).map_err(|e| {
        warn!("[session] {}", e);
        e.to_string()
    })
}

// ============ Frontend Logging ============

#[command]
fn log_from_frontend(level: String, message: String) {
    match level.as_str() {
        "error" => error!("[Frontend] {}", message),
        "warn" => warn!("[Frontend] {}", message),
        _ => info!("[Frontend] {}", message),
    }
}

fn main() {
    let settings = Settings::from_env();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::new()
                .target(tauri_plugin_log::Target::new(
                    tauri_plugin_log::TargetKind::LogDir {
                        file_name: Some("context-weaver".into()),
                    },
                ))
                .target(tauri_plugin_log::Target::new(
                    tauri_plugin_log::TargetKind::Stdout,
                ))
                .level(log::LevelFilter::Info)
                .build(),
        )
        .manage(AppState::new(settings))
        .setup(|_app| {
            info!("=== Context Weaver Starting ===");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_levels,
            get_settings,
            save_settings,
            generate_lesson,
            dispatch_event,
            log_from_frontend,
        ])
        .run(tauri::generate_context!())
        .unwrap_or_else(|e| error!("error while running tauri application: {}", e));
}
