mod config;
mod constants;
mod ds;
mod error;
mod hoyolab;
mod settings;

use config::{Config, ConfigManager};
use error::ConfigError;
use hoyolab::HoyoClient;
use serde::Serialize;
use settings::{AppSettings, SettingsManager};
use std::sync::Arc;
use tauri::{
    menu::{MenuBuilder, MenuItemBuilder},
    tray::TrayIconBuilder,
    AppHandle, Emitter, Manager, State,
};
use tauri_plugin_notification::NotificationExt;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSnapshot {
    pub current: u32,
    pub max: u32,
    pub recovery_seconds: u64,
}

impl ResourceSnapshot {
    /// Fill fraction in [0, 1]; a zero max renders as empty rather than
    /// dividing by zero.
    pub fn fraction(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            f64::from(self.current) / f64::from(self.max)
        }
    }

    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PanelState {
    #[default]
    Loading,
    Ready(ResourceSnapshot),
    NotConfigured,
    DataNotPublic,
    ApiError,
    NetworkError,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panels {
    pub genshin: PanelState,
    pub hsr: PanelState,
}

pub struct AppState {
    config_manager: ConfigManager,
    settings_manager: SettingsManager,
    http_client: reqwest::Client,
    panels: Mutex<Panels>,
    settings: Mutex<AppSettings>,
    last_notified_genshin: Mutex<Option<u32>>,
    last_notified_hsr: Mutex<Option<u32>>,
}

#[tauri::command]
async fn get_config(state: State<'_, Arc<AppState>>) -> Result<Config, String> {
    match state.config_manager.load() {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(_)) => Ok(Config::default()),
        Err(e) => Err(e.to_string()),
    }
}

#[tauri::command]
async fn save_config(state: State<'_, Arc<AppState>>, config: Config) -> Result<(), String> {
    if !config.uid.is_empty() && !config::is_valid_uid(&config.uid) {
        return Err(ConfigError::InvalidUid(config.uid).to_string());
    }
    if let Some(uid) = config.hsr_uid.as_deref() {
        if !uid.is_empty() && !config::is_valid_uid(uid) {
            return Err(ConfigError::InvalidUid(uid.to_string()).to_string());
        }
    }
    state.config_manager.save(&config).map_err(|e| e.to_string())
}

#[tauri::command]
async fn import_cookie_string(
    state: State<'_, Arc<AppState>>,
    raw: String,
) -> Result<Config, String> {
    let (ltoken, ltuid) = config::parse_cookie_string(&raw).map_err(|e| e.to_string())?;

    let mut config = match state.config_manager.load() {
        Ok(config) => config,
        Err(ConfigError::NotFound(_)) => Config::default(),
        Err(e) => return Err(e.to_string()),
    };
    config.ltoken = ltoken;
    config.ltuid = ltuid;

    state
        .config_manager
        .save(&config)
        .map_err(|e| e.to_string())?;
    Ok(config)
}

#[tauri::command]
async fn get_settings(state: State<'_, Arc<AppState>>) -> Result<AppSettings, String> {
    let settings = state.settings.lock().await;
    Ok(settings.clone())
}

#[tauri::command]
async fn save_settings(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    new_settings: AppSettings,
) -> Result<(), String> {
    state.settings_manager.save(&new_settings).map_err(|e| e.to_string())?;

    {
        let mut settings = state.settings.lock().await;
        *settings = new_settings;
    }

    let panels = state.panels.lock().await;
    let settings = state.settings.lock().await;
    update_tray(&app, &panels, &settings);

    Ok(())
}

#[tauri::command]
async fn refresh_resources(app: AppHandle, state: State<'_, Arc<AppState>>) -> Result<(), String> {
    do_refresh(&app, &state).await;
    Ok(())
}

#[tauri::command]
async fn test_notification(app: AppHandle) -> Result<(), String> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i32)
        .unwrap_or(0);

    app.notification()
        .builder()
        .id(id)
        .title("Resinbar")
        .body("This is a test notification!")
        .show()
        .map_err(|e| e.to_string())?;
    Ok(())
}

async fn check_and_notify(
    app: &AppHandle,
    state: &Arc<AppState>,
    panels: &Panels,
    settings: &AppSettings,
) {
    if settings.notify_genshin > 0 {
        if let PanelState::Ready(ref snapshot) = panels.genshin {
            let pct = snapshot.percent();
            if pct >= settings.notify_genshin {
                let mut last = state.last_notified_genshin.lock().await;
                if *last != Some(settings.notify_genshin) {
                    *last = Some(settings.notify_genshin);
                    let _ = app
                        .notification()
                        .builder()
                        .title("Resin nearly capped")
                        .body(format!(
                            "Original Resin at {}/{}",
                            snapshot.current, snapshot.max
                        ))
                        .show();
                }
            } else {
                let mut last = state.last_notified_genshin.lock().await;
                *last = None;
            }
        }
    }

    if settings.notify_hsr > 0 {
        if let PanelState::Ready(ref snapshot) = panels.hsr {
            let pct = snapshot.percent();
            if pct >= settings.notify_hsr {
                let mut last = state.last_notified_hsr.lock().await;
                if *last != Some(settings.notify_hsr) {
                    *last = Some(settings.notify_hsr);
                    let _ = app
                        .notification()
                        .builder()
                        .title("Trailblaze Power nearly capped")
                        .body(format!(
                            "Trailblaze Power at {}/{}",
                            snapshot.current, snapshot.max
                        ))
                        .show();
                }
            } else {
                let mut last = state.last_notified_hsr.lock().await;
                *last = None;
            }
        }
    }
}

fn update_tray(app: &AppHandle, panels: &Panels, settings: &AppSettings) {
    if let Some(tray) = app.tray_by_id(constants::TRAY_ID) {
        let title = format_tray_title(panels, settings);
        let _ = tray.set_title(Some(&title));

        if let Ok(menu) = create_tray_menu(app, panels, settings) {
            let _ = tray.set_menu(Some(menu));
        }
    }
}

fn ready(panel: &PanelState) -> Option<&ResourceSnapshot> {
    match panel {
        PanelState::Ready(snapshot) => Some(snapshot),
        _ => None,
    }
}

fn format_amount(snapshot: &ResourceSnapshot, show_max: bool) -> String {
    if show_max {
        format!("{}/{}", snapshot.current, snapshot.max)
    } else {
        snapshot.current.to_string()
    }
}

fn format_tray_title(panels: &Panels, settings: &AppSettings) -> String {
    let genshin = ready(&panels.genshin);
    let hsr = ready(&panels.hsr);

    let value = match settings.menu_bar_display.as_str() {
        "hsr" => hsr.map(|s| format_amount(s, settings.show_max)),
        "both" => match (genshin, hsr) {
            (Some(g), Some(h)) => Some(format!("{} · {}", g.current, h.current)),
            (Some(g), None) => Some(g.current.to_string()),
            (None, Some(h)) => Some(h.current.to_string()),
            _ => None,
        },
        _ => genshin.map(|s| format_amount(s, settings.show_max)),
    };

    value.unwrap_or_else(|| constants::TRAY_TITLE_DEFAULT.to_string())
}

fn make_progress_bar(fraction: f64, settings: &AppSettings) -> String {
    let len = settings.progress_length as usize;
    let filled = (fraction * len as f64).round() as usize;
    let empty = len - filled.min(len);

    let (filled_char, empty_char) = match settings.progress_style.as_str() {
        "blocks" => constants::progress::BLOCKS,
        "bar" => constants::progress::BAR,
        "dots" => constants::progress::DOTS,
        _ => constants::progress::CIRCLES,
    };

    format!("{}{}", filled_char.repeat(filled.min(len)), empty_char.repeat(empty))
}

/// Recovery timer as the panels show it, hours then minutes.
fn format_recovery(seconds: u64) -> String {
    let hours = seconds / constants::time::SECONDS_PER_HOUR;
    let minutes = (seconds % constants::time::SECONDS_PER_HOUR) / constants::time::SECONDS_PER_MINUTE;
    format!("{hours}h {minutes}m")
}

/// Wall-clock phrasing of when the resource caps out.
fn format_full_at(recovery_seconds: u64) -> String {
    use chrono::{Duration, Local};

    if recovery_seconds == 0 {
        return "full".to_string();
    }

    let diff = Duration::seconds(recovery_seconds as i64);
    let local = Local::now() + diff;

    if diff.num_minutes() < constants::time::MINUTES_PER_HOUR {
        format!("in {}m", diff.num_minutes())
    } else if diff.num_hours() < constants::time::HOURS_PER_DAY {
        let hours = diff.num_hours();
        let mins = diff.num_minutes() % constants::time::MINUTES_PER_HOUR;
        if mins > 0 {
            format!("in {hours}h {mins}m")
        } else {
            format!("in {hours}h")
        }
    } else if diff.num_hours() < constants::time::HOURS_TOMORROW_THRESHOLD {
        format!("tomorrow {}", local.format("%-I:%M %p"))
    } else {
        local.format("%a %-I:%M %p").to_string()
    }
}

fn panel_lines(label: &str, panel: &PanelState, settings: &AppSettings) -> Vec<String> {
    match panel {
        PanelState::Loading => vec![format!("{label} loading...")],
        PanelState::Ready(snapshot) => vec![
            format!(
                "{label} {} {:>7}",
                make_progress_bar(snapshot.fraction(), settings),
                format_amount(snapshot, true)
            ),
            format!(
                "        ↻ {} · {}",
                format_recovery(snapshot.recovery_seconds),
                format_full_at(snapshot.recovery_seconds)
            ),
        ],
        PanelState::NotConfigured => vec![format!("{label} not configured")],
        PanelState::DataNotPublic => vec![
            format!("{label} data not public"),
            "        enable Real-Time Notes on HoYoLAB".to_string(),
        ],
        PanelState::ApiError => vec![format!("{label} API error")],
        PanelState::NetworkError => vec![format!("{label} network error")],
    }
}

fn create_tray_menu(
    app: &AppHandle,
    panels: &Panels,
    settings: &AppSettings,
) -> tauri::Result<tauri::menu::Menu<tauri::Wry>> {
    let mut builder = MenuBuilder::new(app);

    for line in panel_lines("Resin  ", &panels.genshin, settings) {
        let item = MenuItemBuilder::new(line).enabled(false).build(app)?;
        builder = builder.item(&item);
    }
    for line in panel_lines("Stamina", &panels.hsr, settings) {
        let item = MenuItemBuilder::new(line).enabled(false).build(app)?;
        builder = builder.item(&item);
    }
    builder = builder.separator();

    let open_hoyolab =
        MenuItemBuilder::with_id(constants::menu::OPEN_HOYOLAB, "Open HoYoLAB").build(app)?;
    let refresh = MenuItemBuilder::with_id(constants::menu::REFRESH, "Refresh").build(app)?;
    let settings_item =
        MenuItemBuilder::with_id(constants::menu::SETTINGS, "Settings...").build(app)?;
    let quit = MenuItemBuilder::with_id(constants::menu::QUIT, "Quit").build(app)?;

    builder
        .item(&open_hoyolab)
        .item(&refresh)
        .separator()
        .item(&settings_item)
        .item(&quit)
        .build()
}

async fn do_refresh(app: &AppHandle, state: &Arc<AppState>) {
    let panels = match state.config_manager.load() {
        Ok(config) => {
            let client = HoyoClient::new(config, state.http_client.clone());
            let genshin = hoyolab::genshin_state(client.fetch_genshin_notes().await);
            let hsr = hoyolab::hsr_state(client.fetch_hsr_notes().await);
            Panels { genshin, hsr }
        }
        Err(ConfigError::NotFound(path)) => {
            tracing::info!("no config at {}, waiting for setup", path.display());
            Panels {
                genshin: PanelState::NotConfigured,
                hsr: PanelState::NotConfigured,
            }
        }
        Err(e) => {
            tracing::warn!("config reload failed: {e}");
            Panels {
                genshin: PanelState::NetworkError,
                hsr: PanelState::NetworkError,
            }
        }
    };

    {
        let mut stored = state.panels.lock().await;
        *stored = panels.clone();
    }

    let settings = state.settings.lock().await;
    update_tray(app, &panels, &settings);
    check_and_notify(app, state, &panels, &settings).await;
    drop(settings);

    let _ = app.emit("resources-updated", &panels);
}

fn start_auto_refresh(app: AppHandle, state: Arc<AppState>) {
    tauri::async_runtime::spawn(async move {
        loop {
            let interval = {
                let settings = state.settings.lock().await;
                settings.refresh_interval_secs
            };

            if interval == 0 {
                tokio::time::sleep(tokio::time::Duration::from_secs(
                    constants::time::DISABLED_REFRESH_CHECK_SECS,
                ))
                .await;
                continue;
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(u64::from(interval))).await;
            do_refresh(&app, &state).await;
        }
    });
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            let settings_manager = SettingsManager::new();
            let initial_settings = settings_manager.load().unwrap_or_default();

            let state = Arc::new(AppState {
                config_manager: ConfigManager::new(),
                settings_manager,
                http_client: reqwest::Client::new(),
                panels: Mutex::new(Panels::default()),
                settings: Mutex::new(initial_settings.clone()),
                last_notified_genshin: Mutex::new(None),
                last_notified_hsr: Mutex::new(None),
            });

            app.manage(state.clone());

            let menu = create_tray_menu(app.handle(), &Panels::default(), &initial_settings)?;

            let _tray = TrayIconBuilder::with_id(constants::TRAY_ID)
                .title(constants::TRAY_TITLE_DEFAULT)
                .menu(&menu)
                .show_menu_on_left_click(true)
                .on_menu_event(move |app, event| {
                    match event.id().as_ref() {
                        constants::menu::OPEN_HOYOLAB => {
                            let _ = open::that(constants::HOYOLAB_URL);
                        }
                        constants::menu::REFRESH => {
                            let app = app.clone();
                            tauri::async_runtime::spawn(async move {
                                let state = app.state::<Arc<AppState>>();
                                do_refresh(&app, &state).await;
                            });
                        }
                        constants::menu::SETTINGS => {
                            if let Some(window) = app.get_webview_window("main") {
                                let _ = window.show();
                                let _ = window.set_focus();
                            }
                        }
                        constants::menu::QUIT => {
                            app.exit(0);
                        }
                        _ => {}
                    }
                })
                .build(app)?;

            #[cfg(target_os = "macos")]
            {
                app.set_activation_policy(tauri::ActivationPolicy::Accessory);
            }

            let app_handle = app.handle().clone();
            let state_clone = state.clone();
            tauri::async_runtime::spawn(async move {
                do_refresh(&app_handle, &state_clone).await;
            });

            start_auto_refresh(app.handle().clone(), state.clone());

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_config,
            save_config,
            import_cookie_string,
            get_settings,
            save_settings,
            refresh_resources,
            test_notification
        ])
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::CloseRequested { api, .. } = event {
                window.hide().unwrap();
                api.prevent_close();
            }
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(current: u32, max: u32, recovery_seconds: u64) -> ResourceSnapshot {
        ResourceSnapshot {
            current,
            max,
            recovery_seconds,
        }
    }

    #[test]
    fn recovery_formats_as_hours_and_minutes() {
        assert_eq!(format_recovery(3661), "1h 1m");
        assert_eq!(format_recovery(0), "0h 0m");
        assert_eq!(format_recovery(59), "0h 0m");
        assert_eq!(format_recovery(28_800), "8h 0m");
    }

    #[test]
    fn amount_renders_current_over_max() {
        assert_eq!(format_amount(&snapshot(40, 160, 0), true), "40/160");
        assert_eq!(format_amount(&snapshot(40, 160, 0), false), "40");
    }

    #[test]
    fn fraction_guards_zero_max() {
        assert_eq!(snapshot(40, 0, 0).fraction(), 0.0);
        assert_eq!(snapshot(40, 160, 0).fraction(), 0.25);
        assert_eq!(snapshot(152, 160, 0).percent(), 95);
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        let settings = AppSettings::default();
        let bar = make_progress_bar(0.5, &settings);
        assert_eq!(bar.chars().filter(|&c| c == '●').count(), 5);
        assert_eq!(bar.chars().filter(|&c| c == '○').count(), 5);
    }

    #[test]
    fn progress_bar_clamps_overfull_values() {
        let settings = AppSettings::default();
        let bar = make_progress_bar(1.4, &settings);
        assert_eq!(bar.chars().filter(|&c| c == '●').count(), 10);
        assert_eq!(bar.chars().filter(|&c| c == '○').count(), 0);
    }

    #[test]
    fn tray_title_follows_display_mode() {
        let panels = Panels {
            genshin: PanelState::Ready(snapshot(40, 160, 3661)),
            hsr: PanelState::Ready(snapshot(120, 240, 0)),
        };
        let mut settings = AppSettings::default();

        assert_eq!(format_tray_title(&panels, &settings), "40/160");

        settings.show_max = false;
        assert_eq!(format_tray_title(&panels, &settings), "40");

        settings.menu_bar_display = "hsr".to_string();
        assert_eq!(format_tray_title(&panels, &settings), "120");

        settings.menu_bar_display = "both".to_string();
        assert_eq!(format_tray_title(&panels, &settings), "40 · 120");
    }

    #[test]
    fn tray_title_falls_back_when_nothing_loaded() {
        let settings = AppSettings::default();
        assert_eq!(format_tray_title(&Panels::default(), &settings), "--");

        let panels = Panels {
            genshin: PanelState::NetworkError,
            hsr: PanelState::ApiError,
        };
        assert_eq!(format_tray_title(&panels, &settings), "--");
    }

    #[test]
    fn ready_panel_shows_amount_and_recovery() {
        let settings = AppSettings::default();
        let lines = panel_lines(
            "Resin  ",
            &PanelState::Ready(snapshot(40, 160, 3661)),
            &settings,
        );
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("40/160"));
        assert!(lines[1].contains("1h 1m"));
    }

    #[test]
    fn not_public_panel_carries_visibility_instruction() {
        let settings = AppSettings::default();
        let lines = panel_lines("Stamina", &PanelState::DataNotPublic, &settings);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("data not public"));
        assert!(lines[1].contains("Real-Time Notes"));
    }

    #[test]
    fn error_panels_render_one_generic_line() {
        let settings = AppSettings::default();
        assert_eq!(
            panel_lines("Resin  ", &PanelState::ApiError, &settings),
            vec!["Resin   API error"]
        );
        assert_eq!(
            panel_lines("Resin  ", &PanelState::NetworkError, &settings),
            vec!["Resin   network error"]
        );
    }

    #[test]
    fn panels_start_in_loading_state() {
        let panels = Panels::default();
        assert!(matches!(panels.genshin, PanelState::Loading));
        assert!(matches!(panels.hsr, PanelState::Loading));
    }

    #[test]
    fn panel_state_serializes_with_status_tag() {
        let value = serde_json::to_value(PanelState::Ready(snapshot(40, 160, 3661))).unwrap();
        assert_eq!(value["status"], "ready");
        assert_eq!(value["current"], 40);
        assert_eq!(value["recoverySeconds"], 3661);

        let value = serde_json::to_value(PanelState::DataNotPublic).unwrap();
        assert_eq!(value["status"], "dataNotPublic");
    }
}
