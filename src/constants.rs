/// User-Agent the HoYoLAB game-record API expects
pub const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 11; SAMSUNG SM-G973U) AppleWebKit/537.36 (KHTML, like Gecko) SamsungBrowser/14.2 Chrome/87.0.4280.141 Mobile Safari/537.36";

/// Genshin Impact daily note endpoint
pub const GENSHIN_NOTES_URL: &str =
    "https://bbs-api-os.hoyolab.com/game_record/genshin/api/dailyNote";

/// Honkai: Star Rail note endpoint
pub const HSR_NOTES_URL: &str = "https://bbs-api-os.hoyolab.com/game_record/hkrpg/api/note";

/// HoYoLAB website URL
pub const HOYOLAB_URL: &str = "https://www.hoyolab.com";

/// Origin/Referer the endpoints require
pub const HOYOLAB_ACT_ORIGIN: &str = "https://act.hoyolab.com";

/// Public salt for the DS header digest
pub const DS_SALT: &str = "6s25p5ox5y14umn1p61aqyyvbvvl3lrt";

/// x-rpc-app_version header value
pub const RPC_APP_VERSION: &str = "1.5.0";

/// x-rpc-client_type header value
pub const RPC_CLIENT_TYPE: &str = "5";

/// x-rpc-language header value
pub const RPC_LANGUAGE: &str = "en-us";

/// Success sentinel in API replies
pub const RETCODE_OK: i64 = 0;

/// Retcode of the synthetic reply returned when no HSR UID is configured
pub const RETCODE_NOT_CONFIGURED: i64 = -1;

/// Message of the synthetic reply returned when no HSR UID is configured
pub const HSR_NOT_CONFIGURED_MESSAGE: &str = "HSR UID not configured";

/// Marker the API puts in the message when Real-Time Notes are private
pub const DATA_NOT_PUBLIC_MARKER: &str = "Data is not public";

/// Config directory name (under ~/.config/)
pub const CONFIG_DIR_NAME: &str = "resinbar";

/// Config filename
pub const CONFIG_FILE: &str = "config.json";

/// Settings filename
pub const SETTINGS_FILE: &str = "settings.json";

/// Suffix appended when backing up an existing config
pub const CONFIG_BACKUP_SUFFIX: &str = ".backup";

/// File permissions for the config (owner read/write only)
#[cfg(unix)]
pub const SECURE_FILE_MODE: u32 = 0o600;

/// Minimum digits in a valid account id
pub const UID_MIN_LEN: usize = 8;

/// Tray icon ID
pub const TRAY_ID: &str = "main-tray";

/// Default tray title when no data
pub const TRAY_TITLE_DEFAULT: &str = "--";

/// Menu item IDs
pub mod menu {
    pub const OPEN_HOYOLAB: &str = "open-hoyolab";
    pub const REFRESH: &str = "refresh";
    pub const SETTINGS: &str = "settings";
    pub const QUIT: &str = "quit";
}

/// Time constants
pub mod time {
    /// Seconds per hour
    pub const SECONDS_PER_HOUR: u64 = 3600;

    /// Seconds per minute
    pub const SECONDS_PER_MINUTE: u64 = 60;

    /// Minutes per hour
    pub const MINUTES_PER_HOUR: i64 = 60;

    /// Hours per day
    pub const HOURS_PER_DAY: i64 = 24;

    /// Hours threshold for "tomorrow" display
    pub const HOURS_TOMORROW_THRESHOLD: i64 = 48;

    /// Fallback check interval when auto-refresh is disabled (seconds)
    pub const DISABLED_REFRESH_CHECK_SECS: u64 = 60;
}

/// Progress bar characters
pub mod progress {
    pub const CIRCLES: (&str, &str) = ("●", "○");
    pub const BLOCKS: (&str, &str) = ("▰", "▱");
    pub const BAR: (&str, &str) = ("█", "░");
    pub const DOTS: (&str, &str) = ("⬤", "○");
}
