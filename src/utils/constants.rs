//! Shared constants and invariants

pub const DEFAULT_API_BASE: &str = "https://www.getfresh.energy";
/// Public OAuth client of the web frontend, used with an empty secret.
pub const DEFAULT_CLIENT_ID: &str = "fresh-webclient";

pub const TOKEN_PATH: &str = "/oauth/token";
pub const GRANT_TYPE_PASSWORD: &str = "password";
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

pub const FALLBACK_WINDOW_SECONDS: i64 = 3600;
pub const QUERY_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub const DEFAULT_INTERVAL_SECS: u64 = 30;
pub const INTERVAL_MIN_SECS: u64 = 5;

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10000;

pub const STATE_FILE_NAME: &str = "state.json";
pub const STATE_FILE_MODE: u32 = 0o640;

pub const METER_TAG: &str = "meter";
