//! 설정 관리 -- tailwatch.toml 파싱 및 런타임 설정
//!
//! [`TailwatchConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`TAILWATCH_REMOTE_HOST=web-01` 형식)
//! 3. 설정 파일 (`tailwatch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), tailwatch_core::error::TailwatchError> {
//! use tailwatch_core::config::TailwatchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = TailwatchConfig::load("tailwatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = TailwatchConfig::parse("[remote]\nhost = \"web-01\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, TailwatchError};

/// 한 번에 요청할 수 있는 최대 라인 수
pub const MAX_LINE_COUNT: usize = 1_000_000;

/// tailwatch 통합 설정
///
/// `tailwatch.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TailwatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 원격 명령 실행 설정
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Apache2 access log 소스 설정
    #[serde(default)]
    pub access_log: AccessLogConfig,
    /// nginx error log 소스 설정
    #[serde(default)]
    pub error_log: ErrorLogConfig,
}

impl TailwatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TailwatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TailwatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TailwatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                TailwatchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, TailwatchError> {
        toml::from_str(toml_str).map_err(|e| {
            TailwatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `TAILWATCH_{SECTION}_{FIELD}`
    /// 예: `TAILWATCH_ACCESS_LOG_LINE_COUNT=1000`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "TAILWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "TAILWATCH_GENERAL_LOG_FORMAT");
        override_opt_string(
            &mut self.general.vuln_list_path,
            "TAILWATCH_GENERAL_VULN_LIST_PATH",
        );

        // Remote
        override_string(&mut self.remote.mode, "TAILWATCH_REMOTE_MODE");
        override_string(&mut self.remote.host, "TAILWATCH_REMOTE_HOST");
        override_u16(&mut self.remote.port, "TAILWATCH_REMOTE_PORT");
        override_string(&mut self.remote.user, "TAILWATCH_REMOTE_USER");
        override_string(
            &mut self.remote.identity_file,
            "TAILWATCH_REMOTE_IDENTITY_FILE",
        );

        // Access log
        override_bool(&mut self.access_log.enabled, "TAILWATCH_ACCESS_LOG_ENABLED");
        override_string(&mut self.access_log.log_path, "TAILWATCH_ACCESS_LOG_LOG_PATH");
        override_usize(
            &mut self.access_log.line_count,
            "TAILWATCH_ACCESS_LOG_LINE_COUNT",
        );
        override_csv_u16(
            &mut self.access_log.skip_codes,
            "TAILWATCH_ACCESS_LOG_SKIP_CODES",
        );
        override_csv(
            &mut self.access_log.skip_strings,
            "TAILWATCH_ACCESS_LOG_SKIP_STRINGS",
        );
        override_bool(
            &mut self.access_log.use_vuln_list,
            "TAILWATCH_ACCESS_LOG_USE_VULN_LIST",
        );

        // Error log
        override_bool(&mut self.error_log.enabled, "TAILWATCH_ERROR_LOG_ENABLED");
        override_string(&mut self.error_log.log_path, "TAILWATCH_ERROR_LOG_LOG_PATH");
        override_usize(
            &mut self.error_log.message_count,
            "TAILWATCH_ERROR_LOG_MESSAGE_COUNT",
        );
        override_csv(
            &mut self.error_log.skip_strings,
            "TAILWATCH_ERROR_LOG_SKIP_STRINGS",
        );
        override_bool(
            &mut self.error_log.use_vuln_list,
            "TAILWATCH_ERROR_LOG_USE_VULN_LIST",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), TailwatchError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // remote.mode 검증
        let valid_modes = ["ssh", "local"];
        if !valid_modes.contains(&self.remote.mode.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "remote.mode".to_owned(),
                reason: format!("must be one of: {}", valid_modes.join(", ")),
            }
            .into());
        }

        let any_enabled = self.access_log.enabled || self.error_log.enabled;
        if any_enabled && self.remote.mode == "ssh" && self.remote.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote.host".to_owned(),
                reason: "host must not be empty in ssh mode".to_owned(),
            }
            .into());
        }

        if self.remote.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.port".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.access_log.enabled {
            validate_count("access_log.line_count", self.access_log.line_count)?;
            validate_path("access_log.log_path", &self.access_log.log_path)?;
        }

        if self.error_log.enabled {
            validate_count("error_log.message_count", self.error_log.message_count)?;
            validate_path("error_log.log_path", &self.error_log.log_path)?;
        }

        Ok(())
    }
}

fn validate_count(field: &str, count: usize) -> Result<(), TailwatchError> {
    if count == 0 || count > MAX_LINE_COUNT {
        return Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: format!("must be 1-{}", MAX_LINE_COUNT),
        }
        .into());
    }
    Ok(())
}

fn validate_path(field: &str, path: &str) -> Result<(), TailwatchError> {
    // 원격 셸 명령에 그대로 들어가므로 공백과 셸 메타문자를 허용하지 않음
    let forbidden = |c: char| c.is_whitespace() || "'\"`$;&|<>\\".contains(c);
    if path.is_empty() || !path.starts_with('/') || path.contains(forbidden) {
        return Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: format!("'{}' must be an absolute path without shell metacharacters", path),
        }
        .into());
    }
    Ok(())
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 스캐너 시그니처 목록 파일 경로 (없으면 내장 목록 사용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vuln_list_path: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            vuln_list_path: None,
        }
    }
}

/// 원격 명령 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// 실행 모드 (ssh, local)
    pub mode: String,
    /// 원격 호스트
    pub host: String,
    /// SSH 포트
    pub port: u16,
    /// SSH 사용자 (비어 있으면 ssh 기본값)
    pub user: String,
    /// SSH 개인 키 경로 (비어 있으면 ssh 기본값)
    pub identity_file: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            mode: "ssh".to_owned(),
            host: "localhost".to_owned(),
            port: 22,
            user: String::new(),
            identity_file: String::new(),
        }
    }
}

/// Apache2 access log 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessLogConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 표시 이름
    pub name: String,
    /// 아이콘 URL
    pub icon: String,
    /// 원격 로그 파일 경로
    pub log_path: String,
    /// 요청할 라인 수
    pub line_count: usize,
    /// 제외할 HTTP 상태 코드
    pub skip_codes: Vec<u16>,
    /// 제외할 부분 문자열 (대소문자 무시)
    pub skip_strings: Vec<String>,
    /// 스캐너 시그니처 목록 사용 여부
    pub use_vuln_list: bool,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "Apache2 access log".to_owned(),
            icon: "https://static.fbinhouse.se/icon-apache2-16x16.png".to_owned(),
            log_path: "/var/log/apache2/access.log".to_owned(),
            line_count: 50_000,
            skip_codes: Vec::new(),
            skip_strings: Vec::new(),
            use_vuln_list: true,
        }
    }
}

/// nginx error log 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorLogConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 표시 이름
    pub name: String,
    /// 아이콘 URL
    pub icon: String,
    /// 원격 로그 파일 경로
    pub log_path: String,
    /// 요청할 메시지 수
    pub message_count: usize,
    /// 제외할 부분 문자열 (대소문자 무시)
    pub skip_strings: Vec<String>,
    /// 스캐너 시그니처 목록 사용 여부
    pub use_vuln_list: bool,
}

impl Default for ErrorLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "nginx error log".to_owned(),
            icon: "https://static.fbinhouse.se/icon-nginx-16x16-improved.png".to_owned(),
            log_path: "/var/log/nginx/error.log".to_owned(),
            message_count: 100,
            skip_strings: Vec::new(),
            use_vuln_list: true,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = if val.is_empty() { None } else { Some(val) };
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

fn override_csv_u16(target: &mut Vec<u16>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        let parsed: Result<Vec<u16>, _> = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<u16>)
            .collect();
        match parsed {
            Ok(codes) => *target = codes,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse status code list from env var, ignoring"
            ),
        }
    }
}
