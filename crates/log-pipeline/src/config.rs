//! 소스 어댑터 설정
//!
//! [`AdapterConfig`]는 core의 [`AccessLogConfig`]/[`ErrorLogConfig`]를 기반으로
//! 어댑터 하나가 사용하는 불변 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use tailwatch_core::config::TailwatchConfig;
//! use tailwatch_log_pipeline::config::{AdapterConfig, SourceKind};
//!
//! let core_config = TailwatchConfig::default();
//! let config = AdapterConfig::from_core(&core_config, SourceKind::AccessLog)?;
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use tailwatch_core::config::{AccessLogConfig, ErrorLogConfig, MAX_LINE_COUNT, TailwatchConfig};

use crate::error::LogPipelineError;
use crate::filter::SkipPolicy;

/// 허용되는 HTTP 상태 코드 범위
const STATUS_CODE_RANGE: std::ops::RangeInclusive<u16> = 100..=599;

/// 로그 소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Apache2 access log
    AccessLog,
    /// nginx error log
    ErrorLog,
}

impl SourceKind {
    /// 모든 소스 종류
    pub const ALL: [SourceKind; 2] = [SourceKind::AccessLog, SourceKind::ErrorLog];

    /// 설정 섹션 이름
    pub fn section(self) -> &'static str {
        match self {
            Self::AccessLog => "access_log",
            Self::ErrorLog => "error_log",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

/// 어댑터 설정
///
/// 생성 이후 변경되지 않습니다. 빌더 또는 [`AdapterConfig::from_core`]를 통해
/// 검증된 값만 만들어집니다.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    kind: SourceKind,
    source_name: String,
    source_icon: String,
    log_path: String,
    line_count: usize,
    skip_policy: SkipPolicy,
}

impl AdapterConfig {
    /// 소스 종류
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// 표시 이름
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// 아이콘 URL
    pub fn source_icon(&self) -> &str {
        &self.source_icon
    }

    /// 원격 로그 파일 경로
    pub fn log_path(&self) -> &str {
        &self.log_path
    }

    /// 요청할 라인 수
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// 제외 정책
    pub fn skip_policy(&self) -> &SkipPolicy {
        &self.skip_policy
    }

    /// core 설정의 해당 섹션에서 어댑터 설정을 생성합니다.
    pub fn from_core(core: &TailwatchConfig, kind: SourceKind) -> Result<Self, LogPipelineError> {
        match kind {
            SourceKind::AccessLog => Self::from_access_log(&core.access_log),
            SourceKind::ErrorLog => Self::from_error_log(&core.error_log),
        }
    }

    /// `[access_log]` 섹션에서 생성합니다.
    pub fn from_access_log(section: &AccessLogConfig) -> Result<Self, LogPipelineError> {
        AdapterConfigBuilder::new(SourceKind::AccessLog)
            .source_name(section.name.clone())
            .source_icon(section.icon.clone())
            .log_path(section.log_path.clone())
            .line_count(section.line_count)
            .skip_codes(section.skip_codes.clone())
            .skip_strings(section.skip_strings.clone())
            .use_vuln_list(section.use_vuln_list)
            .build()
    }

    /// `[error_log]` 섹션에서 생성합니다.
    pub fn from_error_log(section: &ErrorLogConfig) -> Result<Self, LogPipelineError> {
        AdapterConfigBuilder::new(SourceKind::ErrorLog)
            .source_name(section.name.clone())
            .source_icon(section.icon.clone())
            .log_path(section.log_path.clone())
            .line_count(section.message_count)
            .skip_strings(section.skip_strings.clone())
            .use_vuln_list(section.use_vuln_list)
            .build()
    }
}

/// 어댑터 설정 빌더
///
/// 종류별 기본값(core 섹션의 `Default`)에서 시작합니다.
pub struct AdapterConfigBuilder {
    kind: SourceKind,
    source_name: String,
    source_icon: String,
    log_path: String,
    line_count: usize,
    skip_codes: Vec<u16>,
    skip_strings: Vec<String>,
    use_vuln_list: bool,
}

impl AdapterConfigBuilder {
    /// 종류별 기본값으로 새 빌더를 생성합니다.
    pub fn new(kind: SourceKind) -> Self {
        match kind {
            SourceKind::AccessLog => {
                let d = AccessLogConfig::default();
                Self {
                    kind,
                    source_name: d.name,
                    source_icon: d.icon,
                    log_path: d.log_path,
                    line_count: d.line_count,
                    skip_codes: d.skip_codes,
                    skip_strings: d.skip_strings,
                    use_vuln_list: d.use_vuln_list,
                }
            }
            SourceKind::ErrorLog => {
                let d = ErrorLogConfig::default();
                Self {
                    kind,
                    source_name: d.name,
                    source_icon: d.icon,
                    log_path: d.log_path,
                    line_count: d.message_count,
                    skip_codes: Vec::new(),
                    skip_strings: d.skip_strings,
                    use_vuln_list: d.use_vuln_list,
                }
            }
        }
    }

    /// 표시 이름을 설정합니다.
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// 아이콘 URL을 설정합니다.
    pub fn source_icon(mut self, icon: impl Into<String>) -> Self {
        self.source_icon = icon.into();
        self
    }

    /// 원격 로그 파일 경로를 설정합니다.
    pub fn log_path(mut self, path: impl Into<String>) -> Self {
        self.log_path = path.into();
        self
    }

    /// 요청할 라인 수를 설정합니다.
    pub fn line_count(mut self, count: usize) -> Self {
        self.line_count = count;
        self
    }

    /// 제외 상태 코드를 설정합니다 (access log 전용).
    pub fn skip_codes(mut self, codes: Vec<u16>) -> Self {
        self.skip_codes = codes;
        self
    }

    /// 제외 부분 문자열을 설정합니다.
    pub fn skip_strings(mut self, strings: Vec<String>) -> Self {
        self.skip_strings = strings;
        self
    }

    /// 스캐너 시그니처 목록 사용 여부를 설정합니다.
    pub fn use_vuln_list(mut self, enabled: bool) -> Self {
        self.use_vuln_list = enabled;
        self
    }

    fn config_error(&self, field: &str, reason: String) -> LogPipelineError {
        LogPipelineError::Config {
            field: format!("{}.{field}", self.kind.section()),
            reason,
        }
    }

    fn validate(&self) -> Result<(), LogPipelineError> {
        if self.line_count == 0 || self.line_count > MAX_LINE_COUNT {
            return Err(self.config_error("line_count", format!("must be 1-{MAX_LINE_COUNT}")));
        }

        if self.log_path.trim().is_empty() {
            return Err(self.config_error("log_path", "must not be empty".to_owned()));
        }

        if let Some(code) = self
            .skip_codes
            .iter()
            .find(|code| !STATUS_CODE_RANGE.contains(*code))
        {
            return Err(self.config_error(
                "skip_codes",
                format!("{code} is not an HTTP status code (100-599)"),
            ));
        }

        if self.kind == SourceKind::ErrorLog && !self.skip_codes.is_empty() {
            return Err(self.config_error(
                "skip_codes",
                "status codes only apply to the access log".to_owned(),
            ));
        }

        Ok(())
    }

    /// 설정을 검증하고 `AdapterConfig`를 생성합니다.
    pub fn build(self) -> Result<AdapterConfig, LogPipelineError> {
        self.validate()?;
        Ok(AdapterConfig {
            kind: self.kind,
            source_name: self.source_name,
            source_icon: self.source_icon,
            log_path: self.log_path,
            line_count: self.line_count,
            skip_policy: SkipPolicy::new(self.skip_codes, self.skip_strings, self.use_vuln_list),
        })
    }
}
