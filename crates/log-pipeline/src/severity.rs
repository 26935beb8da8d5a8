//! 심각도 분류 -- 형식별 마커를 [`Severity`]와 표시 레이블로 변환합니다.
//!
//! # 매핑 규칙
//! - Access log (HTTP 상태 코드): 500, 503 -> 3 / 414 -> 2 / 404 -> 1 / 그 외 -> 0
//! - Error log (괄호 레벨 토큰): emerg, alert, crit -> 3 / error, warn -> 2 /
//!   notice, info, debug -> 1 / 토큰 없음 -> 0

use tailwatch_core::types::Severity;

/// nginx error log의 괄호 레벨 토큰
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Emerg,
    Alert,
    Crit,
    Error,
    Warn,
    Notice,
    Info,
    Debug,
}

impl LogLevel {
    /// 토큰 검사 순서. 이 순서에서 먼저 발견된 토큰이 라인의 레벨이 됩니다.
    pub const SCAN_ORDER: [LogLevel; 8] = [
        LogLevel::Emerg,
        LogLevel::Alert,
        LogLevel::Crit,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Notice,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    /// 로그 라인에 나타나는 괄호 포함 토큰
    pub fn token(self) -> &'static str {
        match self {
            Self::Emerg => "[emerg]",
            Self::Alert => "[alert]",
            Self::Crit => "[crit]",
            Self::Error => "[error]",
            Self::Warn => "[warn]",
            Self::Notice => "[notice]",
            Self::Info => "[info]",
            Self::Debug => "[debug]",
        }
    }

    /// 토큰에 대응하는 심각도
    pub fn severity(self) -> Severity {
        match self {
            Self::Emerg | Self::Alert | Self::Crit => Severity::Critical,
            Self::Error | Self::Warn => Severity::Warning,
            Self::Notice | Self::Info | Self::Debug => Severity::Notice,
        }
    }
}

/// 심각도 판단에 쓰이는 형식별 마커
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityMarker {
    /// HTTP 상태 코드 (access log)
    Status(u16),
    /// 괄호 레벨 토큰 (error log)
    Level(LogLevel),
    /// 인식 가능한 마커 없음
    Unrecognized,
}

/// HTTP 상태 코드를 심각도로 변환합니다.
pub fn classify_status(code: u16) -> Severity {
    match code {
        500 | 503 => Severity::Critical,
        414 => Severity::Warning,
        404 => Severity::Notice,
        _ => Severity::Unknown,
    }
}

/// 마커를 심각도로 변환합니다.
pub fn classify(marker: SeverityMarker) -> Severity {
    match marker {
        SeverityMarker::Status(code) => classify_status(code),
        SeverityMarker::Level(level) => level.severity(),
        SeverityMarker::Unrecognized => Severity::Unknown,
    }
}

/// 서수 심각도를 표시 레이블로 변환합니다.
///
/// 3 -> "danger", 2 -> "warning", 1 -> "notice", 그 외 -> "unknown"
pub fn severity_to_text(level: u8) -> &'static str {
    Severity::from_level(level).label()
}
