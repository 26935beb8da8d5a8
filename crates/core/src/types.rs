//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 로그 소스 어댑터가 만들어 호출자에게 넘기는 알림 레코드와
//! 그 구성 요소를 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 심각도 레벨
///
/// 0..=3 서수 값을 가지며 `Ord` 구현은 서수 순서를 따릅니다
/// (`Unknown < Notice < Warning < Critical`).
/// 직렬화 시에는 서수 숫자로 표현됩니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", from = "u8")]
pub enum Severity {
    /// 알 수 없음 / 해당 없음
    #[default]
    Unknown,
    /// 참고
    Notice,
    /// 경고
    Warning,
    /// 치명적 -- 즉시 대응 필요
    Critical,
}

impl Severity {
    /// 서수 값을 반환합니다.
    pub fn level(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Notice => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }

    /// 서수 값에서 심각도를 만듭니다. 범위를 벗어나면 `Unknown`입니다.
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => Self::Notice,
            2 => Self::Warning,
            3 => Self::Critical,
            _ => Self::Unknown,
        }
    }

    /// 사람이 읽는 레이블 ("danger", "warning", "notice", "unknown")
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "danger",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Unknown => "unknown",
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.level()
    }
}

impl From<u8> for Severity {
    fn from(level: u8) -> Self {
        Self::from_level(level)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 알림 레코드의 부가 표시 필드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraField {
    /// 필드 제목 (예: "Time", "IP", "Referer")
    pub title: String,
    /// 필드 값
    pub value: String,
    /// 짧은 필드 여부 (나란히 표시 가능)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub short: bool,
}

impl ExtraField {
    /// 짧은 필드를 생성합니다.
    pub fn short(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: true,
        }
    }

    /// 긴 필드를 생성합니다.
    pub fn long(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: false,
        }
    }
}

/// 알림 레코드
///
/// 필터를 통과한 로그 라인 하나당 정확히 하나씩, 라인 순서대로 생성됩니다.
/// 생성 이후 변경되지 않으며 반환된 뒤에는 호출자가 소유합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// 원본 로그 라인
    pub raw: String,
    /// 소스 표시 이름 (예: "Apache2 access log")
    pub source_name: String,
    /// 소스 아이콘 URL
    pub source_icon: String,
    /// 제목 (상태 코드 또는 심각도 레이블)
    pub title: String,
    /// 정규화된 메시지
    pub message: String,
    /// 심각도
    pub severity: Severity,
    /// 부가 필드 (Time, IP, Referer 순서)
    pub extra_fields: Vec<ExtraField>,
}

impl AlertRecord {
    /// 제목으로 부가 필드 값을 찾습니다.
    pub fn field(&self, title: &str) -> Option<&str> {
        self.extra_fields
            .iter()
            .find(|f| f.title == title)
            .map(|f| f.value.as_str())
    }
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.source_name, self.title, self.message,
        )
    }
}
