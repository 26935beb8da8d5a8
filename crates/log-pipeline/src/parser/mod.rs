//! 필드 추출 모듈 -- 로그 형식별 파서
//!
//! 각 파서는 [`LogFormat`] trait을 구현하여 원격 명령 템플릿과
//! 라인 단위 필드 추출 규칙을 제공합니다. 수집/필터링/레코드 조립은
//! [`SourceAdapter`](crate::source::SourceAdapter)가 형식과 무관하게 공유합니다.
//!
//! # 지원 형식
//! - Apache2 combined access log ([`AccessLogParser`])
//! - nginx error log ([`ErrorLogParser`])
//!
//! # 사용 예시
//! ```ignore
//! use tailwatch_log_pipeline::parser::{AccessLogParser, LogFormat};
//!
//! let parser = AccessLogParser::new()?;
//! let fields = parser.extract(r#"10.0.0.1 - - [01/Jan/2024:12:00:00 +0000] "GET /x HTTP/1.1" 404 12 "-" "curl/8.0""#)?;
//! assert_eq!(fields.status_code(), Some(404));
//! ```

pub mod access_log;
pub mod error_log;

pub use access_log::AccessLogParser;
pub use error_log::ErrorLogParser;

use chrono::NaiveTime;

use crate::error::LogPipelineError;
use crate::severity::SeverityMarker;

/// 로그 형식 trait
///
/// 새로운 원격 로그 형식을 지원하려면 이 trait을 구현합니다.
pub trait LogFormat: Send + Sync {
    /// 형식 이름 (로그/메트릭 레이블로 사용)
    fn format_name(&self) -> &'static str;

    /// 원격에서 실행할 명령을 만듭니다.
    fn command(&self, log_path: &str, line_count: usize) -> String;

    /// 원시 라인 하나에서 필드를 추출합니다.
    ///
    /// 실패는 해당 라인만 제외시키며 배치 전체를 중단하지 않습니다.
    fn extract(&self, line: &str) -> Result<ExtractedFields, LogPipelineError>;
}

/// 라인 하나에서 추출한 필드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    /// 원본 타임스탬프 문자열
    pub timestamp: String,
    /// 타임스탬프의 시각 부분 (파싱 실패 시 None)
    pub time: Option<NaiveTime>,
    /// 심각도 마커
    pub marker: SeverityMarker,
    /// 주 메시지 (요청 라인 또는 에러 메시지)
    pub message: String,
    /// 클라이언트 주소
    pub client: Option<String>,
    /// Referer (access log 전용)
    pub referer: Option<String>,
    /// 응답 크기 (access log 전용)
    pub response_size: Option<u64>,
    /// User-Agent (access log 전용)
    pub user_agent: Option<String>,
}

impl ExtractedFields {
    /// HTTP 상태 코드 (access log인 경우)
    pub fn status_code(&self) -> Option<u16> {
        match self.marker {
            SeverityMarker::Status(code) => Some(code),
            _ => None,
        }
    }

    /// 시각을 `HH:MM:SS`로 포맷합니다. 시각이 없으면 빈 문자열입니다.
    pub fn time_display(&self) -> String {
        self.time
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_default()
    }
}
