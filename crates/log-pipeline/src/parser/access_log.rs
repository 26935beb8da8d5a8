//! Apache2 combined access log 파서
//!
//! # 라인 형식
//! ```text
//! CLIENT IDENT AUTH [TIMESTAMP] "REQUEST" STATUS SIZE "REFERER" "USER-AGENT"
//! ```
//! IDENT, AUTH 필드는 `-` 또는 `""`만 허용합니다. 필드 배치가 조금이라도 다르면
//! (referer 누락 등) 라인 전체가 추출 실패로 처리됩니다.

use chrono::DateTime;
use regex::Regex;

use super::{ExtractedFields, LogFormat};
use crate::error::LogPipelineError;
use crate::severity::SeverityMarker;

/// 형식 이름
pub const FORMAT_NAME: &str = "apache2_access";

/// combined log 패턴
const COMBINED_LOG_PATTERN: &str = r#"(.+?)\s(-|"")\s(-|"")\s\[(.+?)\]\s"(.+?)"\s([0-9]{3})\s(\d+)\s"(.+?)"\s"(.+?)""#;

/// Apache 타임스탬프 형식 (예: `10/Oct/2023:13:55:36 +0200`)
const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Apache2 access log 파서
///
/// 원격 측에서 `grep`으로 4xx/5xx 응답만 남긴 뒤 가져옵니다.
pub struct AccessLogParser {
    pattern: Regex,
}

impl AccessLogParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            pattern: Regex::new(COMBINED_LOG_PATTERN)?,
        })
    }

    fn parse_error(reason: impl Into<String>) -> LogPipelineError {
        LogPipelineError::Parse {
            format: FORMAT_NAME.to_owned(),
            reason: reason.into(),
        }
    }
}

impl LogFormat for AccessLogParser {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn command(&self, log_path: &str, line_count: usize) -> String {
        format!("tail -n {line_count} {log_path} | grep '\" [4-5][0-9][0-9] '")
    }

    fn extract(&self, line: &str) -> Result<ExtractedFields, LogPipelineError> {
        let caps = self
            .pattern
            .captures(line)
            .ok_or_else(|| Self::parse_error("line does not match combined log format"))?;

        let status_str = &caps[6];
        let status: u16 = status_str
            .parse()
            .map_err(|_| Self::parse_error(format!("invalid status code '{status_str}'")))?;

        let size_str = &caps[7];
        let response_size: u64 = size_str
            .parse()
            .map_err(|_| Self::parse_error(format!("invalid response size '{size_str}'")))?;

        let timestamp = caps[4].to_owned();
        let time = DateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT)
            .ok()
            .map(|dt| dt.time());

        Ok(ExtractedFields {
            timestamp,
            time,
            marker: SeverityMarker::Status(status),
            message: caps[5].to_owned(),
            client: Some(caps[1].to_owned()),
            referer: Some(caps[8].to_owned()),
            response_size: Some(response_size),
            user_agent: Some(caps[9].to_owned()),
        })
    }
}
