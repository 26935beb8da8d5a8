//! nginx error log 파서
//!
//! # 라인 형식
//! ```text
//! YYYY/MM/DD HH:MM:SS [level] PID#TID: *CID message, client: ADDR, server: NAME, ...
//! ```
//!
//! 추출 규칙:
//! 1. 레벨 토큰은 심각도 높은 순서로 검사하며 처음 발견된 토큰이 레벨이 됩니다.
//! 2. 메시지는 레벨 토큰 이후 첫 `:` 다음부터 시작합니다.
//!    토큰이 없으면 라인의 첫 `:` 다음부터, `:`도 없으면 라인 전체입니다.
//! 3. 메시지 앞의 연결 번호(`*123 `)는 제거합니다.
//! 4. `, client:` 마커가 있으면 그 뒤 첫 `,`까지가 클라이언트 주소이고,
//!    메시지는 마커 앞에서 잘립니다.

use chrono::NaiveDateTime;

use super::{ExtractedFields, LogFormat};
use crate::error::LogPipelineError;
use crate::severity::{LogLevel, SeverityMarker};

/// 형식 이름
pub const FORMAT_NAME: &str = "nginx_error";

/// 클라이언트 주소 마커
const CLIENT_MARKER: &str = ", client:";

/// nginx 타임스탬프 형식 (예: `2024/01/01 00:00:00`)
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// nginx error log 파서
///
/// 모든 라인은 추출에 성공합니다. 인식할 수 없는 라인은 심각도 0으로 남습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorLogParser;

impl ErrorLogParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

/// 레벨 토큰과 그 위치를 찾습니다.
fn find_level(line: &str) -> Option<(LogLevel, usize)> {
    LogLevel::SCAN_ORDER
        .iter()
        .find_map(|level| line.find(level.token()).map(|pos| (*level, pos)))
}

/// 메시지 앞의 nginx 연결 번호(`*<digits> `)를 제거합니다.
fn strip_connection_serial(body: &str) -> &str {
    if let Some(rest) = body.strip_prefix('*') {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && rest[digits..].starts_with(' ') {
            return rest[digits..].trim_start();
        }
    }
    body
}

/// 메시지에서 클라이언트 주소를 분리합니다.
fn split_client(body: &str) -> (&str, Option<String>) {
    let Some(pos) = body.find(CLIENT_MARKER) else {
        return (body, None);
    };

    let after = &body[pos + CLIENT_MARKER.len()..];
    let addr = after.split(',').next().unwrap_or_default().trim();
    let client = (!addr.is_empty()).then(|| addr.to_owned());

    (body[..pos].trim_end(), client)
}

impl LogFormat for ErrorLogParser {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn command(&self, log_path: &str, line_count: usize) -> String {
        format!("tail {log_path} -n {line_count}")
    }

    fn extract(&self, line: &str) -> Result<ExtractedFields, LogPipelineError> {
        let (marker, search_from) = match find_level(line) {
            Some((level, pos)) => (SeverityMarker::Level(level), pos),
            None => (SeverityMarker::Unrecognized, 0),
        };

        let body = match line[search_from..].find(':') {
            Some(offset) => &line[search_from + offset + 1..],
            None => line,
        };
        let body = strip_connection_serial(body.trim());
        let (message, client) = split_client(body);

        let timestamp = line
            .split('[')
            .next()
            .unwrap_or_default()
            .trim()
            .to_owned();
        let time = NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT)
            .ok()
            .map(|dt| dt.time());

        Ok(ExtractedFields {
            timestamp,
            time,
            marker,
            message: message.to_owned(),
            client,
            referer: None,
            response_size: None,
            user_agent: None,
        })
    }
}
