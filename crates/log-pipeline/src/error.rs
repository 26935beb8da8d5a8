//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 로그 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for TailwatchError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use tailwatch_core::error::{ConfigError, ParseError, PipelineError, TailwatchError};

/// 로그 파이프라인 도메인 에러
///
/// 필드 추출, 원격 명령 실행, 설정, 시그니처 목록 로딩 등 파이프라인 내부의
/// 에러 상황을 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 라인 필드 추출 실패 (패턴 불일치, 숫자 필드 오류)
    #[error("parse error: {format}: {reason}")]
    Parse {
        /// 로그 형식 (apache2_access, nginx_error)
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// 원격 명령 실행 실패 (스트림 시작 전)
    #[error("command error: {command}: {reason}")]
    Command {
        /// 실행하려던 명령
        command: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 스캐너 시그니처 목록 로딩 실패
    #[error("vuln list error: {path}: {reason}")]
    VulnList {
        /// 목록 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogPipelineError> for TailwatchError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Parse { format, reason } => {
                TailwatchError::Parse(ParseError::PatternMismatch { format, reason })
            }
            LogPipelineError::Config { field, reason } => {
                TailwatchError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::Command { command, reason } => TailwatchError::Pipeline(
                PipelineError::CommandFailed(format!("{command}: {reason}")),
            ),
            LogPipelineError::Channel(reason) => {
                TailwatchError::Pipeline(PipelineError::ChannelRecv(reason))
            }
            LogPipelineError::Io(e) => TailwatchError::Io(e),
            other => TailwatchError::Pipeline(PipelineError::InitFailed(other.to_string())),
        }
    }
}
