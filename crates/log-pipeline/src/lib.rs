//! tailwatch 로그 파이프라인
//!
//! 원격 웹 서버 로그의 최근 라인을 명령 채널로 가져와 잡음을 걸러내고,
//! 형식별로 필드를 추출해 심각도를 매긴 뒤 [`AlertRecord`](tailwatch_core::AlertRecord)
//! 목록으로 정규화합니다.
//!
//! # 모듈 구성
//!
//! - [`source`]: 한 사이클을 오케스트레이션하는 소스 어댑터 ([`LogSource`](tailwatch_core::LogSource) 구현)
//! - [`executor`]: 명령 실행 추상화와 `tokio::process` 기반 구현
//! - [`filter`]: 빈 라인 / 제외 코드 / 제외 문자열 / 스캐너 시그니처 필터
//! - [`parser`]: Apache2 access log, nginx error log 필드 추출
//! - [`severity`]: 형식별 마커를 심각도로 변환
//! - [`record`]: 알림 레코드 조립
//! - [`config`]: 어댑터 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! CommandExecutor -> byte chunks -> SourceAdapter::normalize
//!                                        |
//!          LineFilter -> LogFormat::extract -> classify -> RecordBuilder
//!                                                             |
//!                                                    Vec<AlertRecord>
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod parser;
pub mod record;
pub mod severity;
pub mod source;

// --- 주요 타입 re-export ---

// 소스 어댑터
pub use source::SourceAdapter;

// 설정
pub use config::{AdapterConfig, AdapterConfigBuilder, SourceKind};

// 에러
pub use error::LogPipelineError;

// 명령 실행
pub use executor::{CommandExecutor, CommandStream, ProcessExecutor};

// 필터
pub use filter::{LineFilter, SkipPolicy, SkipReason, VulnSignatures, should_skip, skip_reason};

// 파서
pub use parser::{AccessLogParser, ErrorLogParser, ExtractedFields, LogFormat};

// 심각도
pub use severity::{LogLevel, SeverityMarker, severity_to_text};

// 레코드
pub use record::RecordBuilder;
