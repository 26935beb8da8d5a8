//! tailwatch 공통 크레이트
//!
//! 원격 웹 서버 로그에서 알림 레코드를 만드는 모든 크레이트가 공유하는
//! 도메인 타입, 에러, 설정, 메트릭 이름을 정의합니다.
//!
//! # 모듈 구성
//!
//! - [`types`]: [`AlertRecord`], [`ExtraField`], [`Severity`]
//! - [`error`]: 최상위 에러 [`TailwatchError`]와 도메인별 에러
//! - [`config`]: `tailwatch.toml` 파싱과 환경변수 오버라이드
//! - [`pipeline`]: 로그 소스 확장 포인트 trait
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, ParseError, PipelineError, TailwatchError};

// 설정
pub use config::TailwatchConfig;

// 파이프라인 trait
pub use pipeline::LogSource;

// 도메인 타입
pub use types::{AlertRecord, ExtraField, Severity};
