//! 통합 테스트 공용 유틸리티
//!
//! 각 테스트 파일 상단에서 `mod common;`으로 가져옵니다.

pub mod fake_remote;
pub mod fixtures;

pub use fake_remote::*;
pub use fixtures::*;
