//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 경우 모든 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `tailwatch_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(tailwatch_core::metrics::LINES_RECEIVED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 소스 레이블 키 (apache2_access, nginx_error)
pub const LABEL_SOURCE: &str = "source";

/// 스킵 사유 레이블 키 (empty, status_code, skip_string, vuln_signature)
pub const LABEL_REASON: &str = "reason";

/// 심각도 레이블 키 (unknown, notice, warning, danger)
pub const LABEL_SEVERITY: &str = "severity";

// ─── 파이프라인 메트릭 ──────────────────────────────────────────────

/// 원격 명령 출력에서 받은 라인 수 (counter)
pub const LINES_RECEIVED_TOTAL: &str = "tailwatch_lines_received_total";

/// 필터에 의해 제외된 라인 수 (counter, label: reason)
pub const LINES_SKIPPED_TOTAL: &str = "tailwatch_lines_skipped_total";

/// 필드 추출 실패 수 (counter)
pub const EXTRACTION_ERRORS_TOTAL: &str = "tailwatch_extraction_errors_total";

/// 생성된 알림 레코드 수 (counter, label: source, severity)
pub const RECORDS_TOTAL: &str = "tailwatch_records_total";

/// stderr 채널로 받은 청크 수 (counter)
pub const STDERR_CHUNKS_TOTAL: &str = "tailwatch_stderr_chunks_total";

/// 수집 사이클 소요 시간 (histogram, 초)
pub const FETCH_DURATION_SECONDS: &str = "tailwatch_fetch_duration_seconds";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        LINES_RECEIVED_TOTAL,
        "Total lines received from remote log commands"
    );
    describe_counter!(
        LINES_SKIPPED_TOTAL,
        "Lines dropped by the skip policy, by reason"
    );
    describe_counter!(
        EXTRACTION_ERRORS_TOTAL,
        "Lines dropped because field extraction failed"
    );
    describe_counter!(RECORDS_TOTAL, "Alert records produced");
    describe_counter!(
        STDERR_CHUNKS_TOTAL,
        "Chunks received on the remote command's error stream"
    );
    describe_histogram!(
        FETCH_DURATION_SECONDS,
        "Duration of one fetch-parse-normalize cycle"
    );
}
