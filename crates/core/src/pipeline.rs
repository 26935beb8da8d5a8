//! 파이프라인 trait -- 로그 소스 확장 포인트 정의

use std::future::Future;

use crate::error::TailwatchError;
use crate::types::AlertRecord;

/// 알림 레코드를 만들어내는 로그 소스
///
/// 새로운 원격 로그 소스를 지원하려면 이 trait을 구현합니다.
/// 한 번의 `fetch` 호출은 한 번의 수집-파싱-정규화 사이클입니다.
pub trait LogSource: Send {
    /// 소스 표시 이름
    fn name(&self) -> &str;

    /// 최근 로그를 가져와 라인 순서대로 정렬된 알림 레코드를 반환합니다.
    ///
    /// 명령 실행 자체가 실패하면 에러를 반환하며, 개별 라인의 파싱 실패는
    /// 에러가 아니라 해당 라인의 제외로 처리됩니다.
    fn fetch(&mut self) -> impl Future<Output = Result<Vec<AlertRecord>, TailwatchError>> + Send;
}
