//! 라인 필터 -- 알림으로 만들 가치가 없는 라인을 제외합니다.
//!
//! # 검사 순서
//! 1. 빈 라인 / 공백만 있는 라인
//! 2. 제외 HTTP 상태 코드 (access log 전용)
//! 3. 제외 부분 문자열
//! 4. 스캐너 시그니처 목록 (`use_vuln_list`가 켜진 경우)
//!
//! 먼저 걸린 규칙에서 검사가 끝납니다. 문자열 비교는 모두 대소문자를 무시하며
//! 라인은 한 번만 소문자로 변환됩니다.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::LogPipelineError;

/// 내장 스캐너 시그니처 목록
const BUILTIN_VULN_LIST: &str = include_str!("../data/web-vuln-scan-list.txt");

/// 취약점 스캐너 요청에 자주 나타나는 부분 문자열 목록
///
/// 생성 시 한 번 소문자로 정규화되고 이후 변경되지 않습니다.
/// 여러 어댑터가 `Arc`로 공유합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VulnSignatures {
    entries: Vec<String>,
}

impl VulnSignatures {
    /// 항목 목록에서 생성합니다. 빈 항목은 버립니다.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { entries }
    }

    /// 줄 단위 텍스트 목록을 파싱합니다. `#`으로 시작하는 줄은 주석입니다.
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        )
    }

    /// 크레이트에 내장된 목록을 사용합니다.
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_VULN_LIST)
    }

    /// 파일에서 목록을 로드합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogPipelineError> {
        let path = path.as_ref();
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| LogPipelineError::VulnList {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

        let signatures = Self::parse(&content);
        debug!(
            path = %path.display(),
            count = signatures.len(),
            "loaded vuln signature list"
        );
        Ok(signatures)
    }

    /// 공유용 `Arc`로 감쌉니다.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 소문자 라인에 포함된 첫 시그니처를 찾습니다.
    pub fn find_in(&self, lowered_line: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|sig| lowered_line.contains(sig.as_str()))
            .map(String::as_str)
    }

    /// 시그니처 개수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 목록이 비었는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 어댑터별 제외 정책
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPolicy {
    skip_codes: Vec<u16>,
    skip_strings: Vec<String>,
    use_vuln_list: bool,
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self {
            skip_codes: Vec::new(),
            skip_strings: Vec::new(),
            use_vuln_list: true,
        }
    }
}

impl SkipPolicy {
    /// 새 정책을 생성합니다. 제외 문자열은 소문자로 정규화되고 빈 문자열은 버립니다.
    pub fn new(skip_codes: Vec<u16>, skip_strings: Vec<String>, use_vuln_list: bool) -> Self {
        let skip_strings = skip_strings
            .into_iter()
            .map(|s| s.to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            skip_codes,
            skip_strings,
            use_vuln_list,
        }
    }

    /// 제외 HTTP 상태 코드
    pub fn skip_codes(&self) -> &[u16] {
        &self.skip_codes
    }

    /// 제외 부분 문자열 (소문자)
    pub fn skip_strings(&self) -> &[String] {
        &self.skip_strings
    }

    /// 스캐너 시그니처 목록 사용 여부
    pub fn use_vuln_list(&self) -> bool {
        self.use_vuln_list
    }
}

/// 라인이 제외된 사유
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 빈 라인 또는 공백만 있는 라인
    Empty,
    /// 제외 상태 코드
    StatusCode(u16),
    /// 제외 부분 문자열
    SkipString(String),
    /// 스캐너 시그니처
    VulnSignature(String),
}

impl SkipReason {
    /// 메트릭 레이블 값
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::StatusCode(_) => "status_code",
            Self::SkipString(_) => "skip_string",
            Self::VulnSignature(_) => "vuln_signature",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::StatusCode(code) => write!(f, "status code {code}"),
            Self::SkipString(s) => write!(f, "skip string '{s}'"),
            Self::VulnSignature(s) => write!(f, "vuln signature '{s}'"),
        }
    }
}

/// 라인이 제외되는 사유를 반환합니다. 제외 대상이 아니면 `None`입니다.
///
/// `status_code`는 access log 라인에서 추출된 상태 코드입니다.
pub fn skip_reason(
    line: &str,
    status_code: Option<u16>,
    policy: &SkipPolicy,
    signatures: &VulnSignatures,
) -> Option<SkipReason> {
    if line.trim().is_empty() {
        return Some(SkipReason::Empty);
    }

    if let Some(code) = status_code.filter(|code| policy.skip_codes.contains(code)) {
        return Some(SkipReason::StatusCode(code));
    }

    let lowered = line.to_lowercase();

    if let Some(hit) = policy
        .skip_strings
        .iter()
        .find(|s| lowered.contains(s.as_str()))
    {
        return Some(SkipReason::SkipString(hit.clone()));
    }

    if !policy.use_vuln_list {
        return None;
    }

    signatures
        .find_in(&lowered)
        .map(|sig| SkipReason::VulnSignature(sig.to_owned()))
}

/// 라인을 제외해야 하는지 판단합니다.
pub fn should_skip(
    line: &str,
    status_code: Option<u16>,
    policy: &SkipPolicy,
    signatures: &VulnSignatures,
) -> bool {
    skip_reason(line, status_code, policy, signatures).is_some()
}

/// 정책과 시그니처 목록을 묶은 필터
#[derive(Debug, Clone)]
pub struct LineFilter {
    policy: SkipPolicy,
    signatures: Arc<VulnSignatures>,
}

impl LineFilter {
    /// 새 필터를 생성합니다.
    pub fn new(policy: SkipPolicy, signatures: Arc<VulnSignatures>) -> Self {
        Self { policy, signatures }
    }

    /// 라인이 제외되는 사유
    pub fn skip_reason(&self, line: &str, status_code: Option<u16>) -> Option<SkipReason> {
        skip_reason(line, status_code, &self.policy, &self.signatures)
    }

    /// 라인을 제외해야 하는지 여부
    pub fn should_skip(&self, line: &str, status_code: Option<u16>) -> bool {
        self.skip_reason(line, status_code).is_some()
    }

    /// 정책
    pub fn policy(&self) -> &SkipPolicy {
        &self.policy
    }
}
