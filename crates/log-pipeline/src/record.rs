//! 알림 레코드 조립
//!
//! 추출된 필드와 소스 정보로 [`AlertRecord`]를 만듭니다.
//!
//! # 필드 순서
//! 1. `Time` (short, `HH:MM:SS`, 파싱 실패 시 빈 값)
//! 2. `IP` (short, 클라이언트 주소가 있는 경우)
//! 3. `Referer` (long, 두 글자 이상인 경우)

use tailwatch_core::types::{AlertRecord, ExtraField};

use crate::parser::ExtractedFields;
use crate::severity::{SeverityMarker, classify};

/// 소스 정보를 담고 라인별 레코드를 만드는 빌더
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    source_name: String,
    source_icon: String,
}

impl RecordBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new(source_name: impl Into<String>, source_icon: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            source_icon: source_icon.into(),
        }
    }

    /// 소스 이름
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// 라인 하나의 레코드를 만듭니다.
    pub fn build(&self, raw: &str, fields: &ExtractedFields) -> AlertRecord {
        let severity = classify(fields.marker);
        let title = match fields.marker {
            SeverityMarker::Status(code) => code.to_string(),
            _ => severity.label().to_owned(),
        };

        let mut extra_fields = vec![ExtraField::short("Time", fields.time_display())];
        if let Some(client) = &fields.client {
            extra_fields.push(ExtraField::short("IP", client.as_str()));
        }
        if let Some(referer) = fields.referer.as_ref().filter(|r| r.chars().count() > 1) {
            extra_fields.push(ExtraField::long("Referer", referer.as_str()));
        }

        AlertRecord {
            raw: raw.to_owned(),
            source_name: self.source_name.clone(),
            source_icon: self.source_icon.clone(),
            title,
            message: fields.message.clone(),
            severity,
            extra_fields,
        }
    }
}
