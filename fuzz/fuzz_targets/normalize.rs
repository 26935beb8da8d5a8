#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tailwatch_log_pipeline::{
    AdapterConfigBuilder, ProcessExecutor, SourceAdapter, SourceKind, VulnSignatures,
};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    error_log: bool,
    /// 제외 문자열 (최대 4개 사용)
    skip_strings: Vec<String>,
    use_vuln_list: bool,
    response: String,
}

fuzz_target!(|input: FuzzInput| {
    let kind = if input.error_log {
        SourceKind::ErrorLog
    } else {
        SourceKind::AccessLog
    };
    let skip_strings: Vec<String> = input.skip_strings.into_iter().take(4).collect();
    let Ok(config) = AdapterConfigBuilder::new(kind)
        .skip_strings(skip_strings)
        .use_vuln_list(input.use_vuln_list)
        .build()
    else {
        return;
    };
    let Ok(adapter) = SourceAdapter::new(
        config,
        ProcessExecutor::local(),
        VulnSignatures::builtin().into_shared(),
    ) else {
        return;
    };

    let records = adapter.normalize(&input.response);

    let nonempty = input
        .response
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count();
    assert!(records.len() <= nonempty);
    assert_eq!(adapter.normalize(&input.response), records);
});
