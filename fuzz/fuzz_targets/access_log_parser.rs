#![no_main]

use libfuzzer_sys::fuzz_target;
use tailwatch_log_pipeline::parser::{AccessLogParser, LogFormat};

fuzz_target!(|data: &[u8]| {
    let Ok(parser) = AccessLogParser::new() else {
        return;
    };
    let line = String::from_utf8_lossy(data);

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(fields) = parser.extract(&line) {
        // 추출에 성공하면 상태 코드는 항상 세 자리 숫자
        let code = fields.status_code().expect("access log always carries a status");
        assert!(code <= 999);
    }
});
