#![no_main]

use libfuzzer_sys::fuzz_target;
use tailwatch_log_pipeline::parser::{ErrorLogParser, LogFormat};

fuzz_target!(|data: &[u8]| {
    let parser = ErrorLogParser::new();
    let line = String::from_utf8_lossy(data);

    // error log 추출은 실패하지 않는다
    let fields = parser.extract(&line).expect("error log extraction is total");
    assert!(fields.status_code().is_none());
});
