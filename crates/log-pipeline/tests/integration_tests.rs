//! 통합 테스트 -- 명령 발행부터 알림 레코드 목록까지 전체 사이클 검증

mod common;

use std::time::Duration;

use bytes::Bytes;
use proptest::prelude::*;

use common::*;
use tailwatch_core::config::TailwatchConfig;
use tailwatch_core::pipeline::LogSource;
use tailwatch_core::types::Severity;
use tailwatch_core::TailwatchError;
use tailwatch_log_pipeline::{
    AdapterConfig, AdapterConfigBuilder, SourceAdapter, SourceKind, VulnSignatures,
};

fn access_adapter<E: tailwatch_log_pipeline::CommandExecutor>(
    builder: AdapterConfigBuilder,
    executor: E,
) -> SourceAdapter<E> {
    SourceAdapter::new(
        builder.build().expect("valid config"),
        executor,
        VulnSignatures::builtin().into_shared(),
    )
    .expect("adapter should build")
}

#[tokio::test]
async fn empty_skip_string_and_404_yield_one_notice() {
    let lines = [
        String::new(),
        access_line("10.0.0.9", "GET /status/monitor HTTP/1.1", 404, "-"),
        access_line("10.0.0.1", "GET /missing.png HTTP/1.1", 404, "-"),
    ];
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut adapter = access_adapter(
        AdapterConfigBuilder::new(SourceKind::AccessLog).skip_strings(vec!["MONITOR".to_owned()]),
        ScriptedRemote::with_lines(&refs),
    );

    let records = adapter.fetch().await.expect("fetch should succeed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].severity, Severity::Notice);
    assert_eq!(records[0].title, "404");
    assert_eq!(records[0].message, "GET /missing.png HTTP/1.1");
    assert_eq!(records[0].field("Time"), Some("13:55:36"));
    assert_eq!(records[0].field("IP"), Some("10.0.0.1"));
    assert!(records[0].field("Referer").is_none());
}

#[tokio::test]
async fn adapter_from_core_config_uses_configured_path_and_count() {
    let mut core = TailwatchConfig::default();
    core.access_log.log_path = "/srv/logs/access.log".to_owned();
    core.access_log.line_count = 200;

    let remote = ScriptedRemote::with_lines(&[]);
    let config = AdapterConfig::from_core(&core, SourceKind::AccessLog).expect("valid");
    let mut adapter =
        SourceAdapter::new(config, remote, VulnSignatures::builtin().into_shared()).unwrap();

    let records = adapter.fetch().await.unwrap();
    assert!(records.is_empty());
    assert_eq!(
        adapter.command(),
        "tail -n 200 /srv/logs/access.log | grep '\" [4-5][0-9][0-9] '"
    );
}

#[tokio::test]
async fn stderr_interleaved_with_chunked_stdout() {
    let body = format!(
        "{}\n{}\n",
        access_line("10.0.0.1", "GET /a HTTP/1.1", 500, "-"),
        access_line("10.0.0.2", "GET /b HTTP/1.1", 503, "https://example.com/"),
    );
    let bytes = Bytes::from(body);
    let chunks = vec![bytes.slice(..7), bytes.slice(7..130), bytes.slice(130..)];
    let remote = ScriptedRemote::with_chunks(chunks)
        .stderr("Warning: Permanently added 'web-01' to known hosts.\n")
        .stderr("grep: (standard input): binary file matches\n");

    let mut adapter = access_adapter(AdapterConfigBuilder::new(SourceKind::AccessLog), remote);
    let records = adapter.fetch().await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.severity == Severity::Critical));
    assert_eq!(records[1].field("Referer"), Some("https://example.com/"));
}

#[tokio::test]
async fn fetch_completes_only_after_stdout_closes() {
    let (writer, remote) = fake_remote();
    let mut adapter = access_adapter(AdapterConfigBuilder::new(SourceKind::AccessLog), remote);

    let handle = tokio::spawn(async move {
        let records = adapter.fetch().await;
        (adapter, records)
    });

    writer.send_stdout(format!(
        "{}\n",
        access_line("10.0.0.1", "GET /x HTTP/1.1", 414, "-")
    ));
    writer.send_stderr("tail: inotify cannot be used\n");
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!handle.is_finished(), "fetch must wait for stdout close");

    writer.send_stdout(access_line("10.0.0.2", "GET /y HTTP/1.1", 404, "-"));
    writer.close();

    let (_adapter, records) = handle.await.expect("task should not panic");
    let records = records.expect("fetch should succeed");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].severity, Severity::Warning);
    assert_eq!(records[1].severity, Severity::Notice);
}

#[tokio::test]
async fn command_failure_is_reported_and_callback_skipped() {
    let mut adapter = access_adapter(
        AdapterConfigBuilder::new(SourceKind::AccessLog),
        ScriptedRemote::failing(),
    );

    let mut invoked = 0;
    let result = adapter.get_last_messages(|_| invoked += 1).await;
    assert!(result.is_err());
    assert_eq!(invoked, 0);

    let err: TailwatchError = LogSource::fetch(&mut adapter).await.unwrap_err();
    assert!(err.to_string().contains("Connection refused"));
}

#[tokio::test]
async fn error_log_mixed_levels() {
    let lines = [
        error_line("notice", "signal process started", None),
        error_line("error", "open() \"/srv/x\" failed (2: No such file or directory)", Some("203.0.113.5")),
        error_line("emerg", "bind() to 0.0.0.0:80 failed", None),
        "   ".to_owned(),
        error_line("error", "access forbidden by rule, request: \"GET /.env\"", Some("198.51.100.1")),
    ];
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let config = AdapterConfigBuilder::new(SourceKind::ErrorLog).build().unwrap();
    let mut adapter = SourceAdapter::new(
        config,
        ScriptedRemote::with_lines(&refs),
        VulnSignatures::builtin().into_shared(),
    )
    .unwrap();

    let records = adapter.fetch().await.unwrap();
    let summary: Vec<(&str, Severity)> = records
        .iter()
        .map(|r| (r.title.as_str(), r.severity))
        .collect();
    assert_eq!(
        summary,
        [
            ("notice", Severity::Notice),
            ("warning", Severity::Warning),
            ("danger", Severity::Critical),
        ]
    );
    assert_eq!(records[1].field("IP"), Some("203.0.113.5"));
    assert_eq!(records[2].message, "bind() to 0.0.0.0:80 failed");
}

#[tokio::test]
async fn vuln_list_from_file_replaces_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signatures.txt");
    std::fs::write(&path, "# custom\n/internal-probe\n").unwrap();
    let signatures = VulnSignatures::load(&path).await.unwrap().into_shared();

    let lines = [
        access_line("10.0.0.1", "GET /internal-probe HTTP/1.1", 404, "-"),
        access_line("10.0.0.2", "GET /wp-login.php HTTP/1.1", 404, "-"),
    ];
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let config = AdapterConfigBuilder::new(SourceKind::AccessLog).build().unwrap();
    let mut adapter =
        SourceAdapter::new(config, ScriptedRemote::with_lines(&refs), signatures).unwrap();

    let records = adapter.fetch().await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].message.contains("wp-login.php"));
}

// =============================================================================
// 속성 테스트
// =============================================================================

fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_owned()),
        "[a-z ]{1,30}",
        (any::<u8>(), prop::sample::select(vec![404u16, 414, 500, 503, 403]))
            .prop_map(|(n, status)| access_line(
                &format!("10.0.0.{n}"),
                &format!("GET /page{n} HTTP/1.1"),
                status,
                "-"
            )),
        (any::<u8>(), prop::sample::select(vec!["Needle", "NEEDLE", "needle"]))
            .prop_map(|(n, word)| access_line(
                &format!("10.1.0.{n}"),
                &format!("GET /{word}/{n} HTTP/1.1"),
                500,
                "-"
            )),
    ]
}

proptest! {
    #[test]
    fn records_never_exceed_nonempty_lines_and_keep_order(lines in prop::collection::vec(arb_line(), 0..40)) {
        let adapter = access_adapter(
            AdapterConfigBuilder::new(SourceKind::AccessLog)
                .skip_strings(vec!["needle".to_owned()]),
            ScriptedRemote::default(),
        );
        let response = lines.join("\n");
        let records = adapter.normalize(&response);

        let nonempty = lines.iter().filter(|l| !l.trim().is_empty()).count();
        prop_assert!(records.len() <= nonempty);

        // 레코드의 원본 라인은 입력 순서의 부분 수열
        let mut cursor = lines.iter();
        for record in &records {
            prop_assert!(cursor.any(|l| *l == record.raw));
        }

        for record in &records {
            prop_assert!(!record.raw.to_lowercase().contains("needle"));
        }

        prop_assert_eq!(adapter.normalize(&response), records);
    }
}
