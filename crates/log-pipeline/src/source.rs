//! 소스 어댑터 -- 원격 명령 발행부터 알림 레코드 목록까지의 한 사이클
//!
//! # 사이클
//! ```text
//! command() --exec--> stdout/stderr chunks --(stdout close)--> normalize()
//!                                                               |
//!   for each line: LineFilter -> LogFormat::extract -> RecordBuilder
//! ```
//!
//! stdout 청크는 바이트 그대로 누적했다가 채널이 닫힌 뒤 한 번에 디코딩합니다.
//! stderr 청크는 같은 `select!` 루프에서 경고로 기록될 뿐 누적을 멈추지 않습니다.

use std::sync::Arc;
use std::time::Instant;

use bytes::BytesMut;
use tracing::{debug, info, trace, warn};

use tailwatch_core::error::TailwatchError;
use tailwatch_core::metrics as m;
use tailwatch_core::pipeline::LogSource;
use tailwatch_core::types::AlertRecord;

use crate::config::{AdapterConfig, SourceKind};
use crate::error::LogPipelineError;
use crate::executor::{CommandExecutor, CommandStream};
use crate::filter::{LineFilter, VulnSignatures};
use crate::parser::{AccessLogParser, ErrorLogParser, LogFormat};
use crate::record::RecordBuilder;

/// 로그 형식 하나를 담당하는 소스 어댑터
///
/// `fetch`가 `&mut self`를 받으므로 어댑터당 동시에 하나의 사이클만 진행됩니다.
pub struct SourceAdapter<E: CommandExecutor> {
    config: AdapterConfig,
    format: Box<dyn LogFormat>,
    filter: LineFilter,
    builder: RecordBuilder,
    executor: E,
    buffer: BytesMut,
}

impl<E: CommandExecutor> SourceAdapter<E> {
    /// 설정의 소스 종류에 맞는 파서로 어댑터를 생성합니다.
    pub fn new(
        config: AdapterConfig,
        executor: E,
        signatures: Arc<VulnSignatures>,
    ) -> Result<Self, LogPipelineError> {
        let format: Box<dyn LogFormat> = match config.kind() {
            SourceKind::AccessLog => Box::new(AccessLogParser::new()?),
            SourceKind::ErrorLog => Box::new(ErrorLogParser::new()),
        };
        Ok(Self::with_format(config, format, executor, signatures))
    }

    /// 임의의 로그 형식으로 어댑터를 생성합니다.
    pub fn with_format(
        config: AdapterConfig,
        format: Box<dyn LogFormat>,
        executor: E,
        signatures: Arc<VulnSignatures>,
    ) -> Self {
        let filter = LineFilter::new(config.skip_policy().clone(), signatures);
        let builder = RecordBuilder::new(config.source_name(), config.source_icon());
        Self {
            config,
            format,
            filter,
            builder,
            executor,
            buffer: BytesMut::new(),
        }
    }

    /// 어댑터 설정
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// 이번 사이클에 발행할 명령
    pub fn command(&self) -> String {
        self.format
            .command(self.config.log_path(), self.config.line_count())
    }

    /// 명령을 실행하고 출력이 끝나면 라인 순서대로 정렬된 레코드를 반환합니다.
    ///
    /// 명령 발행이 실패하면 `LogPipelineError::Command`를 반환합니다.
    pub async fn fetch(&mut self) -> Result<Vec<AlertRecord>, LogPipelineError> {
        let started = Instant::now();
        let source = self.format.format_name();
        let command = self.command();
        self.buffer.clear();

        info!(source, command = command.as_str(), "fetching log lines");

        let stream = self.executor.exec(&command).await.inspect_err(|e| {
            warn!(source, error = %e, "failed to issue log command");
        })?;
        self.collect(stream).await;

        let response = String::from_utf8_lossy(&self.buffer);
        let records = self.normalize(&response);

        metrics::histogram!(m::FETCH_DURATION_SECONDS, m::LABEL_SOURCE => source)
            .record(started.elapsed().as_secs_f64());
        info!(
            source,
            bytes = self.buffer.len(),
            count = records.len(),
            "fetch complete"
        );

        Ok(records)
    }

    /// 콜백 형태의 `fetch`
    ///
    /// 출력이 끝난 뒤 `on_complete`를 정확히 한 번 호출합니다.
    /// 명령 발행이 실패하면 콜백은 호출되지 않고 에러가 반환됩니다.
    pub async fn get_last_messages<F>(&mut self, on_complete: F) -> Result<(), LogPipelineError>
    where
        F: FnOnce(Vec<AlertRecord>) + Send,
    {
        let records = self.fetch().await?;
        on_complete(records);
        Ok(())
    }

    /// 완성된 응답 버퍼를 레코드 목록으로 변환합니다.
    ///
    /// 부작용이 없으므로 같은 버퍼에 대해 항상 같은 결과를 냅니다.
    pub fn normalize(&self, response: &str) -> Vec<AlertRecord> {
        let source = self.format.format_name();
        let mut records = Vec::new();

        for line in response.lines() {
            metrics::counter!(m::LINES_RECEIVED_TOTAL, m::LABEL_SOURCE => source).increment(1);

            let extracted = self.format.extract(line);
            let status = extracted
                .as_ref()
                .ok()
                .and_then(|fields| fields.status_code());

            if let Some(reason) = self.filter.skip_reason(line, status) {
                debug!(source, reason = %reason, raw = line, "line skipped");
                metrics::counter!(
                    m::LINES_SKIPPED_TOTAL,
                    m::LABEL_SOURCE => source,
                    m::LABEL_REASON => reason.label()
                )
                .increment(1);
                continue;
            }

            match extracted {
                Ok(fields) => {
                    let record = self.builder.build(line, &fields);
                    metrics::counter!(
                        m::RECORDS_TOTAL,
                        m::LABEL_SOURCE => source,
                        m::LABEL_SEVERITY => record.severity.label()
                    )
                    .increment(1);
                    records.push(record);
                }
                Err(e) => {
                    warn!(source, error = %e, raw = line, "failed to extract fields");
                    metrics::counter!(m::EXTRACTION_ERRORS_TOTAL, m::LABEL_SOURCE => source)
                        .increment(1);
                }
            }
        }

        records
    }

    /// stdout 채널이 닫힐 때까지 청크를 누적합니다.
    async fn collect(&mut self, mut stream: CommandStream) {
        let source = self.format.format_name();
        let mut stderr_open = true;

        loop {
            tokio::select! {
                chunk = stream.stdout.recv() => match chunk {
                    Some(bytes) => {
                        trace!(source, len = bytes.len(), "stdout chunk");
                        self.buffer.extend_from_slice(&bytes);
                    }
                    None => break,
                },
                chunk = stream.stderr.recv(), if stderr_open => match chunk {
                    Some(bytes) => log_stderr(source, &bytes),
                    None => stderr_open = false,
                },
            }
        }

        // stdout 종료 시점에 이미 도착해 있던 stderr도 기록
        while let Ok(bytes) = stream.stderr.try_recv() {
            log_stderr(source, &bytes);
        }
    }
}

fn log_stderr(source: &'static str, bytes: &[u8]) {
    let text = String::from_utf8_lossy(bytes);
    warn!(source, stderr = text.trim_end(), "log command wrote to stderr");
    metrics::counter!(m::STDERR_CHUNKS_TOTAL, m::LABEL_SOURCE => source).increment(1);
}

impl<E: CommandExecutor> LogSource for SourceAdapter<E> {
    fn name(&self) -> &str {
        self.config.source_name()
    }

    async fn fetch(&mut self) -> Result<Vec<AlertRecord>, TailwatchError> {
        SourceAdapter::fetch(self).await.map_err(TailwatchError::from)
    }
}
