//! 명령 실행기 -- 원격 로그 명령을 실행하고 출력을 청크 스트림으로 전달합니다.
//!
//! [`CommandExecutor`] trait으로 실행 방식을 추상화하여 운영 환경에서는
//! [`ProcessExecutor`]를, 테스트에서는 `MockExecutor`를 사용합니다.
//!
//! # 스트림 계약
//! - stdout/stderr 청크는 각각 별도 채널로 도착합니다.
//! - stdout 채널이 닫히면 명령 출력이 끝난 것입니다.
//! - 종료 코드는 검사하지 않습니다.
//!
//! ```text
//!  SourceAdapter --exec(cmd)--> CommandExecutor
//!        ^                          |
//!        |   stdout: Receiver<Bytes>|
//!        +---stderr: Receiver<Bytes>+
//! ```

use std::future::Future;
use std::process::Stdio;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use tailwatch_core::config::RemoteConfig;

use crate::error::LogPipelineError;

/// 출력 채널 버퍼 크기 (청크 단위)
const CHANNEL_CAPACITY: usize = 64;

/// 한 번에 읽는 최대 바이트 수
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// 실행 중인 명령의 출력 스트림
#[derive(Debug)]
pub struct CommandStream {
    /// 표준 출력 청크. 채널이 닫히면 출력 종료입니다.
    pub stdout: mpsc::Receiver<Bytes>,
    /// 표준 에러 청크
    pub stderr: mpsc::Receiver<Bytes>,
}

/// 명령 실행 추상화
///
/// 명령 발행 자체가 실패하면 `LogPipelineError::Command`를 반환합니다.
/// 발행 이후의 실패는 stderr 청크로만 드러납니다.
pub trait CommandExecutor: Send + Sync + 'static {
    /// 명령을 실행하고 출력 스트림을 반환합니다.
    fn exec(
        &self,
        command: &str,
    ) -> impl Future<Output = Result<CommandStream, LogPipelineError>> + Send;
}

/// 실행 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecTarget {
    /// 로컬 `sh -c`
    Local,
    /// `ssh`를 통한 원격 실행
    Ssh {
        host: String,
        port: u16,
        user: Option<String>,
        identity_file: Option<String>,
    },
}

/// `tokio::process` 기반 실행기
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    target: ExecTarget,
}

impl ProcessExecutor {
    /// 로컬 셸에서 실행하는 실행기를 생성합니다.
    pub fn local() -> Self {
        Self {
            target: ExecTarget::Local,
        }
    }

    /// ssh로 원격 실행하는 실행기를 생성합니다.
    pub fn ssh(host: impl Into<String>, port: u16) -> Self {
        Self {
            target: ExecTarget::Ssh {
                host: host.into(),
                port,
                user: None,
                identity_file: None,
            },
        }
    }

    /// core의 `RemoteConfig`에서 실행기를 생성합니다.
    pub fn from_remote(remote: &RemoteConfig) -> Result<Self, LogPipelineError> {
        match remote.mode.as_str() {
            "local" => Ok(Self::local()),
            "ssh" => {
                if remote.host.trim().is_empty() {
                    return Err(LogPipelineError::Config {
                        field: "remote.host".to_owned(),
                        reason: "host must not be empty in ssh mode".to_owned(),
                    });
                }
                let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_owned());
                Ok(Self {
                    target: ExecTarget::Ssh {
                        host: remote.host.clone(),
                        port: remote.port,
                        user: non_empty(&remote.user),
                        identity_file: non_empty(&remote.identity_file),
                    },
                })
            }
            other => Err(LogPipelineError::Config {
                field: "remote.mode".to_owned(),
                reason: format!("unsupported mode '{other}'"),
            }),
        }
    }

    /// 실행 위치
    pub fn target(&self) -> &ExecTarget {
        &self.target
    }

    /// 실행할 프로그램과 인자를 만듭니다.
    pub fn program_args(&self, command: &str) -> (&'static str, Vec<String>) {
        match &self.target {
            ExecTarget::Local => ("sh", vec!["-c".to_owned(), command.to_owned()]),
            ExecTarget::Ssh {
                host,
                port,
                user,
                identity_file,
            } => {
                let mut args = vec![
                    "-o".to_owned(),
                    "BatchMode=yes".to_owned(),
                    "-p".to_owned(),
                    port.to_string(),
                ];
                if let Some(identity) = identity_file {
                    args.push("-i".to_owned());
                    args.push(identity.clone());
                }
                let destination = match user {
                    Some(user) => format!("{user}@{host}"),
                    None => host.clone(),
                };
                args.push(destination);
                args.push("--".to_owned());
                args.push(command.to_owned());
                ("ssh", args)
            }
        }
    }
}

impl CommandExecutor for ProcessExecutor {
    async fn exec(&self, command: &str) -> Result<CommandStream, LogPipelineError> {
        let command_error = |reason: String| LogPipelineError::Command {
            command: command.to_owned(),
            reason,
        };

        let (program, args) = self.program_args(command);
        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_error(format!("failed to spawn {program}: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| command_error("stdout not captured".to_owned()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| command_error("stderr not captured".to_owned()))?;

        let (stdout_tx, stdout_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (stderr_tx, stderr_rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(forward_output(stdout, stdout_tx));
        tokio::spawn(forward_output(stderr, stderr_tx));

        // 종료 상태는 참고용 로그로만 남김
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(%status, "log command exited"),
                Err(e) => debug!(error = %e, "failed to wait for log command"),
            }
        });

        debug!(program, "log command started");

        Ok(CommandStream {
            stdout: stdout_rx,
            stderr: stderr_rx,
        })
    }
}

/// 리더에서 읽은 청크를 채널로 전달합니다. EOF 또는 수신자 해제 시 종료합니다.
async fn forward_output<R>(mut reader: R, tx: mpsc::Sender<Bytes>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(READ_CHUNK_SIZE);
    loop {
        buf.reserve(READ_CHUNK_SIZE);
        match reader.read_buf(&mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(buf.split().freeze()).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to read log command output");
                break;
            }
        }
    }
}

/// 테스트용 Mock 실행기
///
/// 미리 정한 청크를 순서대로 채널에 넣고 닫습니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockExecutor {
    /// stdout으로 보낼 청크
    pub stdout_chunks: Vec<Bytes>,
    /// stderr로 보낼 청크
    pub stderr_chunks: Vec<Bytes>,
    /// 명령 발행을 실패시킬지 여부
    pub fail_exec: bool,
    /// 받은 명령 기록
    pub commands: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockExecutor {
    /// 빈 출력으로 mock 실행기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// stdout 청크를 설정합니다.
    pub fn with_stdout<I, B>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.stdout_chunks = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// stderr 청크를 설정합니다.
    pub fn with_stderr<I, B>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.stderr_chunks = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// 명령 발행이 실패하도록 설정합니다.
    pub fn with_failing_exec(mut self) -> Self {
        self.fail_exec = true;
        self
    }

    /// 지금까지 받은 명령 목록
    pub fn recorded_commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl CommandExecutor for MockExecutor {
    async fn exec(&self, command: &str) -> Result<CommandStream, LogPipelineError> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.to_owned());
        }

        if self.fail_exec {
            return Err(LogPipelineError::Command {
                command: command.to_owned(),
                reason: "mock failure".to_owned(),
            });
        }

        let (stdout_tx, stdout_rx) = mpsc::channel(self.stdout_chunks.len().max(1));
        let (stderr_tx, stderr_rx) = mpsc::channel(self.stderr_chunks.len().max(1));
        for chunk in &self.stdout_chunks {
            let _ = stdout_tx.try_send(chunk.clone());
        }
        for chunk in &self.stderr_chunks {
            let _ = stderr_tx.try_send(chunk.clone());
        }

        Ok(CommandStream {
            stdout: stdout_rx,
            stderr: stderr_rx,
        })
    }
}
