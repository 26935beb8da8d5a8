//! 가짜 원격 명령 -- 실제 프로세스 없이 stdout/stderr 청크를 흘려보냅니다.
//!
//! - [`ScriptedRemote`]: 미리 정한 출력을 한 번에 돌려주는 실행기
//! - [`fake_remote`]: 테스트가 직접 청크를 밀어 넣고 닫는 writer/실행기 쌍

use std::sync::Mutex;

use bytes::Bytes;
use tokio::sync::mpsc;

use tailwatch_log_pipeline::{CommandExecutor, CommandStream, LogPipelineError};

/// 정해진 출력을 매 호출마다 재생하는 실행기
#[derive(Default)]
pub struct ScriptedRemote {
    stdout: Vec<Bytes>,
    stderr: Vec<Bytes>,
    fail: bool,
    commands: Mutex<Vec<String>>,
}

impl ScriptedRemote {
    /// 주어진 라인들을 `\n`으로 이어 stdout 한 청크로 보냅니다.
    pub fn with_lines(lines: &[&str]) -> Self {
        let mut body = lines.join("\n");
        body.push('\n');
        Self {
            stdout: vec![Bytes::from(body)],
            ..Self::default()
        }
    }

    /// stdout 청크를 그대로 지정합니다.
    pub fn with_chunks(chunks: Vec<Bytes>) -> Self {
        Self {
            stdout: chunks,
            ..Self::default()
        }
    }

    /// stderr 청크를 추가합니다.
    pub fn stderr(mut self, chunk: &'static str) -> Self {
        self.stderr.push(Bytes::from_static(chunk.as_bytes()));
        self
    }

    /// 명령 발행이 실패하는 실행기
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// 받은 명령 목록
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandExecutor for ScriptedRemote {
    async fn exec(&self, command: &str) -> Result<CommandStream, LogPipelineError> {
        self.commands.lock().unwrap().push(command.to_owned());
        if self.fail {
            return Err(LogPipelineError::Command {
                command: command.to_owned(),
                reason: "ssh: connect to host web-01 port 22: Connection refused".to_owned(),
            });
        }

        let (out_tx, out_rx) = mpsc::channel(4);
        let (err_tx, err_rx) = mpsc::channel(4);
        let stdout = self.stdout.clone();
        let stderr = self.stderr.clone();

        // 실제 프로세스처럼 stdout과 stderr를 번갈아 흘려보냄
        tokio::spawn(async move {
            let mut stderr = stderr.into_iter();
            for chunk in stdout {
                if let Some(err_chunk) = stderr.next() {
                    let _ = err_tx.send(err_chunk).await;
                }
                tokio::task::yield_now().await;
                if out_tx.send(chunk).await.is_err() {
                    return;
                }
            }
            for err_chunk in stderr {
                let _ = err_tx.send(err_chunk).await;
            }
        });

        Ok(CommandStream {
            stdout: out_rx,
            stderr: err_rx,
        })
    }
}

/// [`fake_remote`]의 출력 쪽 핸들
pub struct FakeRemoteWriter {
    stdout: mpsc::UnboundedSender<Bytes>,
    stderr: mpsc::UnboundedSender<Bytes>,
}

impl FakeRemoteWriter {
    /// stdout 청크를 보냅니다.
    pub fn send_stdout(&self, chunk: impl Into<Bytes>) {
        let _ = self.stdout.send(chunk.into());
    }

    /// stderr 청크를 보냅니다.
    pub fn send_stderr(&self, chunk: impl Into<Bytes>) {
        let _ = self.stderr.send(chunk.into());
    }

    /// 출력을 닫습니다. 소비자는 이 시점에 사이클을 마칩니다.
    pub fn close(self) {}
}

/// 테스트가 직접 제어하는 일회성 실행기
pub struct FakeRemote {
    stream: Mutex<Option<(mpsc::UnboundedReceiver<Bytes>, mpsc::UnboundedReceiver<Bytes>)>>,
}

impl CommandExecutor for FakeRemote {
    async fn exec(&self, command: &str) -> Result<CommandStream, LogPipelineError> {
        let taken = self.stream.lock().unwrap().take();
        let Some((mut stdout_rx, mut stderr_rx)) = taken else {
            return Err(LogPipelineError::Command {
                command: command.to_owned(),
                reason: "fake remote already used".to_owned(),
            });
        };

        // unbounded 수신자를 CommandStream의 bounded 채널로 연결
        let (out_tx, out_rx) = mpsc::channel(16);
        let (err_tx, err_rx) = mpsc::channel(16);
        tokio::spawn(async move {
            while let Some(chunk) = stdout_rx.recv().await {
                if out_tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });
        tokio::spawn(async move {
            while let Some(chunk) = stderr_rx.recv().await {
                if err_tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });

        Ok(CommandStream {
            stdout: out_rx,
            stderr: err_rx,
        })
    }
}

/// 연결된 writer/실행기 쌍을 만듭니다.
pub fn fake_remote() -> (FakeRemoteWriter, FakeRemote) {
    let (stdout_tx, stdout_rx) = mpsc::unbounded_channel();
    let (stderr_tx, stderr_rx) = mpsc::unbounded_channel();
    (
        FakeRemoteWriter {
            stdout: stdout_tx,
            stderr: stderr_tx,
        },
        FakeRemote {
            stream: Mutex::new(Some((stdout_rx, stderr_rx))),
        },
    )
}
