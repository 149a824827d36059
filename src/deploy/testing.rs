// 测试用内存传输实现

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ssh::{CommandOutput, RemoteShell, SshConfig, SshError, Transport};

#[derive(Debug, Default)]
struct MockState {
    opened: usize,
    closed: usize,
    commands: Vec<String>,
    hosts: Vec<String>,
}

/// 记录会话与命令次数，可让指定命令失败、挂起或拒绝连接
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    refuse: bool,
    hang: bool,
    fail_patterns: Vec<String>,
    drop_patterns: Vec<String>,
}

impl MockTransport {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Default::default()
        }
    }

    /// 会话能建立，但每条命令都不返回
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    /// 命令文本包含 pattern 时返回非零退出码
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_patterns.push(pattern.to_string());
        self
    }

    /// 命令文本包含 pattern 时连接直接关闭，没有退出码
    pub fn closing_on(mut self, pattern: &str) -> Self {
        self.drop_patterns.push(pattern.to_string());
        self
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn hosts(&self) -> Vec<String> {
        self.state.lock().unwrap().hosts.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, config: &SshConfig) -> Result<Box<dyn RemoteShell>, SshError> {
        if self.refuse {
            return Err(SshError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        let mut state = self.state.lock().unwrap();
        state.opened += 1;
        state.hosts.push(config.host.clone());
        Ok(Box::new(MockShell {
            id: format!("mock-session-{}", state.opened),
            state: self.state.clone(),
            hang: self.hang,
            fail_patterns: self.fail_patterns.clone(),
            drop_patterns: self.drop_patterns.clone(),
        }))
    }
}

struct MockShell {
    id: String,
    state: Arc<Mutex<MockState>>,
    hang: bool,
    fail_patterns: Vec<String>,
    drop_patterns: Vec<String>,
}

#[async_trait]
impl RemoteShell for MockShell {
    fn session_id(&self) -> &str {
        &self.id
    }

    async fn exec(&mut self, command: &str) -> Result<CommandOutput, SshError> {
        self.state.lock().unwrap().commands.push(command.to_string());

        if self.hang {
            std::future::pending::<()>().await;
        }

        if self.drop_patterns.iter().any(|p| command.contains(p.as_str())) {
            return Ok(CommandOutput {
                stdout: Vec::new(),
                stderr: Vec::new(),
                exit_code: None,
            });
        }

        if self.fail_patterns.iter().any(|p| command.contains(p.as_str())) {
            return Ok(CommandOutput {
                stdout: Vec::new(),
                stderr: b"sed: can't read file".to_vec(),
                exit_code: Some(1),
            });
        }

        let stdout = command
            .strip_prefix("echo ")
            .map(|text| format!("{}\n", text).into_bytes())
            .unwrap_or_default();
        Ok(CommandOutput {
            stdout,
            stderr: Vec::new(),
            exit_code: Some(0),
        })
    }

    async fn close(&mut self) -> Result<(), SshError> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}
