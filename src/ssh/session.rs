// SSH 会话管理
// 连接成功后的会话对象，每条命令使用独立的执行通道

use std::time::Duration;

use russh::client::{Handle, Msg};
use russh::ChannelMsg;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::error::SshError;
use super::handler::SshClientHandler;

/// SSH 会话（连接成功后）
pub struct SshSession {
    /// 会话 ID
    id: String,
    handle: Handle<SshClientHandler>,
    /// 单条命令超时（秒）
    command_timeout: u64,
    is_connected: bool,
}

impl SshSession {
    pub fn new(
        id: String,
        handle: Handle<SshClientHandler>,
        command_timeout: u64,
    ) -> Self {
        Self {
            id,
            handle,
            command_timeout,
            is_connected: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_alive(&self) -> bool {
        self.is_connected && !self.handle.is_closed()
    }

    /// 打开执行通道
    pub async fn open_exec(&self) -> Result<ExecChannel, SshError> {
        if !self.is_alive() {
            return Err(SshError::Disconnected(
                "Session is disconnected".to_string(),
            ));
        }

        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(SshError::from)?;

        Ok(ExecChannel::new(channel))
    }

    /// 执行单条命令，受 command_timeout 约束
    pub async fn exec(&self, command: &str) -> Result<CommandOutput, SshError> {
        let limit = Duration::from_secs(self.command_timeout);
        let run = async {
            let mut channel = self.open_exec().await?;
            channel.exec(command).await
        };
        timeout(limit, run)
            .await
            .map_err(|_| SshError::Timeout(self.command_timeout))?
    }

    /// 关闭会话
    pub async fn close(&mut self) -> Result<(), SshError> {
        if !self.is_connected {
            return Ok(());
        }
        self.is_connected = false;
        debug!("[SSH] Closing session {}", self.id);
        if let Err(e) = self
            .handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
        {
            warn!("[SSH] Failed to close session {}: {}", self.id, e);
            return Err(SshError::from(e));
        }
        Ok(())
    }
}

type RusshChannel = russh::Channel<Msg>;

/// 执行通道（单条命令）
pub struct ExecChannel {
    channel: RusshChannel,
}

impl ExecChannel {
    fn new(channel: RusshChannel) -> Self {
        Self { channel }
    }

    /// 执行命令并收集输出
    pub async fn exec(&mut self, command: &str) -> Result<CommandOutput, SshError> {
        self.channel
            .exec(true, command)
            .await
            .map_err(|e| SshError::Channel(e.to_string()))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_code = None;

        // exit-status 可能在 EOF 之后到达，读到 Close 为止
        while let Some(channel_msg) = self.channel.wait().await {
            match channel_msg {
                ChannelMsg::Data { data } => {
                    stdout.extend_from_slice(&data);
                }
                ChannelMsg::ExtendedData { data, ext } => {
                    if ext == 1 {
                        // stderr
                        stderr.extend_from_slice(&data);
                    }
                }
                ChannelMsg::ExitStatus { exit_status } => {
                    exit_code = Some(exit_status);
                }
                ChannelMsg::Close => break,
                _ => {}
            }
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

/// 命令输出
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 标准输出
    pub stdout: Vec<u8>,
    /// 标准错误
    pub stderr: Vec<u8>,
    /// 退出码（远端未报告时为 None）
    pub exit_code: Option<u32>,
}

impl CommandOutput {
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// 退出码为 0 且无 stderr 输出
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0) && self.stderr.is_empty()
    }
}
