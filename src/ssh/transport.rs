// 传输层抽象
// 部署逻辑只依赖这两个 trait，测试时可替换为内存实现

use async_trait::async_trait;

use super::client::SshClient;
use super::config::SshConfig;
use super::error::SshError;
use super::session::{CommandOutput, SshSession};

/// 一次已认证的远程执行会话
#[async_trait]
pub trait RemoteShell: Send {
    /// 会话标识，写入部署结果
    fn session_id(&self) -> &str;

    /// 执行命令并返回捕获的输出
    /// 实现可以不设超时，调用方会用 command_timeout_secs 包裹每次调用
    async fn exec(&mut self, command: &str) -> Result<CommandOutput, SshError>;

    async fn close(&mut self) -> Result<(), SshError>;
}

/// 会话工厂
#[async_trait]
pub trait Transport: Send + Sync {
    /// 打开并认证一个会话，需在 config 的连接超时内返回
    async fn open(&self, config: &SshConfig) -> Result<Box<dyn RemoteShell>, SshError>;
}

/// 基于 russh 的传输实现
#[derive(Clone, Copy, Debug, Default)]
pub struct RusshTransport;

#[async_trait]
impl Transport for RusshTransport {
    async fn open(&self, config: &SshConfig) -> Result<Box<dyn RemoteShell>, SshError> {
        let session = SshClient::new(config.clone()).connect().await?;
        Ok(Box::new(session))
    }
}

#[async_trait]
impl RemoteShell for SshSession {
    fn session_id(&self) -> &str {
        self.id()
    }

    async fn exec(&mut self, command: &str) -> Result<CommandOutput, SshError> {
        SshSession::exec(self, command).await
    }

    async fn close(&mut self) -> Result<(), SshError> {
        SshSession::close(self).await
    }
}
