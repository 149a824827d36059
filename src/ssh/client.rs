// SSH 客户端核心实现

use std::sync::Arc;

use russh::client::Handle;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info};

use super::config::SshConfig;
use super::error::SshError;
use super::handler::SshClientHandler;
use super::session::SshSession;

/// SSH 客户端
/// 负责建立 SSH 连接并返回 SshSession
pub struct SshClient {
    config: SshConfig,
}

impl SshClient {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    /// 执行连接，整个过程受 connect_timeout 约束
    pub async fn connect(&self) -> Result<SshSession, SshError> {
        let limit = self.config.connect_timeout();
        timeout(limit, self.connect_inner())
            .await
            .map_err(|_| SshError::Timeout(self.config.connect_timeout))?
    }

    async fn connect_inner(&self) -> Result<SshSession, SshError> {
        debug!(
            "[SSH] Target: {}@{}:{}",
            self.config.username, self.config.host, self.config.port
        );

        if self.config.host.trim().is_empty() {
            return Err(SshError::Config("Host is empty".to_string()));
        }

        // 解析地址
        let socket_addr = lookup_host((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|e| SshError::Config(format!("Failed to resolve address: {}", e)))?
            .next()
            .ok_or_else(|| SshError::Config("No valid address found".to_string()))?;

        info!("[SSH] Connecting to {}...", socket_addr);
        let tcp_stream = TcpStream::connect(socket_addr).await?;

        // SSH 握手
        let russh_config = Arc::new(self.config.to_russh_config());
        let handler = SshClientHandler::new(self.config.host.clone());
        let mut handle = russh::client::connect_stream(russh_config, tcp_stream, handler)
            .await
            .map_err(SshError::from)?;
        debug!("[SSH] Handshake completed");

        info!("[SSH] Authenticating as '{}'...", self.config.username);
        self.authenticate(&mut handle).await?;
        info!("[SSH] Connected to {}", self.config.host);

        Ok(SshSession::new(
            uuid::Uuid::new_v4().to_string(),
            handle,
            self.config.command_timeout,
        ))
    }

    /// 密码认证，设备只支持这一种方式
    async fn authenticate(&self, handle: &mut Handle<SshClientHandler>) -> Result<(), SshError> {
        use russh::client::AuthResult;

        let auth_result = handle
            .authenticate_password(&self.config.username, &self.config.password)
            .await
            .map_err(SshError::from)?;

        match auth_result {
            AuthResult::Success => Ok(()),
            AuthResult::Failure {
                partial_success: true,
                ..
            } => Err(SshError::Auth(
                "Partial authentication - additional auth required".to_string(),
            )),
            AuthResult::Failure {
                remaining_methods, ..
            } => Err(SshError::Auth(format!(
                "Password rejected for '{}'. Server suggests: {:?}",
                self.config.username, remaining_methods
            ))),
        }
    }
}
