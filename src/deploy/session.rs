// 部署会话
// 建立传输会话，执行连通性探测、补丁命令和重启命令
// 任何失败都只终止本次调用，不重试

use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::models::{ConfigSnapshot, ConnectionSettings, RemoteSettings, RestartTarget};
use crate::ssh::{CommandOutput, RemoteShell, SshConfig, SshError, Transport};

use super::error::DeployError;
use super::patch::{build_for_push, PushTarget};
use super::report::{
    CommandOutcome, ConnectivityCheck, DeployStage, DeploymentResult, LogEntry,
};

/// 部署会话
pub struct DeploymentSession {
    transport: Arc<dyn Transport>,
    connection: ConnectionSettings,
    remote: RemoteSettings,
}

impl DeploymentSession {
    pub fn new(
        transport: Arc<dyn Transport>,
        connection: ConnectionSettings,
        remote: RemoteSettings,
    ) -> Self {
        Self {
            transport,
            connection,
            remote,
        }
    }

    fn ssh_config(&self, target: &PushTarget, connect_timeout: Duration) -> SshConfig {
        let mut config = SshConfig::with_password(
            target.address.trim(),
            target.username.as_str(),
            target.password.as_str(),
            &self.connection,
        );
        config.connect_timeout = connect_timeout.as_secs().max(1);
        config
    }

    async fn open(
        &self,
        target: &PushTarget,
        connect_timeout: Duration,
    ) -> Result<Box<dyn RemoteShell>, DeployError> {
        let config = self.ssh_config(target, connect_timeout);
        // 传输实现自身也有超时，这里再兜底一次
        let limit = config.connect_timeout() + Duration::from_secs(1);
        let shell = timeout(limit, self.transport.open(&config))
            .await
            .map_err(|_| SshError::Timeout(config.connect_timeout))??;
        Ok(shell)
    }

    /// 执行单条命令，超过 command_timeout_secs 视为失败
    async fn exec_bounded(
        &self,
        shell: &mut dyn RemoteShell,
        command: &str,
    ) -> Result<CommandOutput, SshError> {
        let secs = self.connection.command_timeout_secs;
        timeout(Duration::from_secs(secs), shell.exec(command))
            .await
            .map_err(|_| SshError::Timeout(secs))?
    }

    /// 连接并执行探测命令，返回探测输出
    pub async fn connect_and_verify(
        &self,
        target: &PushTarget,
        connect_timeout: Duration,
    ) -> Result<String, DeployError> {
        target.validate()?;
        info!("[Deploy] Checking connectivity to {}", target.address);

        let mut shell = self.open(target, connect_timeout).await?;
        let check = self.run_verify(shell.as_mut()).await;
        self.close_quietly(shell.as_mut()).await;

        if check.success {
            info!("[Deploy] {} is responding", target.address);
            Ok(check.output)
        } else {
            warn!("[Deploy] Verify failed on {}: {}", target.address, check.output);
            Err(DeployError::RemoteCommand(check.output))
        }
    }

    /// 执行探测命令
    async fn run_verify(&self, shell: &mut dyn RemoteShell) -> ConnectivityCheck {
        match self.exec_bounded(shell, &self.remote.verify_command).await {
            Ok(output) if output.is_success() => ConnectivityCheck {
                success: true,
                output: output.stdout_string().trim().to_string(),
            },
            Ok(output) => {
                let outcome = CommandOutcome::from_output(
                    "verify".to_string(),
                    self.remote.verify_command.clone(),
                    &output,
                );
                ConnectivityCheck {
                    success: false,
                    output: outcome.failure_detail(),
                }
            }
            Err(e) => ConnectivityCheck {
                success: false,
                output: e.to_string(),
            },
        }
    }

    /// 推送快照
    /// 前置条件不满足时返回 Err 且不发起连接；
    /// 会话无法建立时返回只含整体失败原因的结果
    pub async fn push(
        &self,
        snapshot: &ConfigSnapshot,
        target: &PushTarget,
    ) -> Result<DeploymentResult, DeployError> {
        let commands = build_for_push(snapshot, target, &self.remote.config_path)?;
        let mut result = DeploymentResult::default();

        result.enter(DeployStage::ConnectAttempt);
        result.log(LogEntry::info(format!(
            "Connecting to {}@{}...",
            target.username, target.address
        )));
        let connect_timeout = Duration::from_secs(self.connection.connect_timeout_secs);
        let mut shell = match self.open(target, connect_timeout).await {
            Ok(shell) => shell,
            Err(e) => {
                error!("[Deploy] Failed to open session to {}: {}", target.address, e);
                result.enter(DeployStage::Failed);
                result.log(LogEntry::error(format!("Connection failed: {}", e)));
                result.failure = Some(e.to_string());
                result.enter(DeployStage::Reported);
                return Ok(result);
            }
        };

        debug!("[Deploy] Session {} opened", shell.session_id());
        result.session_id = Some(shell.session_id().to_string());
        result.enter(DeployStage::Connected);
        result.log(LogEntry::info("Connected"));

        result.enter(DeployStage::Executing);
        for command in &commands {
            let label = command.label();
            let outcome = match self.exec_bounded(shell.as_mut(), &command.command).await {
                Ok(output) => CommandOutcome::from_output(label, command.command.clone(), &output),
                Err(e) => CommandOutcome::from_error(label, command.command.clone(), e),
            };

            if outcome.success {
                result.log(LogEntry::info(format!("Updated {}", outcome.label)));
            } else {
                warn!(
                    "[Deploy] {} failed: {}",
                    outcome.label,
                    outcome.failure_detail()
                );
                result.log(LogEntry::warn(format!(
                    "Failed to update {}: {}",
                    outcome.label,
                    outcome.failure_detail()
                )));
            }
            result.outcomes.push(outcome);
        }

        let check = self.run_verify(shell.as_mut()).await;
        if check.success {
            result.log(LogEntry::info(format!("Device responded: {}", check.output)));
        } else {
            result.log(LogEntry::error(format!(
                "Device did not respond: {}",
                check.output
            )));
        }
        result.connectivity = Some(check);

        self.close_quietly(shell.as_mut()).await;
        result.enter(DeployStage::Closed);
        result.enter(DeployStage::Reported);

        info!("[Deploy] {}", result.summary());
        Ok(result)
    }

    /// 执行固定的重启命令，调用方负责事先确认
    pub async fn restart(
        &self,
        target: &PushTarget,
        restart_timeout: Duration,
    ) -> Result<String, DeployError> {
        match self.remote.restart_target {
            RestartTarget::Local => self.restart_local(restart_timeout).await,
            RestartTarget::Remote => self.restart_remote(target, restart_timeout).await,
        }
    }

    async fn restart_remote(
        &self,
        target: &PushTarget,
        restart_timeout: Duration,
    ) -> Result<String, DeployError> {
        target.validate()?;
        info!("[Deploy] Restarting {}", target.address);

        let connect_timeout = Duration::from_secs(self.connection.connect_timeout_secs);
        let mut shell = self.open(target, connect_timeout).await?;
        let outcome = timeout(restart_timeout, shell.exec(&self.remote.restart_command)).await;
        self.close_quietly(shell.as_mut()).await;

        let output = outcome
            .map_err(|_| {
                DeployError::Restart(format!(
                    "timed out after {}s",
                    restart_timeout.as_secs()
                ))
            })?
            .map_err(|e| DeployError::Restart(e.to_string()))?;

        match output.exit_code {
            Some(0) => Ok(format!("Restart command sent to {}", target.address)),
            // 设备重启时常在回报退出码前断开连接
            None => Ok(format!(
                "Restart command sent to {}, connection closed",
                target.address
            )),
            Some(_) => {
                let outcome = CommandOutcome::from_output(
                    "restart".to_string(),
                    self.remote.restart_command.clone(),
                    &output,
                );
                Err(DeployError::Restart(outcome.failure_detail()))
            }
        }
    }

    /// 关闭会话，失败或超时只记日志
    async fn close_quietly(&self, shell: &mut dyn RemoteShell) {
        let limit = Duration::from_secs(self.connection.command_timeout_secs);
        match timeout(limit, shell.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("[Deploy] Error while closing session: {}", e),
            Err(_) => debug!("[Deploy] Timed out closing session {}", shell.session_id()),
        }
    }

    async fn restart_local(&self, restart_timeout: Duration) -> Result<String, DeployError> {
        info!("[Deploy] Running local restart command");

        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&self.remote.restart_command)
            .kill_on_drop(true);
        let output = timeout(restart_timeout, command.output())
            .await
            .map_err(|_| {
                DeployError::Restart(format!(
                    "timed out after {}s",
                    restart_timeout.as_secs()
                ))
            })?
            .map_err(|e| DeployError::Restart(e.to_string()))?;

        if output.status.success() {
            Ok("Restart command issued".to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DeployError::Restart(format!(
                "{}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }
}
