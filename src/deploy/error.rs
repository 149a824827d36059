// 部署错误类型定义

use thiserror::Error;

use crate::ssh::SshError;

/// 部署错误类型
#[derive(Debug, Error)]
pub enum DeployError {
    /// 推送前置条件不满足（未发起任何连接）
    #[error("Missing required field(s): {}", .0.join(", "))]
    Precondition(Vec<&'static str>),

    /// 连接被拒绝、超时或认证失败
    #[error("Transport error: {0}")]
    Transport(#[from] SshError),

    /// 远程命令非零退出或输出了 stderr
    #[error("Remote command failed: {0}")]
    RemoteCommand(String),

    /// 重启命令失败
    #[error("Restart failed: {0}")]
    Restart(String),
}
