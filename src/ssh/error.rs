// SSH 错误类型定义

use thiserror::Error;

/// 到设备的传输错误
/// 部署层把它们记进单条命令结果或整体失败原因，不做重试
#[derive(Debug, Error)]
pub enum SshError {
    /// 目标地址为空或无法解析
    #[error("Configuration error: {0}")]
    Config(String),

    /// TCP 连接被拒绝、不可达等
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 设备拒绝了用户名或密码
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// 握手或协议层失败
    #[error("SSH protocol error: {0}")]
    Protocol(String),

    /// 建连、单条命令或关闭会话超过时限（秒）
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// 执行通道异常结束
    #[error("Channel error: {0}")]
    Channel(String),

    /// 会话已断开，不能再执行命令
    #[error("Session disconnected: {0}")]
    Disconnected(String),
}

impl From<russh::Error> for SshError {
    fn from(e: russh::Error) -> Self {
        SshError::Protocol(e.to_string())
    }
}
