// SSH 连接模块
//
// 模块结构:
// - config: 连接配置 (SshConfig)
// - error: 错误类型 (SshError)
// - handler: russh Handler 实现
// - client: SSH 客户端核心
// - session: SSH 会话与执行通道 (SshSession, ExecChannel, CommandOutput)
// - transport: 部署层使用的传输抽象 (Transport, RemoteShell)

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod session;
pub mod transport;

// 公开导出
pub use client::SshClient;
pub use config::SshConfig;
pub use error::SshError;
pub use session::{CommandOutput, ExecChannel, SshSession};
pub use transport::{RemoteShell, RusshTransport, Transport};
