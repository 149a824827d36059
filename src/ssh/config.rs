// SSH 连接配置

use std::time::Duration;

use crate::models::ConnectionSettings;

/// SSH 连接配置
#[derive(Clone, Debug)]
pub struct SshConfig {
    /// 目标主机
    pub host: String,
    /// 端口
    pub port: u16,
    /// 用户名
    pub username: String,
    /// 登录密码
    pub password: String,
    /// 连接超时（秒）
    pub connect_timeout: u64,
    /// 单条命令超时（秒）
    pub command_timeout: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: String::new(),
            password: String::new(),
            connect_timeout: 10,
            command_timeout: 15,
        }
    }
}

impl SshConfig {
    /// 用密码认证构建配置，端口和超时取自连接设置
    pub fn with_password(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        settings: &ConnectionSettings,
    ) -> Self {
        Self {
            host: host.into(),
            port: settings.port,
            username: username.into(),
            password: password.into(),
            connect_timeout: settings.connect_timeout_secs,
            command_timeout: settings.command_timeout_secs,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// 构建 russh 配置
    pub fn to_russh_config(&self) -> russh::client::Config {
        let mut config = russh::client::Config::default();
        // russh 没有单独的 connection_timeout，用 inactivity_timeout 兜底
        config.inactivity_timeout = Some(Duration::from_secs(
            self.connect_timeout.max(self.command_timeout),
        ));
        config
    }
}
