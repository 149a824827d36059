// Settings 配置数据结构

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ======================== 主配置结构 ========================

/// 引擎设置（持久化用）
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

// ======================== 连接设置 ========================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectionSettings {
    pub port: u16,
    /// 连接超时（秒）
    pub connect_timeout_secs: u64,
    /// 单条远程命令超时（秒）
    pub command_timeout_secs: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: 22,
            connect_timeout_secs: 10,
            command_timeout_secs: 15,
        }
    }
}

// ======================== 远程设备设置 ========================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RestartTarget {
    /// 通过 SSH 在设备上执行
    #[default]
    Remote,
    /// 在本机执行（配置工具运行在机器人上时）
    Local,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteSettings {
    /// 设备上被修补的 JSON 配置文件
    pub config_path: String,
    /// 连通性探测命令
    pub verify_command: String,
    pub restart_command: String,
    pub restart_target: RestartTarget,
    pub restart_timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            config_path: "/home/robot/config/robot_config.json".to_string(),
            verify_command: "echo connected".to_string(),
            restart_command: "sudo reboot".to_string(),
            restart_target: RestartTarget::Remote,
            restart_timeout_secs: 30,
        }
    }
}

// ======================== 本地存储设置 ========================

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// 覆盖默认的快照文件路径
    pub snapshot_file: Option<PathBuf>,
}
