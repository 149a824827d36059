// 配置快照数据结构

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 单个命名空间的字段表（字段名 -> 字符串值）
pub type FieldMap = BTreeMap<String, String>;

/// 配置命名空间
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// 无线网络设置
    Network,
    /// 机器人身份
    Robot,
    /// SSH 登录凭据
    Ssh,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Network, Namespace::Robot, Namespace::Ssh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Robot => "robot",
            Self::Ssh => "ssh",
        }
    }

    /// 该命名空间在界面上编辑的字段
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::Network => &["ssid", "password", "gateway", "subnet_mask"],
            Self::Robot => &["robot_number", "ip", "ess_ip"],
            Self::Ssh => &["ip", "username", "password"],
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "network" => Ok(Self::Network),
            "robot" => Ok(Self::Robot),
            "ssh" => Ok(Self::Ssh),
            other => Err(format!(
                "unknown namespace '{}', expected one of: network, robot, ssh",
                other
            )),
        }
    }
}

/// 配置快照（持久化单元）
/// 所有值均为字符串，缺失的键读取为空字符串
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default)]
    pub network: FieldMap,
    #[serde(default)]
    pub robot: FieldMap,
    #[serde(default)]
    pub ssh: FieldMap,
}

impl ConfigSnapshot {
    pub fn namespace(&self, ns: Namespace) -> &FieldMap {
        match ns {
            Namespace::Network => &self.network,
            Namespace::Robot => &self.robot,
            Namespace::Ssh => &self.ssh,
        }
    }

    /// 整体替换一个命名空间（不做深度合并）
    pub fn replace(&mut self, ns: Namespace, fields: FieldMap) {
        match ns {
            Namespace::Network => self.network = fields,
            Namespace::Robot => self.robot = fields,
            Namespace::Ssh => self.ssh = fields,
        }
    }

    /// 读取字段，缺失时返回空字符串
    pub fn get(&self, ns: Namespace, key: &str) -> &str {
        self.namespace(ns).get(key).map(String::as_str).unwrap_or("")
    }
}
