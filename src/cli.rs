// 命令行参数定义

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use robot_configurator::Namespace;

/// RobotConfigurator - 编辑本地配置并推送到机器人
#[derive(Parser, Debug)]
#[command(name = "robot-configurator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置目录（默认使用系统配置目录）
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceArg {
    Network,
    Robot,
    Ssh,
}

impl From<NamespaceArg> for Namespace {
    fn from(arg: NamespaceArg) -> Self {
        match arg {
            NamespaceArg::Network => Namespace::Network,
            NamespaceArg::Robot => Namespace::Robot,
            NamespaceArg::Ssh => Namespace::Ssh,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 显示已保存的配置
    Show,

    /// 修改并保存一个命名空间的字段
    Save {
        #[arg(value_enum)]
        namespace: NamespaceArg,

        /// key=value 形式的字段
        #[arg(value_parser = parse_assignment, required = true)]
        fields: Vec<(String, String)>,
    },

    /// 机器人编号步进
    StepId {
        #[arg(allow_hyphen_values = true)]
        delta: i64,

        /// 同步调整机器人地址末段
        #[arg(long)]
        mirror: bool,
    },

    /// 开启或关闭地址镜像（开启时用地址末段覆盖编号）
    Mirror {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// 修改网关并同步机器人地址前缀
    Gateway { address: String },

    /// 子网掩码第三段步进
    MaskStep {
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },

    /// 检查设备连通性
    Check,

    /// 把已保存的配置推送到设备
    Push,

    /// 打印将要执行的远程补丁命令
    PatchPreview,

    /// 重启设备
    Restart {
        /// 确认执行重启
        #[arg(long)]
        yes: bool,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
