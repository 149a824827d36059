// RobotConfigurator - 机器人配置同步与远程部署引擎
//
// 模块结构:
// - models: 配置快照与引擎设置
// - services: 本地持久化 (ConfigStore, settings.json)
// - fields: 地址工具与派生字段同步
// - ssh: russh 传输层
// - deploy: 远程补丁命令、推送与重启
// - engine: 界面层调用入口 (Configurator)

pub mod deploy;
pub mod engine;
pub mod fields;
pub mod models;
pub mod services;
pub mod ssh;

pub use deploy::{DeployError, DeploymentResult};
pub use engine::{Configurator, EngineError};
pub use models::{ConfigSnapshot, EngineSettings, Namespace};
