// 远程部署模块
//
// - patch: 由快照生成远程补丁命令 (PatchCommand, PushTarget)
// - session: 连接、推送、探测与重启 (DeploymentSession)
// - report: 推送结果与状态日志 (DeploymentResult, CommandOutcome)

pub mod error;
pub mod patch;
pub mod report;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use error::DeployError;
pub use patch::{build_for_push, build_patch_commands, PatchCommand, PushTarget, PATCH_FIELDS};
pub use report::{
    CommandOutcome, ConnectivityCheck, DeployStage, DeploymentResult, LogEntry, LogLevel,
};
pub use session::DeploymentSession;
