// 部署结果与状态日志

use chrono::{DateTime, Local};

use crate::ssh::CommandOutput;

/// 推送状态机阶段
/// Idle -> ConnectAttempt -> {Connected -> Executing -> Closed | Failed} -> Reported
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployStage {
    Idle,
    ConnectAttempt,
    Connected,
    Executing,
    Closed,
    Failed,
    Reported,
}

/// 日志级别
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// 状态日志条目（供界面状态区显示）
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    /// 单行格式："[12:00:01] INFO message"
    pub fn format_line(&self) -> String {
        format!(
            "[{}] {} {}",
            self.timestamp.format("%H:%M:%S"),
            self.level.as_str(),
            self.message
        )
    }
}

/// 单条命令的执行结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    /// 可读标签，如 "network.ssid"
    pub label: String,
    pub command: String,
    pub success: bool,
    pub exit_code: Option<u32>,
    pub stdout: String,
    pub stderr: String,
    /// 传输层错误（命令未能得到结果）
    pub error: Option<String>,
}

impl CommandOutcome {
    pub fn from_output(label: String, command: String, output: &CommandOutput) -> Self {
        Self {
            label,
            command,
            success: output.is_success(),
            exit_code: output.exit_code,
            stdout: output.stdout_string(),
            stderr: output.stderr_string(),
            error: None,
        }
    }

    pub fn from_error(label: String, command: String, error: impl ToString) -> Self {
        Self {
            label,
            command,
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(error.to_string()),
        }
    }

    /// 失败原因描述
    pub fn failure_detail(&self) -> String {
        if let Some(error) = &self.error {
            return error.clone();
        }
        let stderr = self.stderr.trim();
        match (self.exit_code, stderr.is_empty()) {
            (Some(code), true) => format!("exit code {}", code),
            (Some(code), false) => format!("exit code {}: {}", code, stderr),
            (None, true) => "no exit status reported".to_string(),
            (None, false) => stderr.to_string(),
        }
    }
}

/// 连通性探测结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectivityCheck {
    pub success: bool,
    /// 探测命令输出或失败原因
    pub output: String,
}

/// 一次推送的汇总结果
#[derive(Clone, Debug)]
pub struct DeploymentResult {
    pub session_id: Option<String>,
    pub stages: Vec<DeployStage>,
    pub outcomes: Vec<CommandOutcome>,
    pub connectivity: Option<ConnectivityCheck>,
    /// 会话无法建立时的整体失败原因
    pub failure: Option<String>,
    pub log: Vec<LogEntry>,
}

impl Default for DeploymentResult {
    fn default() -> Self {
        Self {
            session_id: None,
            stages: vec![DeployStage::Idle],
            outcomes: Vec::new(),
            connectivity: None,
            failure: None,
            log: Vec::new(),
        }
    }
}

impl DeploymentResult {
    pub(crate) fn enter(&mut self, stage: DeployStage) {
        self.stages.push(stage);
    }

    pub(crate) fn log(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }

    pub fn stage(&self) -> DeployStage {
        self.stages.last().copied().unwrap_or(DeployStage::Idle)
    }

    pub fn failed_outcomes(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    pub fn failed_count(&self) -> usize {
        self.failed_outcomes().count()
    }

    /// 会话建立、所有命令成功且探测通过
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
            && self.failed_count() == 0
            && self.connectivity.as_ref().is_some_and(|c| c.success)
    }

    /// 一行汇总，供状态栏显示
    pub fn summary(&self) -> String {
        if let Some(failure) = &self.failure {
            return format!("Push failed: {}", failure);
        }
        let total = self.outcomes.len();
        let ok = total - self.failed_count();
        let reachability = match &self.connectivity {
            Some(check) if check.success => "device responding",
            Some(_) => "device not responding",
            None => "device not checked",
        };
        format!("Applied {}/{} field(s), {}", ok, total, reachability)
    }

    /// 汇总加上每条失败命令的详情
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines = vec![self.summary()];
        for outcome in self.failed_outcomes() {
            lines.push(format!(
                "  {} failed: {}",
                outcome.label,
                outcome.failure_detail()
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(label: &str, exit_code: u32, stderr: &str) -> CommandOutcome {
        let output = CommandOutput {
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
            exit_code: Some(exit_code),
        };
        CommandOutcome::from_output(label.to_string(), "true".to_string(), &output)
    }

    #[test]
    fn stderr_marks_command_failed() {
        assert!(outcome("network.ssid", 0, "").success);
        assert!(!outcome("network.ssid", 0, "warning").success);
        assert!(!outcome("network.ssid", 2, "").success);
    }

    #[test]
    fn summary_counts_failures() {
        let mut result = DeploymentResult::default();
        result.outcomes.push(outcome("network.ssid", 0, ""));
        result.outcomes.push(outcome("network.gateway", 1, "sed: no such file"));
        result.connectivity = Some(ConnectivityCheck {
            success: true,
            output: "connected".to_string(),
        });

        assert!(!result.is_success());
        assert_eq!(result.summary(), "Applied 1/2 field(s), device responding");
        let lines = result.status_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "  network.gateway failed: exit code 1: sed: no such file"
        );
    }

    #[test]
    fn aggregate_failure_overrides_summary() {
        let result = DeploymentResult {
            failure: Some("Connection refused".to_string()),
            ..Default::default()
        };
        assert_eq!(result.summary(), "Push failed: Connection refused");
        assert_eq!(result.stage(), DeployStage::Idle);
    }
}
