// 远程补丁命令构建
// 在设备 JSON 文件中按外层块名定位，再用 sed 替换块内某个键的字符串值
// 不解析 JSON，文件格式偏离 "key": "value" 的单行写法时替换不会生效
//
// 值转义只处理 '/' 和 '"'，其余 shell / sed 元字符（单引号、'&'、'\'、换行）
// 会破坏生成的命令

use crate::models::{ConfigSnapshot, Namespace};

use super::error::DeployError;

/// 快照字段到远程文件位置的映射
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchField {
    pub namespace: Namespace,
    pub field: &'static str,
    /// 远程文件中的外层块名
    pub block: &'static str,
    /// 块内的键
    pub key: &'static str,
}

/// 推送覆盖的字段，按执行顺序排列
pub const PATCH_FIELDS: [PatchField; 7] = [
    PatchField {
        namespace: Namespace::Network,
        field: "ssid",
        block: "network",
        key: "ssid",
    },
    PatchField {
        namespace: Namespace::Network,
        field: "password",
        block: "network",
        key: "password",
    },
    PatchField {
        namespace: Namespace::Network,
        field: "gateway",
        block: "network",
        key: "gateway",
    },
    PatchField {
        namespace: Namespace::Network,
        field: "subnet_mask",
        block: "network",
        key: "subnet_mask",
    },
    PatchField {
        namespace: Namespace::Robot,
        field: "ip",
        block: "network",
        key: "ip",
    },
    PatchField {
        namespace: Namespace::Robot,
        field: "robot_number",
        block: "robot",
        key: "robot_number",
    },
    PatchField {
        namespace: Namespace::Robot,
        field: "ess_ip",
        block: "network",
        key: "server",
    },
];

/// 一条远程补丁命令
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchCommand {
    pub block: &'static str,
    pub key: &'static str,
    pub value: String,
    /// 远程执行的命令文本
    pub command: String,
}

impl PatchCommand {
    pub fn label(&self) -> String {
        format!("{}.{}", self.block, self.key)
    }
}

/// 推送目标与凭据
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushTarget {
    pub address: String,
    pub username: String,
    pub password: String,
}

impl PushTarget {
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// 取快照 ssh 命名空间中的地址与凭据
    pub fn from_snapshot(snapshot: &ConfigSnapshot) -> Self {
        Self::new(
            snapshot.get(Namespace::Ssh, "ip"),
            snapshot.get(Namespace::Ssh, "username"),
            snapshot.get(Namespace::Ssh, "password"),
        )
    }

    /// 地址、用户名、密码均不能为空
    pub fn validate(&self) -> Result<(), DeployError> {
        let missing: Vec<&'static str> = [
            ("address", &self.address),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DeployError::Precondition(missing))
        }
    }
}

/// 转义 '/' 和 '"'
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '/' || c == '"' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 生成替换 block 内 key 值的 sed 命令
pub fn patch_command_text(remote_path: &str, block: &str, key: &str, value: &str) -> String {
    format!(
        r#"sed -i '/"{block}"[[:space:]]*:[[:space:]]*{{/,/}}/ s/"{key}"[[:space:]]*:[[:space:]]*"[^"]*"/"{key}": "{value}"/' '{path}'"#,
        block = block,
        key = key,
        value = escape_value(value),
        path = remote_path,
    )
}

/// 为快照生成全部补丁命令
pub fn build_patch_commands(snapshot: &ConfigSnapshot, remote_path: &str) -> Vec<PatchCommand> {
    PATCH_FIELDS
        .iter()
        .map(|field| {
            let value = snapshot.get(field.namespace, field.field).to_string();
            PatchCommand {
                block: field.block,
                key: field.key,
                command: patch_command_text(remote_path, field.block, field.key, &value),
                value,
            }
        })
        .collect()
}

/// 校验推送目标后生成命令
pub fn build_for_push(
    snapshot: &ConfigSnapshot,
    target: &PushTarget,
    remote_path: &str,
) -> Result<Vec<PatchCommand>, DeployError> {
    target.validate()?;
    Ok(build_patch_commands(snapshot, remote_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldMap;

    const REMOTE: &str = "/home/robot/config/robot_config.json";

    fn snapshot() -> ConfigSnapshot {
        let mut snapshot = ConfigSnapshot::default();
        snapshot.replace(
            Namespace::Network,
            FieldMap::from([
                ("ssid".to_string(), "lab-5g".to_string()),
                ("password".to_string(), "secret".to_string()),
                ("gateway".to_string(), "10.1.2.1".to_string()),
                ("subnet_mask".to_string(), "255.255.255.0".to_string()),
            ]),
        );
        snapshot.replace(
            Namespace::Robot,
            FieldMap::from([
                ("robot_number".to_string(), "42".to_string()),
                ("ip".to_string(), "10.1.2.42".to_string()),
                ("ess_ip".to_string(), "10.1.2.200".to_string()),
            ]),
        );
        snapshot
    }

    #[test]
    fn builds_commands_in_fixed_order() {
        let commands = build_patch_commands(&snapshot(), REMOTE);
        let labels: Vec<String> = commands.iter().map(PatchCommand::label).collect();

        assert_eq!(
            labels,
            vec![
                "network.ssid",
                "network.password",
                "network.gateway",
                "network.subnet_mask",
                "network.ip",
                "robot.robot_number",
                "network.server",
            ]
        );
        assert_eq!(commands[4].value, "10.1.2.42");
        assert_eq!(commands[6].value, "10.1.2.200");
    }

    #[test]
    fn command_text_targets_block_and_key() {
        let command = patch_command_text(REMOTE, "network", "ssid", "lab-5g");
        assert_eq!(
            command,
            r#"sed -i '/"network"[[:space:]]*:[[:space:]]*{/,/}/ s/"ssid"[[:space:]]*:[[:space:]]*"[^"]*"/"ssid": "lab-5g"/' '/home/robot/config/robot_config.json'"#
        );
    }

    #[test]
    fn escapes_only_slash_and_quote() {
        assert_eq!(escape_value(r#"a/b"c"#), r#"a\/b\"c"#);
        assert_eq!(escape_value("p&ss'wd"), "p&ss'wd");
    }

    #[test]
    fn missing_fields_patch_empty_values() {
        let commands = build_patch_commands(&ConfigSnapshot::default(), REMOTE);
        assert_eq!(commands.len(), PATCH_FIELDS.len());
        assert!(commands.iter().all(|c| c.value.is_empty()));
    }

    #[test]
    fn push_requires_address_and_credentials() {
        let target = PushTarget::new("", "robot", "");
        let err = build_for_push(&snapshot(), &target, REMOTE).unwrap_err();

        match err {
            DeployError::Precondition(missing) => {
                assert_eq!(missing, vec!["address", "password"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn target_reads_ssh_namespace() {
        let mut snapshot = snapshot();
        snapshot.replace(
            Namespace::Ssh,
            FieldMap::from([
                ("ip".to_string(), "10.1.2.42".to_string()),
                ("username".to_string(), "robot".to_string()),
                ("password".to_string(), "pw".to_string()),
            ]),
        );

        let target = PushTarget::from_snapshot(&snapshot);
        assert_eq!(target, PushTarget::new("10.1.2.42", "robot", "pw"));
        assert!(build_for_push(&snapshot, &target, REMOTE).is_ok());
    }
}
