// 派生字段同步规则
// 控制器只计算需要写回的字段，由界面层应用更新

use super::address::{adjust_octet, last_octet, last_part, prefix_of};

/// 网关变化时机器人地址缺少可用末段时使用的默认值
pub const DEFAULT_HOST_OCTET: &str = "100";

pub const MIRROR_ON_CAPTION: &str = "IP Mirroring: ON";
pub const MIRROR_OFF_CAPTION: &str = "IP Mirroring: OFF";

/// 界面上机器人页的当前字段值
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RobotFields {
    pub robot_number: String,
    pub ip: String,
}

/// 需要写回界面的字段（None 表示不变）
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldUpdates {
    pub robot_number: Option<String>,
    pub robot_ip: Option<String>,
    pub mirror_caption: Option<&'static str>,
}

impl FieldUpdates {
    pub fn is_empty(&self) -> bool {
        self.robot_number.is_none() && self.robot_ip.is_none() && self.mirror_caption.is_none()
    }

    /// 应用到字段值上
    pub fn apply(&self, fields: &mut RobotFields) {
        if let Some(number) = &self.robot_number {
            fields.robot_number = number.clone();
        }
        if let Some(ip) = &self.robot_ip {
            fields.ip = ip.clone();
        }
    }
}

/// 编号与地址末段的镜像控制器
#[derive(Clone, Debug, Default)]
pub struct FieldSyncController {
    mirror_enabled: bool,
}

impl FieldSyncController {
    pub fn new(mirror_enabled: bool) -> Self {
        Self { mirror_enabled }
    }

    pub fn mirror_enabled(&self) -> bool {
        self.mirror_enabled
    }

    pub fn mirror_caption(&self) -> &'static str {
        if self.mirror_enabled {
            MIRROR_ON_CAPTION
        } else {
            MIRROR_OFF_CAPTION
        }
    }

    /// 网关变化：用新网关前缀替换机器人地址前缀，保留其末段
    /// 单向传播，不触发镜像逻辑
    pub fn on_gateway_changed(&self, new_gateway: &str, current: &RobotFields) -> FieldUpdates {
        let Some(prefix) = prefix_of(new_gateway) else {
            return FieldUpdates::default();
        };
        let host = last_part(&current.ip).unwrap_or(DEFAULT_HOST_OCTET);

        FieldUpdates {
            robot_ip: Some(format!("{}{}", prefix, host)),
            ..Default::default()
        }
    }

    /// 切换镜像：开启瞬间把地址末段拉回编号字段
    pub fn on_mirror_toggled(&mut self, enabled: bool, current: &RobotFields) -> FieldUpdates {
        self.mirror_enabled = enabled;

        let robot_number = if enabled {
            last_octet(&current.ip).map(|octet| octet.to_string())
        } else {
            None
        };

        FieldUpdates {
            robot_number,
            robot_ip: None,
            mirror_caption: Some(self.mirror_caption()),
        }
    }

    /// 编号步进；镜像开启时地址末段同步步进并限幅
    /// 编号本身不限幅
    pub fn on_identifier_step(&self, delta: i64, current: &RobotFields) -> FieldUpdates {
        let Ok(number) = current.robot_number.trim().parse::<i64>() else {
            return FieldUpdates::default();
        };

        let robot_ip = if self.mirror_enabled {
            match adjust_octet(&current.ip, 3, delta) {
                (ip, true) => Some(ip),
                (_, false) => None,
            }
        } else {
            None
        };

        FieldUpdates {
            robot_number: Some(number.saturating_add(delta).to_string()),
            robot_ip,
            mirror_caption: None,
        }
    }
}

/// 子网掩码第三段步进，格式不符时返回 None
pub fn nudge_subnet_mask(mask: &str, delta: i64) -> Option<String> {
    match adjust_octet(mask, 2, delta) {
        (mask, true) => Some(mask),
        (_, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::address::clamp_octet;

    fn robot(number: &str, ip: &str) -> RobotFields {
        RobotFields {
            robot_number: number.to_string(),
            ip: ip.to_string(),
        }
    }

    #[test]
    fn repeated_steps_move_identifier_and_octet_together() {
        let mut fields = robot("5", "10.1.2.250");
        let controller = FieldSyncController::new(true);

        for _ in 0..8 {
            controller.on_identifier_step(1, &fields).apply(&mut fields);
        }

        assert_eq!(fields.robot_number, "13");
        assert_eq!(last_octet(&fields.ip), Some(clamp_octet(250 + 8)));
        assert_eq!(fields.ip, "10.1.2.255");
    }

    #[test]
    fn negative_steps_clamp_octet_but_not_identifier() {
        let mut fields = robot("1", "10.1.2.1");
        let controller = FieldSyncController::new(true);

        for _ in 0..3 {
            controller.on_identifier_step(-1, &fields).apply(&mut fields);
        }

        assert_eq!(fields.robot_number, "-2");
        assert_eq!(fields.ip, "10.1.2.0");
    }

    #[test]
    fn step_without_mirror_leaves_address() {
        let fields = robot("7", "10.1.2.42");
        let controller = FieldSyncController::default();

        let updates = controller.on_identifier_step(1, &fields);

        assert_eq!(updates.robot_number.as_deref(), Some("8"));
        assert_eq!(updates.robot_ip, None);
    }

    #[test]
    fn step_with_unparseable_identifier_is_noop() {
        let fields = robot("R2", "10.1.2.42");
        let controller = FieldSyncController::new(true);

        assert!(controller.on_identifier_step(1, &fields).is_empty());
    }

    #[test]
    fn step_with_malformed_address_updates_identifier_only() {
        let fields = robot("7", "10.1.2");
        let controller = FieldSyncController::new(true);

        let updates = controller.on_identifier_step(1, &fields);

        assert_eq!(updates.robot_number.as_deref(), Some("8"));
        assert_eq!(updates.robot_ip, None);
    }

    #[test]
    fn enabling_mirror_pulls_last_octet() {
        let mut fields = robot("7", "10.1.2.42");
        let mut controller = FieldSyncController::default();

        let updates = controller.on_mirror_toggled(true, &fields);
        assert_eq!(updates.mirror_caption, Some(MIRROR_ON_CAPTION));
        updates.apply(&mut fields);
        assert_eq!(fields.robot_number, "42");

        let updates = controller.on_mirror_toggled(false, &fields);
        assert_eq!(updates.robot_number, None);
        assert_eq!(updates.mirror_caption, Some(MIRROR_OFF_CAPTION));

        controller.on_mirror_toggled(true, &fields).apply(&mut fields);
        assert_eq!(fields.robot_number, "42");
        assert!(controller.mirror_enabled());
    }

    #[test]
    fn enabling_mirror_with_non_numeric_octet_only_updates_caption() {
        let fields = robot("7", "10.1.2.x");
        let mut controller = FieldSyncController::default();

        let updates = controller.on_mirror_toggled(true, &fields);

        assert_eq!(updates.robot_number, None);
        assert_eq!(updates.mirror_caption, Some(MIRROR_ON_CAPTION));
    }

    #[test]
    fn gateway_change_keeps_host_octet() {
        let fields = robot("99", "10.1.2.99");
        let controller = FieldSyncController::new(true);

        let updates = controller.on_gateway_changed("10.1.2.1", &fields);
        assert_eq!(updates.robot_ip.as_deref(), Some("10.1.2.99"));
        assert_eq!(updates.robot_number, None);

        let updates = controller.on_gateway_changed("192.168.5.1", &fields);
        assert_eq!(updates.robot_ip.as_deref(), Some("192.168.5.99"));
    }

    #[test]
    fn gateway_change_with_malformed_gateway_is_ignored() {
        let fields = robot("99", "10.1.2.99");
        let controller = FieldSyncController::default();

        assert!(controller.on_gateway_changed("abc", &fields).is_empty());
    }

    #[test]
    fn gateway_change_falls_back_to_default_host() {
        let fields = robot("", "");
        let controller = FieldSyncController::default();

        let updates = controller.on_gateway_changed("172.16.0.1", &fields);

        assert_eq!(updates.robot_ip.as_deref(), Some("172.16.0.100"));
    }

    #[test]
    fn subnet_mask_nudges_third_octet() {
        assert_eq!(
            nudge_subnet_mask("255.255.255.0", -1).as_deref(),
            Some("255.255.254.0")
        );
        assert_eq!(
            nudge_subnet_mask("255.255.255.0", 1).as_deref(),
            Some("255.255.255.0")
        );
        assert_eq!(nudge_subnet_mask("255.255", 1), None);
    }
}
