// 点分地址工具
// 只做宽松解析：格式不符时返回 None/false，不报错

/// 将值限制在 [0, 255]
pub fn clamp_octet(value: i64) -> i64 {
    value.clamp(0, 255)
}

/// 对指定段加上 delta 并限幅
/// 返回 (新地址, 是否成功)；失败时原样返回输入
pub fn adjust_octet(address: &str, index: usize, delta: i64) -> (String, bool) {
    let mut parts: Vec<String> = address.split('.').map(str::to_string).collect();
    if parts.len() != 4 || index >= 4 {
        return (address.to_string(), false);
    }

    let Ok(current) = parts[index].trim().parse::<i64>() else {
        return (address.to_string(), false);
    };

    parts[index] = clamp_octet(current.saturating_add(delta)).to_string();
    (parts.join("."), true)
}

/// 前三段加结尾的点，如 "10.1.2.1" -> "10.1.2."
pub fn prefix_of(address: &str) -> Option<String> {
    let parts: Vec<&str> = address.split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    Some(format!("{}.", parts[..3].join(".")))
}

/// 最后一段的文本（要求恰好四段）
pub fn last_part(address: &str) -> Option<&str> {
    let parts: Vec<&str> = address.split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    Some(parts[3])
}

/// 最后一段的数值
pub fn last_octet(address: &str) -> Option<i64> {
    last_part(address)?.trim().parse().ok()
}
