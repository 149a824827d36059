// 本地数据持久化服务

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::EngineSettings;

/// 应用目录名
const APP_DIR_NAME: &str = "robot-configurator";

/// 获取配置目录路径
/// macOS: ~/Library/Application Support/robot-configurator
/// Linux: ~/.config/robot-configurator
/// Windows: C:\Users\<用户名>\AppData\Roaming\robot-configurator
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("无法获取系统配置目录")?
        .join(APP_DIR_NAME);
    ensure_dir(&config_dir)?;
    Ok(config_dir)
}

/// 确保目录存在
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).context("无法创建配置目录")?;
    }
    Ok(())
}

// ======================== Settings 配置持久化 ========================

/// 获取设置配置文件路径
pub fn get_settings_file(config_dir: &Path) -> PathBuf {
    config_dir.join("settings.json")
}

/// 加载引擎设置，文件不存在时返回默认值
pub fn load_settings(config_dir: &Path) -> Result<EngineSettings> {
    let path = get_settings_file(config_dir);
    if !path.exists() {
        return Ok(EngineSettings::default());
    }
    let content = fs::read_to_string(&path).context("无法读取设置配置文件")?;
    let settings: EngineSettings =
        serde_json::from_str(&content).context("无法解析设置配置文件")?;
    Ok(settings)
}

// ======================== 配置快照文件 ========================

/// 获取配置快照文件路径（设置中可覆盖）
pub fn get_snapshot_file(config_dir: &Path, settings: &EngineSettings) -> PathBuf {
    settings
        .storage
        .snapshot_file
        .clone()
        .unwrap_or_else(|| config_dir.join("robot_config.json"))
}
