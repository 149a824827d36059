// 界面层调用的引擎入口
// 所有操作返回值或结构化错误，不向调用方抛出未处理的异常
// 调用方负责串行化调用（例如操作期间禁用按钮）

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info};

use crate::deploy::{DeployError, DeploymentResult, DeploymentSession, PushTarget};
use crate::fields::{nudge_subnet_mask, FieldSyncController, FieldUpdates, RobotFields};
use crate::models::{ConfigSnapshot, EngineSettings, FieldMap, Namespace};
use crate::services::{storage, ConfigStore, StoreError};
use crate::ssh::{RusshTransport, Transport};

/// 引擎错误类型
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// 配置引擎
pub struct Configurator {
    settings: EngineSettings,
    store: ConfigStore,
    sync: FieldSyncController,
    deploy: DeploymentSession,
}

impl Configurator {
    /// 从配置目录加载设置并使用 SSH 传输
    /// config_dir 为 None 时使用系统配置目录
    pub fn open(config_dir: Option<&Path>) -> Result<Self> {
        let config_dir: PathBuf = match config_dir {
            Some(dir) => {
                storage::ensure_dir(dir)?;
                dir.to_path_buf()
            }
            None => storage::get_config_dir()?,
        };
        let settings = storage::load_settings(&config_dir)?;
        let snapshot_path = storage::get_snapshot_file(&config_dir, &settings);
        debug!("[Engine] Using config file {:?}", snapshot_path);

        Ok(Self::with_transport(
            settings,
            snapshot_path,
            Arc::new(RusshTransport),
        ))
    }

    pub fn with_transport(
        settings: EngineSettings,
        snapshot_path: impl Into<PathBuf>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let deploy = DeploymentSession::new(
            transport,
            settings.connection.clone(),
            settings.remote.clone(),
        );
        Self {
            store: ConfigStore::new(snapshot_path),
            sync: FieldSyncController::default(),
            deploy,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    /// 当前内存快照
    pub fn snapshot(&self) -> &ConfigSnapshot {
        self.store.snapshot()
    }

    /// 快照中的机器人字段
    pub fn robot_fields(&self) -> RobotFields {
        let snapshot = self.store.snapshot();
        RobotFields {
            robot_number: snapshot.get(Namespace::Robot, "robot_number").to_string(),
            ip: snapshot.get(Namespace::Robot, "ip").to_string(),
        }
    }

    pub fn mirror_enabled(&self) -> bool {
        self.sync.mirror_enabled()
    }

    /// 恢复镜像开关状态，不触发开启时的拉取
    pub fn restore_mirror(&mut self, enabled: bool) {
        self.sync = FieldSyncController::new(enabled);
    }

    // ======================== 持久化 ========================

    pub fn save_namespace(&mut self, ns: Namespace, fields: FieldMap) -> Result<(), EngineError> {
        self.store.save(ns, fields)?;
        Ok(())
    }

    pub fn load_all(&mut self) -> Result<ConfigSnapshot, EngineError> {
        Ok(self.store.load()?.clone())
    }

    // ======================== 派生字段 ========================

    pub fn adjust_identifier(&self, delta: i64, current: &RobotFields) -> FieldUpdates {
        self.sync.on_identifier_step(delta, current)
    }

    pub fn toggle_mirror(&mut self, enabled: bool, current: &RobotFields) -> FieldUpdates {
        self.sync.on_mirror_toggled(enabled, current)
    }

    pub fn on_gateway_edited(&self, gateway: &str, current: &RobotFields) -> FieldUpdates {
        self.sync.on_gateway_changed(gateway, current)
    }

    pub fn nudge_subnet_mask(&self, mask: &str, delta: i64) -> Option<String> {
        nudge_subnet_mask(mask, delta)
    }

    // ======================== 远程操作 ========================

    /// 重新读取持久化快照，取其中的推送目标
    fn persisted_target(&mut self) -> Result<(ConfigSnapshot, PushTarget), EngineError> {
        let snapshot = self.store.load()?.clone();
        let target = PushTarget::from_snapshot(&snapshot);
        Ok((snapshot, target))
    }

    pub async fn push_config(&mut self) -> Result<DeploymentResult, EngineError> {
        let (snapshot, target) = self.persisted_target()?;
        info!("[Engine] Pushing config to {}", target.address);
        Ok(self.deploy.push(&snapshot, &target).await?)
    }

    pub async fn check_connectivity(&mut self) -> Result<String, EngineError> {
        let (_, target) = self.persisted_target()?;
        let connect_timeout = Duration::from_secs(self.settings.connection.connect_timeout_secs);
        Ok(self
            .deploy
            .connect_and_verify(&target, connect_timeout)
            .await?)
    }

    /// 重启设备，调用前需由界面层取得操作员确认
    pub async fn restart(&mut self) -> Result<String, EngineError> {
        let (_, target) = self.persisted_target()?;
        let restart_timeout = Duration::from_secs(self.settings.remote.restart_timeout_secs);
        Ok(self.deploy.restart(&target, restart_timeout).await?)
    }
}
