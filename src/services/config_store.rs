// 配置快照存储
// 内存中持有唯一的 ConfigSnapshot，save/load 是仅有的修改入口

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{ConfigSnapshot, FieldMap, Namespace};

/// 存储错误类型
#[derive(Debug, Error)]
pub enum StoreError {
    /// 文件读写失败
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 文件内容不是合法的配置快照
    #[error("Config file {path} is malformed: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 序列化失败
    #[error("Failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

/// 命名空间配置存储
pub struct ConfigStore {
    path: PathBuf,
    snapshot: ConfigSnapshot,
}

impl ConfigStore {
    /// 创建存储，初始快照为空
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: ConfigSnapshot::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 当前内存快照
    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }

    /// 替换一个命名空间并写出完整快照
    /// 写入失败时内存快照已更新但未持久化，调用方可重试
    pub fn save(&mut self, ns: Namespace, fields: FieldMap) -> Result<(), StoreError> {
        self.snapshot.replace(ns, fields);
        self.persist()?;
        info!("[Store] Saved namespace '{}' to {:?}", ns, self.path);
        Ok(())
    }

    /// 从磁盘重新读取完整快照
    /// 文件不存在时保持当前内存快照不变
    pub fn load(&mut self) -> Result<&ConfigSnapshot, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("[Store] No config file at {:?}, keeping memory", self.path);
                return Ok(&self.snapshot);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let snapshot: ConfigSnapshot =
            serde_json::from_str(&content).map_err(|source| StoreError::Decode {
                path: self.path.clone(),
                source,
            })?;
        self.snapshot = snapshot;
        debug!("[Store] Loaded config from {:?}", self.path);
        Ok(&self.snapshot)
    }

    /// 写入临时文件后原子替换目标文件
    fn persist(&self) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(&self.snapshot)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}
