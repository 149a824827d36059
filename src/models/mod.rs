// 数据模型模块

pub mod settings;
pub mod snapshot;

pub use settings::{
    ConnectionSettings, EngineSettings, RemoteSettings, RestartTarget, StorageSettings,
};
pub use snapshot::{ConfigSnapshot, FieldMap, Namespace};
