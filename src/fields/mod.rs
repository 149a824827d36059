// 字段工具与派生字段同步

pub mod address;
pub mod sync;

pub use address::{adjust_octet, clamp_octet, prefix_of};
pub use sync::{nudge_subnet_mask, FieldSyncController, FieldUpdates, RobotFields};
