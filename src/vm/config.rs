//! 编辑会话配置

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::model::data_core::EditError;
use crate::utils::fs::read_json_as;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 保存后等待节点树重建的上限（毫秒）
    pub resync_timeout_ms: u64,
    /// 重建后找不到原节点时是否在状态栏提示
    pub notify_on_missing_node: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resync_timeout_ms: 1000,
            notify_on_missing_node: true,
        }
    }
}

impl SessionConfig {
    pub fn resync_timeout(&self) -> Duration {
        Duration::from_millis(self.resync_timeout_ms)
    }

    /// 从JSON文件加载，缺省字段取默认值
    pub fn from_json_file(path: &Path) -> Result<Self, EditError> {
        let config: Self = read_json_as(path)?;
        tracing::debug!("会话配置已加载: {:?}", config);
        Ok(config)
    }
}
