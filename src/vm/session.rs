//! 编辑会话：查看 / 编辑 两态状态机，负责保存与保存后的节点重新同步

use crate::model::collapse::collapse_fields;
use crate::model::data_core::{apply_edit, EditError};
use crate::model::position::{format_path, Position};
use crate::model::shadow_tree::Node;
use crate::model::store::{DocumentStore, TreeStore};
use crate::vm::bridge::*;
use crate::vm::config::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Viewing,
    Editing,
}

/// 一次保存的结果；失败不会越过保存动作的边界
#[derive(Debug)]
pub enum SaveOutcome {
    /// 已写回文档；`resynced` 表示是否在重建后的树中找回了同一位置的节点
    Saved { resynced: bool },
    /// 写回被拒绝，文档未改动，会话仍处于编辑态
    Rejected(EditError),
    /// 不在编辑态，什么也没做
    NotEditing,
}

#[derive(Debug)]
pub struct EditSession {
    config: SessionConfig,
    baseline: Option<Node>,
    buffer: String,
    mode: SessionMode,
    status: String,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl EditSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            baseline: None,
            buffer: collapse_fields(&[]),
            mode: SessionMode::Viewing,
            status: STATUS_READY.to_string(),
        }
    }

    /// 打开对话框：以树中当前选中的节点为基线
    pub fn open<T: TreeStore + ?Sized>(&mut self, tree: &T) {
        self.load_node(tree.selected_node());
    }

    /// 选中节点变化：重置基线与编辑缓冲区，回到查看态
    pub fn load_node(&mut self, node: Option<Node>) {
        self.baseline = node;
        self.buffer = self.collapsed_text();
        self.mode = SessionMode::Viewing;
        self.status = STATUS_READY.to_string();
        tracing::debug!("加载节点: {}", self.path_text());
    }

    pub fn begin_edit(&mut self) {
        if self.mode == SessionMode::Viewing {
            self.mode = SessionMode::Editing;
            self.status = STATUS_EDITING.to_string();
            tracing::debug!("开始编辑: {}", self.path_text());
        }
    }

    /// 用户输入；只在编辑态生效
    pub fn set_buffer(&mut self, text: impl Into<String>) -> bool {
        if self.mode != SessionMode::Editing {
            return false;
        }
        self.buffer = text.into();
        true
    }

    /// 放弃修改，缓冲区恢复为基线文本
    pub fn cancel(&mut self) {
        if self.mode == SessionMode::Editing {
            self.mode = SessionMode::Viewing;
            self.buffer = self.collapsed_text();
            self.status = STATUS_CANCELLED.to_string();
            tracing::debug!("取消编辑: {}", self.path_text());
        }
    }

    /// 保存：写回文档、请求重建节点树，并在重建完成后重新载入同一位置的节点
    pub fn save<D, T>(&mut self, document: &mut D, tree: &mut T) -> SaveOutcome
    where
        D: DocumentStore + ?Sized,
        T: TreeStore + ?Sized,
    {
        if self.mode != SessionMode::Editing {
            return SaveOutcome::NotEditing;
        }

        let position = self.position();
        let updated = match self.commit(document, &position) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("回写失败 {}: {}", format_path(&position), e);
                self.status = format!("{}{}", STATUS_ERROR_PREFIX, e);
                return SaveOutcome::Rejected(e);
            }
        };
        tracing::info!("回写成功: {}，文档长度: {} 字符", format_path(&position), updated.len());

        let resynced = self.resync(tree, &position, &updated);
        self.mode = SessionMode::Viewing;
        SaveOutcome::Saved { resynced }
    }

    fn commit<D: DocumentStore + ?Sized>(
        &self,
        document: &mut D,
        position: &Position,
    ) -> Result<String, EditError> {
        let updated = apply_edit(&document.text(), position, &self.buffer)?;
        document.set_text(updated.clone())?;
        Ok(updated)
    }

    fn resync<T: TreeStore + ?Sized>(&mut self, tree: &mut T, position: &Position, document: &str) -> bool {
        let signal = tree.rebuild_from(document);
        if let Err(e) = signal.wait(self.config.resync_timeout()) {
            // 基线保持旧数据
            tracing::warn!("节点树未完成重建，跳过同步: {}", e);
            self.status = STATUS_WRITE_BACK_STALE.to_string();
            return false;
        }

        match tree.find_node(position) {
            Some(node) => {
                self.buffer = collapse_fields(&node.fields);
                tree.set_selected_node(node.clone());
                self.baseline = Some(node);
                self.status = STATUS_WRITE_BACK_SUCCESS.to_string();
                true
            }
            None => {
                tracing::warn!("重建后未找到节点: {}", format_path(position));
                self.status = if self.config.notify_on_missing_node {
                    STATUS_NODE_MISSING
                } else {
                    STATUS_WRITE_BACK_SUCCESS
                }
                .to_string();
                false
            }
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == SessionMode::Editing
    }

    pub fn baseline(&self) -> Option<&Node> {
        self.baseline.as_ref()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// 基线的位置；没有基线时视为文档根
    pub fn position(&self) -> Position {
        self.baseline
            .as_ref()
            .map(|n| n.position.clone())
            .unwrap_or_default()
    }

    /// 基线折叠后的只读文本
    pub fn collapsed_text(&self) -> String {
        let fields = self
            .baseline
            .as_ref()
            .map(|n| n.fields.as_slice())
            .unwrap_or_default();
        collapse_fields(fields)
    }

    pub fn path_text(&self) -> String {
        format_path(&self.position())
    }

    pub fn view(&self) -> NodeDialogView {
        let content = match self.mode {
            SessionMode::Viewing => self.collapsed_text(),
            SessionMode::Editing => self.buffer.clone(),
        };
        NodeDialogView {
            content,
            path: self.path_text(),
            editing: self.is_editing(),
            status: self.status.clone(),
        }
    }
}
