//! 外部协作者：节点树存储与文档存储

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::model::data_core::EditError;
use crate::model::position::Position;
use crate::model::shadow_tree::Node;
use crate::utils::fs::{read_json_file, write_text_file};

/// 节点树存储：提供选中节点、全部节点，并能从文档文本重建
pub trait TreeStore {
    fn selected_node(&self) -> Option<Node>;

    fn nodes(&self) -> Vec<Node>;

    /// 按位置结构相等查找节点
    fn find_node(&self, position: &Position) -> Option<Node> {
        self.nodes().into_iter().find(|n| &n.position == position)
    }

    fn set_selected_node(&mut self, node: Node);

    /// 发起重建；重建完成（或失败）时通过返回的信号通知
    fn rebuild_from(&mut self, document: &str) -> RebuildSignal;
}

/// 文档存储：整份文档以文本形式保存
pub trait DocumentStore {
    fn text(&self) -> String;

    /// 写入新文本；失败时存储内容保持不变
    fn set_text(&mut self, text: String) -> Result<(), EditError>;
}

/// 重建完成信号的接收端
#[derive(Debug)]
pub struct RebuildSignal {
    rx: Receiver<Result<(), String>>,
}

/// 重建完成信号的发送端，可移交给后台线程
#[derive(Debug)]
pub struct RebuildNotifier {
    tx: Sender<Result<(), String>>,
}

impl RebuildSignal {
    pub fn channel() -> (RebuildNotifier, RebuildSignal) {
        let (tx, rx) = mpsc::channel();
        (RebuildNotifier { tx }, RebuildSignal { rx })
    }

    /// 最多等待 `timeout`
    pub fn wait(self, timeout: Duration) -> Result<(), EditError> {
        match self.rx.recv_timeout(timeout) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(EditError::Rebuild(reason)),
            Err(RecvTimeoutError::Timeout) => Err(EditError::RebuildTimedOut {
                waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            Err(RecvTimeoutError::Disconnected) => {
                Err(EditError::Rebuild("重建通知端已断开".into()))
            }
        }
    }
}

impl RebuildNotifier {
    pub fn complete(self) {
        let _ = self.tx.send(Ok(()));
    }

    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(reason.into()));
    }
}

/// 纯内存文档
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    text: String,
}

impl MemoryDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DocumentStore for MemoryDocument {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) -> Result<(), EditError> {
        self.text = text;
        Ok(())
    }
}

/// 以 JSON 文件为后端的文档；每次写入先落盘，成功后才更新内存文本
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
    text: String,
}

impl FileDocument {
    /// 加载JSON文件，内存中保存规范化（2空格缩进）后的文本
    pub fn open(path: &Path) -> Result<Self, EditError> {
        let value = read_json_file(path)?;
        let text = serde_json::to_string_pretty(&value)?;
        tracing::info!("文档已加载: {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileDocument {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) -> Result<(), EditError> {
        write_text_file(&self.path, &text)?;
        tracing::info!("文档已保存到: {}", self.path.display());
        self.text = text;
        Ok(())
    }
}
