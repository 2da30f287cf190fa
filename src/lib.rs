//! JSON节点编辑核心库
//!
//! 提供节点行折叠、JSON路径格式化、按路径回写文档以及编辑会话状态机，
//! 遵循MVVM架构模式：model 负责数据变换，vm 负责会话编排与界面投影

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::collapse::collapse_fields;
pub use model::data_core::{apply_edit, query_path, EditError};
pub use model::position::{format_path, PathSegment, Position};
pub use model::shadow_tree::{build_shadow_tree, Field, Node, NodeKind, ShadowTree};
pub use model::store::{
    DocumentStore, FileDocument, MemoryDocument, RebuildNotifier, RebuildSignal, TreeStore,
};
pub use vm::bridge::NodeDialogView;
pub use vm::config::SessionConfig;
pub use vm::session::{EditSession, SaveOutcome, SessionMode};
