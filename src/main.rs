//! 程序入口：初始化日志，对文件中的一个节点执行 打开 → 编辑 → 保存

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::fmt::SubscriberBuilder;

use json_node_editor::{
    query_path, DocumentStore, EditSession, FileDocument, NodeDialogView, Position, SaveOutcome,
    SessionConfig, ShadowTree,
};

#[derive(Debug, Parser)]
#[command(
    name = "json_node_editor",
    version,
    about = "Edit one node of a JSON document and write it back in place"
)]
struct Cli {
    /// JSON document to edit
    file: PathBuf,

    /// Node position as a JSON array, e.g. '["items", 2]' ('[]' is the root)
    position: String,

    /// Replacement value as JSON text
    replacement: String,

    /// Session config file (JSON)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志输出，写到 stderr，stdout 只留给视图
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let _ = SubscriberBuilder::default()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// 返回保存是否成功
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = match &cli.config {
        Some(path) => SessionConfig::from_json_file(path)
            .with_context(|| format!("读取配置失败: {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let position: Position =
        serde_json::from_str(&cli.position).context("节点位置必须是由字符串和非负整数组成的JSON数组")?;

    let start_time = Instant::now();
    let mut document = FileDocument::open(&cli.file)
        .with_context(|| format!("加载文件失败: {}", cli.file.display()))?;
    let mut tree = ShadowTree::from_document(&document.text())?;
    tracing::info!(
        "文件加载成功: {} 个节点，耗时: {:.1}ms",
        tree.len(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );

    let mut session = EditSession::new(config);
    if tree.select(&position) {
        session.open(&tree);
    } else if position.is_root() {
        // 根是数组时没有对应节点，仍可整体替换
        session.load_node(None);
    } else {
        anyhow::bail!("未找到节点: {}", position);
    }
    print_view(&session.view())?;

    session.begin_edit();
    session.set_buffer(cli.replacement.clone());

    let save_start = Instant::now();
    let outcome = session.save(&mut document, &mut tree);
    tracing::info!(
        "保存耗时: {:.1}ms",
        save_start.elapsed().as_secs_f64() * 1000.0
    );
    print_view(&session.view())?;

    match outcome {
        SaveOutcome::Saved { .. } => {
            match query_path(&document.text(), &session.path_text()) {
                Ok(value) => tracing::info!("路径 {} 的当前值: {}", session.path_text(), value),
                Err(e) => tracing::warn!("按路径读取失败: {}", e),
            }
            Ok(true)
        }
        SaveOutcome::Rejected(e) => {
            eprintln!("{}", e);
            Ok(false)
        }
        SaveOutcome::NotEditing => Ok(false),
    }
}

fn print_view(view: &NodeDialogView) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}
