//! IO helper: safe file read/write for JSON

use std::{fs::File, io::BufReader, path::Path};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::data_core::EditError;

/// 从文件读取并反序列化为任意类型
pub fn read_json_as<T: DeserializeOwned>(p: &Path) -> Result<T, EditError> {
    let f = File::open(p)?;
    let rdr = BufReader::new(f);
    let v: T = serde_json::from_reader(rdr)?;
    Ok(v)
}

/// 从文件读取JSON数据
pub fn read_json_file(p: &Path) -> Result<Value, EditError> {
    read_json_as(p)
}

/// 将已序列化的文档文本写入文件
pub fn write_text_file(p: &Path, text: &str) -> Result<(), EditError> {
    std::fs::write(p, text)?;
    Ok(())
}
