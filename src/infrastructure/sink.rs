//! 快照写入 - 基础设施层
//!
//! 只负责"把一条记录写到某个文件名下"，不关心抓取流程

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::SinkError;
use crate::models::NormalizedRecord;

/// 快照输出能力
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// 在任何写入之前调用一次（例如创建输出目录）
    async fn prepare(&self) -> Result<(), SinkError>;

    /// 写入一条记录，覆盖同名文件，返回写入位置
    async fn write(&self, filename: &str, record: &NormalizedRecord) -> Result<PathBuf, SinkError>;
}

/// 把记录写成格式化 JSON 文件
///
/// 先写同目录下的临时文件再重命名，写到一半失败时旧文件保持不变
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    output_dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 记录序列化后的文本（两个空格缩进，没有结尾换行）
    pub fn render(filename: &str, record: &NormalizedRecord) -> Result<String, SinkError> {
        serde_json::to_string_pretty(record).map_err(|source| SinkError::Serialize {
            filename: filename.to_string(),
            source,
        })
    }
}

#[async_trait]
impl SnapshotSink for JsonFileSink {
    async fn prepare(&self) -> Result<(), SinkError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| SinkError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })
    }

    async fn write(&self, filename: &str, record: &NormalizedRecord) -> Result<PathBuf, SinkError> {
        let content = Self::render(filename, record)?;
        let path = self.output_dir.join(filename);

        atomic_write(&self.output_dir, &path, content.as_bytes()).map_err(|source| {
            SinkError::Write {
                path: path.clone(),
                source,
            }
        })?;

        debug!("写入 {} ({} 字节)", path.display(), content.len());
        Ok(path)
    }
}

fn atomic_write(dir: &Path, dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
