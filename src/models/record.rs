use serde::{Deserialize, Serialize};

use super::CellValue;

/// 一个工作表的规范化快照
///
/// 字段顺序即输出 JSON 的字段顺序：`headers`、`rows`、`weightedColumns`。
/// `weighted_columns` 的长度始终等于 `headers` 的长度；行不做补齐或截断。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    #[serde(rename = "weightedColumns")]
    pub weighted_columns: Vec<bool>,
}

impl NormalizedRecord {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
