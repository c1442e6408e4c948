//! 表格查询接口（gviz）响应结构
//!
//! 响应里的每一层描述符都可能缺失或为 `null`，所以全部用 `Option` 表示

use serde::Deserialize;
use serde_json::Value;

/// 信封内的 JSON 文档
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizDocument {
    /// "ok" / "warning" / "error"
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Vec<GvizIssue>,
    #[serde(default)]
    pub table: Option<GvizTable>,
}

/// 接口返回的错误或警告
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizIssue {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detailed_message: Option<String>,
}

impl GvizIssue {
    /// 最有用的一条描述
    pub fn describe(&self) -> String {
        self.detailed_message
            .as_deref()
            .or(self.message.as_deref())
            .or(self.reason.as_deref())
            .unwrap_or("unknown error")
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizTable {
    #[serde(default)]
    pub cols: Option<Vec<Option<GvizColumn>>>,
    #[serde(default)]
    pub rows: Option<Vec<Option<GvizRow>>>,
}

/// 列描述符
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizColumn {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// 行描述符
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizRow {
    #[serde(default)]
    pub c: Option<Vec<Option<GvizCell>>>,
}

/// 单元格描述符；`f` 是格式化后的显示文本，这里不使用
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizCell {
    #[serde(default)]
    pub v: Option<Value>,
    #[serde(default)]
    pub f: Option<String>,
}
