//! 表格规范化 - 业务能力层
//!
//! 把 gviz 的列/行描述符转成统一的 `{headers, rows}`，保持原有顺序

use crate::models::{CellValue, GvizCell, GvizColumn, GvizRow, GvizTable};

/// 规范化后的表头和行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// 规范化整张表
pub fn normalize_table(table: &GvizTable) -> NormalizedTable {
    let headers = table
        .cols
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(normalize_header)
        .collect();

    let rows = table
        .rows
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(normalize_row)
        .collect();

    NormalizedTable { headers, rows }
}

/// 列描述符或 label 缺失时为空字符串
fn normalize_header(col: &Option<GvizColumn>) -> String {
    col.as_ref()
        .and_then(|c| c.label.clone())
        .unwrap_or_default()
}

fn normalize_row(row: &Option<GvizRow>) -> Vec<CellValue> {
    row.as_ref()
        .and_then(|r| r.c.as_deref())
        .unwrap_or_default()
        .iter()
        .map(normalize_cell)
        .collect()
}

fn normalize_cell(cell: &Option<GvizCell>) -> CellValue {
    let value = cell
        .as_ref()
        .and_then(|c| c.v.clone())
        .and_then(CellValue::from_json);
    CellValue::coerce(value)
}
