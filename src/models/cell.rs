//! 单元格取值
//!
//! 表格单元格只会是字符串、数字、布尔或缺失。缺失统一在 [`CellValue::coerce`] 里转成空字符串。

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// 超过这个范围的整数在 f64 中无法精确表示
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// 单元格的值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Number(Number),
    Bool(bool),
}

impl CellValue {
    /// 缺失的单元格 → 空字符串
    pub fn coerce(value: Option<CellValue>) -> CellValue {
        value.unwrap_or_else(CellValue::empty)
    }

    /// 空字符串
    pub fn empty() -> CellValue {
        CellValue::String(String::new())
    }

    /// 从原始 JSON 值转换，`null` 视为缺失
    ///
    /// 数组和对象不会出现在表格响应里，遇到时按 JSON 文本保存
    pub fn from_json(value: Value) -> Option<CellValue> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(CellValue::String(s)),
            Value::Number(n) => Some(CellValue::Number(normalize_number(n))),
            Value::Bool(b) => Some(CellValue::Bool(b)),
            other => Some(CellValue::String(other.to_string())),
        }
    }

    /// 字符串单元格的文本，其它类型返回 None
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n.into())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// 表格把所有数字都写成浮点（`42.0`），整数值转回整数
fn normalize_number(n: Number) -> Number {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
                return Number::from(f as i64);
            }
        }
    }
    n
}
