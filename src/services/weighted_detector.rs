//! 加权列检测 - 业务能力层
//!
//! 只有指定的权重工作表会检查第一行数据，其它工作表一律返回全 false

use crate::config::Config;
use crate::models::CellValue;

/// 加权列检测器
#[derive(Debug, Clone)]
pub struct WeightedColumnDetector {
    weights_sheet: String,
    marker: String,
}

impl WeightedColumnDetector {
    /// 创建检测器，标记按小写比较
    pub fn new(weights_sheet: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            weights_sheet: weights_sheet.into(),
            marker: marker.into().to_lowercase(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.weights_sheet, &config.weighted_marker)
    }

    /// 计算每一列是否为加权列
    ///
    /// 返回值长度总是等于 `headers.len()`：第一行比表头短时多出的位置为 false，
    /// 比表头长时多出的单元格不参与计算。
    pub fn detect(&self, sheet: &str, headers: &[String], rows: &[Vec<CellValue>]) -> Vec<bool> {
        if sheet != self.weights_sheet {
            return vec![false; headers.len()];
        }

        let first_row: &[CellValue] = rows.first().map(Vec::as_slice).unwrap_or_default();

        (0..headers.len())
            .map(|idx| first_row.get(idx).is_some_and(|cell| self.is_marked(cell)))
            .collect()
    }

    /// 数字、布尔永远不匹配
    fn is_marked(&self, cell: &CellValue) -> bool {
        cell.as_str()
            .is_some_and(|text| text.to_lowercase().contains(&self.marker))
    }
}

impl Default for WeightedColumnDetector {
    fn default() -> Self {
        Self::new("weights", "weighted")
    }
}
