//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理整个工作表列表，写入快照)
//!     ↓
//! workflow::WorksheetFetcher (处理单个工作表)
//!     ↓
//! services (能力层：信封解析 / 表格规范化 / 加权列检测)
//!     ↓
//! infrastructure (基础设施：HTTP 传输 / 快照写入)
//! ```
//!
//! ## 设计原则
//!
//! 1. **失败隔离**：单个工作表的错误只进入报告，不会中断批次
//! 2. **资源隔离**：只有编排层同时持有传输和写入端
//! 3. **无业务逻辑**：只做调度和统计，不做解析判断

pub mod batch_processor;

// 重新导出主要类型
pub use batch_processor::{App, BatchOrchestrator, BatchReport, SheetOutcome};
