//! # Sheet Cache
//!
//! 把远程表格中的若干工作表抓取下来，规范化后保存为本地 JSON 快照，
//! 供报表/看板离线读取
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `HttpTransport` - 唯一的 reqwest::Client owner，提供 GET 能力
//! - `JsonFileSink` - 原子写入 JSON 快照
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 纯函数，不做 I/O
//! - `envelope_parser` - 从 JSONP 信封中取出文档
//! - `table_normalizer` - 统一成 `{headers, rows}`
//! - `weighted_detector` - 权重工作表的加权列检测
//!
//! ### ③ 流程层（Workflow）
//! - `WorksheetFetcher` - 定义"一个工作表"的完整处理流程
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 按顺序处理所有工作表，隔离失败，写入快照

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, SheetCatalog, SheetEntry, SinkFailurePolicy};
pub use error::{AppError, AppResult, ConfigError, FetchError, SinkError, TransportError};
pub use infrastructure::{
    HttpTransport, JsonFileSink, SheetTransport, SnapshotSink, TransportResponse,
};
pub use models::{CellValue, NormalizedRecord};
pub use orchestrator::{App, BatchOrchestrator, BatchReport, SheetOutcome};
pub use workflow::WorksheetFetcher;
