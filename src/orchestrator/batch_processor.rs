//! 批量工作表处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、创建 HTTP 传输、准备输出目录
//! 2. **按顺序处理**：按配置顺序逐个抓取工作表，默认一次只抓一个
//! 3. **失败隔离**：单个工作表失败只记录，不影响其它工作表
//! 4. **写入快照**：成功的记录写到映射好的文件名下
//! 5. **全局统计**：汇总成功/失败/未处理的工作表
//!
//! ## 并发
//!
//! `max_concurrent_sheets > 1` 时同时抓取多个工作表，但结果仍按列表顺序返回、
//! 按顺序写入，每个结果总是写到自己的文件名下。

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::error;

use crate::config::{Config, SheetCatalog, SheetEntry, SinkFailurePolicy};
use crate::error::AppError;
use crate::infrastructure::{HttpTransport, JsonFileSink, SheetTransport, SnapshotSink};
use crate::models::NormalizedRecord;
use crate::utils::logging::{
    log_sheet_failed, log_sheet_saved, log_sheet_write_failed, log_startup, print_final_stats,
};
use crate::workflow::WorksheetFetcher;

/// 单个工作表的处理结果
#[derive(Debug)]
pub enum SheetOutcome {
    /// 抓取并写入成功
    Saved {
        sheet: String,
        filename: String,
        path: PathBuf,
        rows: usize,
    },
    /// 抓取或写入失败
    Failed { sheet: String, error: AppError },
}

impl SheetOutcome {
    pub fn sheet(&self) -> &str {
        match self {
            SheetOutcome::Saved { sheet, .. } | SheetOutcome::Failed { sheet, .. } => sheet,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, SheetOutcome::Saved { .. })
    }
}

/// 批次处理结果
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 每个已处理工作表的结果（按列表顺序）
    pub outcomes: Vec<SheetOutcome>,
    /// 成功的工作表 → 记录；失败的工作表不在其中
    pub records: BTreeMap<String, NormalizedRecord>,
    /// 因中止而未处理的工作表
    pub skipped: Vec<String>,
    /// 是否因写入失败而中止
    pub aborted: bool,
}

impl BatchReport {
    /// 成功的工作表
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_saved())
            .map(SheetOutcome::sheet)
            .collect()
    }

    /// 失败的工作表及原因
    pub fn failed(&self) -> Vec<(&str, &AppError)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SheetOutcome::Failed { sheet, error } => Some((sheet.as_str(), error)),
                SheetOutcome::Saved { .. } => None,
            })
            .collect()
    }

    /// 已保存的文件名
    pub fn saved_files(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SheetOutcome::Saved { filename, .. } => Some(filename.as_str()),
                SheetOutcome::Failed { .. } => None,
            })
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_saved())
    }

    /// 列表是否全部处理完（不论成功与否）
    pub fn is_complete(&self) -> bool {
        !self.aborted
    }

    fn push_saved(&mut self, entry: &SheetEntry, path: PathBuf, record: NormalizedRecord) {
        self.outcomes.push(SheetOutcome::Saved {
            sheet: entry.sheet.clone(),
            filename: entry.filename.clone(),
            path,
            rows: record.row_count(),
        });
        self.records.insert(entry.sheet.clone(), record);
    }

    fn push_failed(&mut self, entry: &SheetEntry, error: AppError) {
        self.outcomes.push(SheetOutcome::Failed {
            sheet: entry.sheet.clone(),
            error,
        });
    }
}

/// 批量编排器
///
/// 只做调度和统计，具体抓取交给 [`WorksheetFetcher`]，写入交给 [`SnapshotSink`]
pub struct BatchOrchestrator<T, S> {
    fetcher: WorksheetFetcher<T>,
    sink: S,
    catalog: SheetCatalog,
    sink_failure_policy: SinkFailurePolicy,
    max_concurrent: usize,
}

impl<T: SheetTransport, S: SnapshotSink> BatchOrchestrator<T, S> {
    /// 创建编排器：顺序处理，写入失败继续
    pub fn new(fetcher: WorksheetFetcher<T>, sink: S, catalog: SheetCatalog) -> Self {
        Self {
            fetcher,
            sink,
            catalog,
            sink_failure_policy: SinkFailurePolicy::Continue,
            max_concurrent: 1,
        }
    }

    pub fn with_sink_failure_policy(mut self, policy: SinkFailurePolicy) -> Self {
        self.sink_failure_policy = policy;
        self
    }

    /// 设置同时抓取的工作表数量（至少为 1）
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 处理整个列表
    ///
    /// 永远不会失败：每个工作表的错误都记录在报告里
    pub async fn run(&self) -> BatchReport {
        let entries = self.catalog.entries();
        let mut report = BatchReport::default();
        let mut processed = 0;

        let mut fetches = stream::iter(entries)
            .map(|entry| async move { (entry, self.fetcher.fetch(&entry.sheet).await) })
            .buffered(self.max_concurrent);

        while let Some((entry, result)) = fetches.next().await {
            processed += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    log_sheet_failed(&entry.sheet, &e);
                    report.push_failed(entry, e.into());
                    continue;
                }
            };

            match self.sink.write(&entry.filename, &record).await {
                Ok(path) => {
                    log_sheet_saved(&entry.sheet, record.row_count(), &entry.filename);
                    report.push_saved(entry, path, record);
                }
                Err(e) => {
                    log_sheet_write_failed(&entry.sheet, &entry.filename, &e);
                    report.push_failed(entry, e.into());

                    if self.sink_failure_policy == SinkFailurePolicy::Abort {
                        error!("⛔ 写入 {} 失败，停止处理剩余工作表", entry.filename);
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        if report.aborted {
            report.skipped = entries[processed..]
                .iter()
                .map(|e| e.sheet.clone())
                .collect();
        }

        report
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: BatchOrchestrator<HttpTransport, JsonFileSink>,
}

impl App {
    /// 初始化应用
    ///
    /// 配置不合法或输出目录无法创建时返回错误，此时不会发出任何请求
    pub async fn initialize(config: Config) -> Result<Self> {
        let catalog = config.validate().map_err(AppError::from)?;

        log_startup(&config, catalog.len());

        let transport = HttpTransport::new(&config).context("无法创建 HTTP 客户端")?;
        let sink = JsonFileSink::new(&config.output_dir);
        sink.prepare().await.map_err(AppError::from)?;

        let fetcher = WorksheetFetcher::from_config(transport, &config).map_err(AppError::from)?;
        let orchestrator = BatchOrchestrator::new(fetcher, sink, catalog)
            .with_sink_failure_policy(config.sink_failure_policy)
            .with_max_concurrent(config.max_concurrent_sheets);

        Ok(Self {
            config,
            orchestrator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> BatchReport {
        let report = self.orchestrator.run().await;

        // 输出最终统计
        print_final_stats(&report, &self.config.output_dir);

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[tokio::test]
    async fn test_initialize_rejects_invalid_config() {
        let config = Config {
            worksheets: Vec::new(),
            ..Config::default()
        };
        assert!(App::initialize(config).await.is_err());
    }

    #[tokio::test]
    async fn test_initialize_rejects_bad_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cached-data");
        let config = Config {
            base_url: "not a url".to_string(),
            output_dir: out.clone(),
            ..Config::default()
        };

        let err = App::initialize(config).await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Config(ConfigError::InvalidBaseUrl { .. }))
        ));
        // 配置错误在启动时发现，不会创建输出目录
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_initialize_fails_when_output_dir_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();

        let config = Config {
            output_dir: blocker.join("cached-data"),
            ..Config::default()
        };
        let err = App::initialize(config).await.err().unwrap();
        assert!(err.to_string().contains("无法创建输出目录"));
    }

    #[tokio::test]
    async fn test_initialize_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public").join("cached-data");

        let config = Config {
            output_dir: out.clone(),
            ..Config::default()
        };
        let app = App::initialize(config).await.unwrap();

        assert!(out.is_dir());
        assert_eq!(app.config().output_dir, out);
    }
}
