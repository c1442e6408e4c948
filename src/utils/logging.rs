/// 日志工具模块
///
/// 提供日志初始化和批次统计输出的辅助函数
use std::path::Path;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::orchestrator::BatchReport;

/// 初始化日志
///
/// 优先使用 RUST_LOG，其次根据 verbose 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试里可能被初始化多次，忽略重复初始化
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, sheet_count: usize) {
    info!("{}", "=".repeat(60));
    info!("🔄 正在抓取最新的表格数据...");
    info!("📄 文档: {}", config.document_id);
    info!("📋 工作表数量: {}", sheet_count);
    info!("📁 输出目录: {}", config.output_dir.display());
    if config.max_concurrent_sheets > 1 {
        info!("📊 最大并发数: {}", config.max_concurrent_sheets);
    }
    info!("{}", "=".repeat(60));
}

/// 记录单个工作表保存成功
pub fn log_sheet_saved(sheet: &str, rows: usize, filename: &str) {
    info!("✅ {}: {} 行", sheet, rows);
    info!("📁 已保存: {}", filename);
}

/// 记录单个工作表失败
pub fn log_sheet_failed(sheet: &str, reason: &dyn std::fmt::Display) {
    error!("❌ 抓取 {} 失败: {}", sheet, reason);
    warn!("⚠️ 跳过 {}，继续处理其它工作表...", sheet);
}

/// 记录单个工作表写入失败
pub fn log_sheet_write_failed(sheet: &str, filename: &str, reason: &dyn std::fmt::Display) {
    error!("{}", write_failure_message(sheet, filename, reason));
    warn!("⚠️ {} 保留上一次的快照", filename);
}

/// 打印最终统计信息
pub fn print_final_stats(report: &BatchReport, output_dir: &Path) {
    info!("\n{}", "=".repeat(60));
    if report.aborted {
        warn!("⛔ 写入失败，批次已中止");
    } else {
        info!("✅ 缓存更新完成!");
    }
    info!("📊 已缓存工作表: {}", succeeded_line(report));
    info!("📄 已保存文件: {}", report.saved_files().len());
    for file in report.saved_files() {
        info!("   • {}", output_dir.join(file).display());
    }
    let failed = failed_lines(report);
    if !failed.is_empty() {
        warn!("❌ 失败: {}", failed.len());
        for line in failed {
            warn!("   • {}", line);
        }
    }
    if !report.skipped.is_empty() {
        warn!("⏭️ 未处理: {}", report.skipped.join(", "));
    }
    info!("🕒 时间: {}", chrono::Utc::now().to_rfc3339());
    info!("{}", "=".repeat(60));
}

fn write_failure_message(sheet: &str, filename: &str, reason: &dyn std::fmt::Display) -> String {
    format!("❌ 写入 {} ({}) 失败: {}", filename, sheet, reason)
}

/// "数量 (工作表, ...)"
fn succeeded_line(report: &BatchReport) -> String {
    let succeeded = report.succeeded();
    if succeeded.is_empty() {
        "0".to_string()
    } else {
        format!("{} ({})", succeeded.len(), succeeded.join(", "))
    }
}

/// 每个失败工作表一行："工作表: 原因"
fn failed_lines(report: &BatchReport) -> Vec<String> {
    report
        .failed()
        .into_iter()
        .map(|(sheet, reason)| format!("{}: {}", sheet, reason))
        .collect()
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
