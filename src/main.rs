use anyhow::{bail, Result};
use sheet_cache::utils::logging;
use sheet_cache::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config.clone()).await?;
    let report = app.run().await;

    if report.aborted {
        bail!("批次已中止，未处理: {}", report.skipped.join(", "));
    }
    if config.fail_on_partial && report.has_failures() {
        bail!("{} 个工作表抓取失败", report.failed().len());
    }

    Ok(())
}
