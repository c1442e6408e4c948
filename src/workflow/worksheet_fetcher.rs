//! 工作表抓取流程 - 流程层
//!
//! 定义"一个工作表"的完整处理流程：
//! 1. 拼地址（带时间戳）→ GET
//! 2. 检查状态码
//! 3. 信封解析 → 表格规范化 → 加权列检测
//!
//! 不重试、不缓存；超时由传输层配置决定

use tracing::{debug, info};

use crate::clients::GvizClient;
use crate::config::Config;
use crate::error::{ConfigError, FetchError, TransportError};
use crate::infrastructure::SheetTransport;
use crate::models::NormalizedRecord;
use crate::services::envelope_parser::parse_envelope;
use crate::services::table_normalizer::normalize_table;
use crate::services::WeightedColumnDetector;
use crate::utils::logging::truncate_text;

/// 工作表抓取器
///
/// - 不持有除传输以外的任何资源
/// - 每次调用互不影响，可以并发调用
pub struct WorksheetFetcher<T> {
    transport: T,
    client: GvizClient,
    detector: WeightedColumnDetector,
}

impl<T: SheetTransport> WorksheetFetcher<T> {
    pub fn new(transport: T, client: GvizClient, detector: WeightedColumnDetector) -> Self {
        Self {
            transport,
            client,
            detector,
        }
    }

    /// 使用配置创建
    pub fn from_config(transport: T, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            transport,
            GvizClient::from_config(config)?,
            WeightedColumnDetector::from_config(config),
        ))
    }

    /// 抓取工作表，时间戳取当前时间
    pub async fn fetch(&self, sheet: &str) -> Result<NormalizedRecord, FetchError> {
        self.fetch_at(sheet, chrono::Utc::now().timestamp_millis()).await
    }

    /// 使用指定时间戳抓取工作表
    ///
    /// 时间戳只出现在请求地址里，不会写入记录
    pub async fn fetch_at(
        &self,
        sheet: &str,
        timestamp_ms: i64,
    ) -> Result<NormalizedRecord, FetchError> {
        info!("📥 正在抓取 {}...", sheet);

        let url = self.client.build_url(sheet, timestamp_ms);

        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|source| FetchError::Transport {
                sheet: sheet.to_string(),
                source,
            })?;

        if !response.is_success() {
            return Err(FetchError::Transport {
                sheet: sheet.to_string(),
                source: TransportError::Status {
                    status: response.status_text,
                },
            });
        }

        debug!(
            "{} 响应 ({} 字节): {}",
            sheet,
            response.body.len(),
            truncate_text(&response.body, 120)
        );

        let document = parse_envelope(&response.body).map_err(|e| e.for_sheet(sheet))?;
        let table = document.table.ok_or_else(|| FetchError::EmptyWorksheet {
            sheet: sheet.to_string(),
        })?;

        let normalized = normalize_table(&table);
        let weighted_columns = self
            .detector
            .detect(sheet, &normalized.headers, &normalized.rows);

        Ok(NormalizedRecord {
            headers: normalized.headers,
            rows: normalized.rows,
            weighted_columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::TransportResponse;
    use async_trait::async_trait;
    use reqwest::Url;
    use std::sync::Mutex;

    /// 返回固定响应并记录请求地址，没有响应时按无法访问处理
    struct FixedTransport {
        response: Option<TransportResponse>,
        requested: Mutex<Vec<String>>,
    }

    impl FixedTransport {
        fn ok(body: &str) -> Self {
            Self::status(200, "200 OK", body)
        }

        fn status(status: u16, status_text: &str, body: &str) -> Self {
            Self {
                response: Some(TransportResponse {
                    status,
                    status_text: status_text.to_string(),
                    body: body.to_string(),
                }),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SheetTransport for FixedTransport {
        async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.response
                .clone()
                .ok_or_else(|| TransportError::Unreachable {
                    url: url.to_string(),
                })
        }
    }

    fn fetcher(transport: FixedTransport) -> WorksheetFetcher<FixedTransport> {
        WorksheetFetcher::from_config(transport, &Config::default()).unwrap()
    }

    const WEIGHTS_BODY: &str = r#"/*O_o*/
google.visualization.Query.setResponse({"status":"ok","table":{"cols":[{"label":"Metric"},{"label":"Score"},{"label":"Raw"},{"label":"Count"}],"rows":[{"c":[{"v":"Metric"},{"v":"Weighted Score"},{"v":"Raw"},{"v":42.0}]},{"c":[{"v":"Reach"},{"v":0.4},null,{"v":7.0}]}]}});"#;

    #[tokio::test]
    async fn test_fetch_weights_sheet() {
        let fetcher = fetcher(FixedTransport::ok(WEIGHTS_BODY));
        let record = fetcher.fetch_at("weights", 1_000).await.unwrap();

        assert_eq!(record.headers, vec!["Metric", "Score", "Raw", "Count"]);
        assert_eq!(record.rows.len(), 2);
        assert_eq!(record.weighted_columns, vec![false, true, false, false]);
        assert_eq!(
            serde_json::to_value(&record.rows[1]).unwrap(),
            serde_json::json!(["Reach", 0.4, "", 7])
        );
    }

    #[tokio::test]
    async fn test_fetch_other_sheet_is_not_weighted() {
        let fetcher = fetcher(FixedTransport::ok(WEIGHTS_BODY));
        let record = fetcher.fetch_at("output_UK", 1_000).await.unwrap();

        assert_eq!(record.weighted_columns, vec![false; 4]);
    }

    #[tokio::test]
    async fn test_request_url_carries_timestamp() {
        let fetcher = fetcher(FixedTransport::ok(WEIGHTS_BODY));
        fetcher.fetch_at("output_UK", 1_234_567).await.unwrap();

        let requested = fetcher.transport.requested.lock().unwrap();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].contains("sheet=output_UK"));
        assert!(requested[0].contains("timestamp=1234567"));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let fetcher = fetcher(FixedTransport::status(404, "404 Not Found", ""));
        let err = fetcher.fetch_at("weights", 1).await.unwrap_err();

        match err {
            FetchError::Transport {
                sheet,
                source: TransportError::Status { status },
            } => {
                assert_eq!(sheet, "weights");
                assert_eq!(status, "404 Not Found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_network_failure() {
        let transport = FixedTransport {
            response: None,
            requested: Mutex::new(Vec::new()),
        };
        let err = fetcher(transport).fetch_at("weights", 1).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Transport {
                source: TransportError::Unreachable { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_from_config_rejects_bad_base_url() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        let result = WorksheetFetcher::from_config(FixedTransport::ok(""), &config);
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let fetcher = fetcher(FixedTransport::ok("not an envelope"));
        let err = fetcher.fetch_at("Overview", 1).await.unwrap_err();

        assert!(matches!(err, FetchError::MalformedEnvelope { .. }));
        assert_eq!(err.sheet(), "Overview");
    }

    #[tokio::test]
    async fn test_rows_less_table() {
        let fetcher = fetcher(FixedTransport::ok(r#"x({"table":{"cols":[{"label":"A"}]}})"#));
        let err = fetcher.fetch_at("Overview", 1).await.unwrap_err();

        assert!(matches!(err, FetchError::EmptyWorksheet { ref sheet } if sheet == "Overview"));
    }

    #[tokio::test]
    async fn test_empty_rows_keep_invariant() {
        let fetcher = fetcher(FixedTransport::ok(
            r#"x({"table":{"cols":[{"label":"A"},{"label":"B"}],"rows":[]}})"#,
        ));
        let record = fetcher.fetch_at("weights", 1).await.unwrap();

        assert!(record.rows.is_empty());
        assert_eq!(record.weighted_columns.len(), record.headers.len());
    }
}
