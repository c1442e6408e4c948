/// 表格查询接口客户端
///
/// 只负责拼出请求地址，不发请求
use reqwest::Url;

use crate::config::Config;
use crate::error::ConfigError;

/// 表格查询接口客户端
#[derive(Debug, Clone)]
pub struct GvizClient {
    /// 已校验的查询接口地址（不带参数）
    endpoint: Url,
    cell_range: String,
}

impl GvizClient {
    pub fn new(endpoint: Url, cell_range: impl Into<String>) -> Self {
        Self {
            endpoint,
            cell_range: cell_range.into(),
        }
    }

    /// 使用配置创建，服务地址不合法时返回配置错误
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.endpoint_url()?, &config.cell_range))
    }

    /// 构建工作表请求地址
    ///
    /// # 参数
    /// - `sheet`: 工作表名（会被转义）
    /// - `timestamp_ms`: 毫秒时间戳，只用于绕过中间缓存
    pub fn build_url(&self, sheet: &str, timestamp_ms: i64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("tqx", "out:json")
            .append_pair("sheet", sheet)
            .append_pair("range", &self.cell_range)
            .append_pair("headers", "1")
            .append_pair("timestamp", &timestamp_ms.to_string());
        url
    }
}
