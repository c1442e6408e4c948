//! HTTP 传输 - 基础设施层
//!
//! 持有唯一的 reqwest::Client，只暴露"GET 一个地址并拿回文本"的能力

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::Config;
use crate::error::TransportError;

/// 一次 GET 请求的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP 状态码
    pub status: u16,
    /// 状态描述，例如 "404 Not Found"
    pub status_text: String,
    /// 响应正文
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 网络传输能力
///
/// 返回 Err 只表示网络层失败（连接、超时、读取正文），非 2xx 状态码由调用方判断
#[async_trait]
pub trait SheetTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

/// 基于 reqwest 的传输实现
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// 创建传输，超时只在配置里指定时才设置
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl SheetTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        let body = response.text().await?;

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.to_string(),
            body,
        })
    }
}

#[async_trait]
impl<T: SheetTransport + ?Sized> SheetTransport for &T {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        (**self).get(url).await
    }
}
