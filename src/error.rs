use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 单个工作表抓取失败
    #[error("抓取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 快照写入失败
    #[error("写入错误: {0}")]
    SinkWrite(#[from] SinkError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 工作表抓取错误
///
/// 三种错误都只影响当前工作表，由编排层记录后继续处理下一个
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络层失败或非 2xx 状态码
    #[error("请求工作表 {sheet} 失败: {source}")]
    Transport {
        sheet: String,
        #[source]
        source: TransportError,
    },
    /// 信封提取或 JSON 解析失败
    #[error("工作表 {sheet} 的响应格式错误: {reason}")]
    MalformedEnvelope { sheet: String, reason: String },
    /// 表格缺少 rows 字段
    #[error("工作表 {sheet} 中没有数据")]
    EmptyWorksheet { sheet: String },
}

impl FetchError {
    /// 创建格式错误（解析阶段还不知道工作表名，由上层补上）
    pub fn malformed(reason: impl Into<String>) -> Self {
        FetchError::MalformedEnvelope {
            sheet: String::new(),
            reason: reason.into(),
        }
    }

    /// 补上工作表名
    pub fn for_sheet(self, name: &str) -> Self {
        match self {
            FetchError::Transport { source, .. } => FetchError::Transport {
                sheet: name.to_string(),
                source,
            },
            FetchError::MalformedEnvelope { reason, .. } => FetchError::MalformedEnvelope {
                sheet: name.to_string(),
                reason,
            },
            FetchError::EmptyWorksheet { .. } => FetchError::EmptyWorksheet {
                sheet: name.to_string(),
            },
        }
    }

    /// 出错的工作表名
    pub fn sheet(&self) -> &str {
        match self {
            FetchError::Transport { sheet, .. }
            | FetchError::MalformedEnvelope { sheet, .. }
            | FetchError::EmptyWorksheet { sheet } => sheet,
        }
    }
}

/// 传输层错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// reqwest 发送请求或读取正文失败
    #[error("网络请求失败: {0}")]
    Request(#[from] reqwest::Error),
    /// 服务返回非 2xx 状态码
    #[error("服务返回 {status}")]
    Status { status: String },
    /// 没有可用的服务地址
    #[error("无法访问 {url}")]
    Unreachable { url: String },
}

/// 快照写入错误
#[derive(Debug, Error)]
pub enum SinkError {
    /// 创建输出目录失败
    #[error("无法创建输出目录 {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化 {filename} 失败: {source}")]
    Serialize {
        filename: String,
        source: serde_json::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 工作表列表为空
    #[error("工作表列表不能为空")]
    EmptyWorksheetList,
    /// 工作表重复出现
    #[error("工作表 {0} 在列表中重复出现")]
    DuplicateWorksheet(String),
    /// 工作表缺少文件名映射
    #[error("工作表 {0} 没有对应的输出文件名")]
    MissingFilename(String),
    /// 文件名不合法
    #[error("工作表 {sheet} 的输出文件名 '{filename}' 不合法")]
    InvalidFilename { sheet: String, filename: String },
    /// 服务地址不合法
    #[error("服务地址 '{url}' 不合法: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// 并发数不合法
    #[error("并发数必须大于 0")]
    InvalidConcurrency,
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
