use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use reqwest::Url;
use serde::Deserialize;

use crate::error::ConfigError;

/// 默认表格文档ID
const DEFAULT_DOCUMENT_ID: &str = "1I1SSM6K2FVho8nmbOPa7YpRaaGeeBVnwbDQt79721Og";

/// 默认抓取的工作表（按顺序）
const DEFAULT_WORKSHEETS: &[&str] = &[
    "Overview",
    "weights",
    "output_Global",
    "output_EMEA",
    "output_UK",
    "output_NPA",
    "output_Israel",
    "output_Germany",
    "output_MENA",
    "output_Nordics",
    "output_France",
    "output_Spain",
    "output_Benelux",
    "output_Italy",
];

/// 写入失败时的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFailurePolicy {
    /// 记录失败，继续处理下一个工作表
    #[default]
    Continue,
    /// 立即停止整个批次
    Abort,
}

impl FromStr for SinkFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(SinkFailurePolicy::Continue),
            "abort" => Ok(SinkFailurePolicy::Abort),
            _ => Err(ConfigError::EnvVarParseFailed {
                var_name: "SINK_FAILURE_POLICY".to_string(),
                value: s.to_string(),
                expected_type: "continue | abort".to_string(),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 表格文档ID
    pub document_id: String,
    /// 表格服务地址（不含文档ID）
    pub base_url: String,
    /// 固定的单元格范围
    pub cell_range: String,
    /// 需要抓取的工作表（按顺序处理）
    pub worksheets: Vec<String>,
    /// 工作表 → 输出文件名
    pub filenames: BTreeMap<String, String>,
    /// 需要检测加权列的工作表
    pub weights_sheet: String,
    /// 加权列标记（不区分大小写）
    pub weighted_marker: String,
    /// 输出目录
    pub output_dir: PathBuf,
    /// 同时抓取的工作表数量
    pub max_concurrent_sheets: usize,
    /// 写入失败策略
    pub sink_failure_policy: SinkFailurePolicy,
    /// 有工作表失败时是否以非零状态退出
    pub fail_on_partial: bool,
    /// 请求超时（秒），不设置则使用 reqwest 默认行为
    pub request_timeout_secs: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        let worksheets: Vec<String> = DEFAULT_WORKSHEETS.iter().map(|s| s.to_string()).collect();
        let filenames = worksheets
            .iter()
            .map(|name| (name.clone(), default_filename(name)))
            .collect();

        Self {
            document_id: DEFAULT_DOCUMENT_ID.to_string(),
            base_url: "https://docs.google.com/spreadsheets/d".to_string(),
            cell_range: "A1:BH1048576".to_string(),
            worksheets,
            filenames,
            weights_sheet: "weights".to_string(),
            weighted_marker: "weighted".to_string(),
            output_dir: PathBuf::from("public").join("cached-data"),
            max_concurrent_sheets: 1,
            sink_failure_policy: SinkFailurePolicy::Continue,
            fail_on_partial: false,
            request_timeout_secs: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：先读 SHEET_CACHE_CONFIG 指向的 TOML 文件（如果有），再用环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("SHEET_CACHE_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(path.trim())?,
            _ => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.to_path_buf(),
                source,
            })?;
        config.fill_default_filenames();
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(v) = env_string("SHEET_DOCUMENT_ID") {
            self.document_id = v;
        }
        if let Some(v) = env_string("SHEET_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = env_string("SHEET_RANGE") {
            self.cell_range = v;
        }
        if let Some(v) = env_string("SHEET_WORKSHEETS") {
            self.worksheets = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = env_string("SHEET_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = env_parse::<usize>("MAX_CONCURRENT_SHEETS", "usize")? {
            self.max_concurrent_sheets = v;
        }
        if let Some(v) = env_string("SINK_FAILURE_POLICY") {
            self.sink_failure_policy = v.parse()?;
        }
        if let Some(v) = env_parse::<bool>("FAIL_ON_PARTIAL", "bool")? {
            self.fail_on_partial = v;
        }
        if let Some(v) = env_parse::<u64>("REQUEST_TIMEOUT_SECS", "u64")? {
            self.request_timeout_secs = Some(v);
        }
        if let Some(v) = env_parse::<bool>("VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        self.fill_default_filenames();
        Ok(self)
    }

    /// 列表中没有映射的工作表使用 `<name>.json`
    fn fill_default_filenames(&mut self) {
        for name in &self.worksheets {
            self.filenames
                .entry(name.clone())
                .or_insert_with(|| default_filename(name));
        }
    }

    /// 查询接口地址：`{base_url}/{document_id}/gviz/tq`，只接受 http/https
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let endpoint = format!(
            "{}/{}/gviz/tq",
            self.base_url.trim().trim_end_matches('/'),
            self.document_id
        );
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };

        let url = Url::parse(&endpoint).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("不支持的协议 {}", other))),
        }
    }

    /// 校验配置，返回编排层使用的工作表目录
    pub fn validate(&self) -> Result<SheetCatalog, ConfigError> {
        if self.worksheets.is_empty() {
            return Err(ConfigError::EmptyWorksheetList);
        }
        if self.max_concurrent_sheets == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        self.endpoint_url()?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.worksheets.len());

        for sheet in &self.worksheets {
            if !seen.insert(sheet.as_str()) {
                return Err(ConfigError::DuplicateWorksheet(sheet.clone()));
            }
            let filename = self
                .filenames
                .get(sheet)
                .ok_or_else(|| ConfigError::MissingFilename(sheet.clone()))?;
            if !is_plain_filename(filename) {
                return Err(ConfigError::InvalidFilename {
                    sheet: sheet.clone(),
                    filename: filename.clone(),
                });
            }
            entries.push(SheetEntry {
                sheet: sheet.clone(),
                filename: filename.clone(),
            });
        }

        Ok(SheetCatalog { entries })
    }
}

/// 单个工作表及其输出文件名
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetEntry {
    pub sheet: String,
    pub filename: String,
}

/// 校验后的工作表目录（有序）
#[derive(Clone, Debug, Default)]
pub struct SheetCatalog {
    entries: Vec<SheetEntry>,
}

impl SheetCatalog {
    /// 直接从 (工作表, 文件名) 列表构造，主要用于测试
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(sheet, filename)| SheetEntry {
                    sheet: sheet.into(),
                    filename: filename.into(),
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[SheetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn default_filename(sheet: &str) -> String {
    format!("{}.json", sheet)
}

fn is_plain_filename(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
