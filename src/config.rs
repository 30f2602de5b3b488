//! 程序配置
//!
//! 默认值 → 可选的 TOML 配置文件（`DASHBOARD_CONFIG`）→ 环境变量，后者覆盖前者

use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 书目 API 配置 ---
    /// Open Library 根地址
    pub catalog_base_url: String,
    /// 阅读列表路径
    pub reading_list_path: String,
    /// 阅读列表最多保留的条目数
    pub reading_list_limit: usize,
    /// 是否额外按书名查询评分
    pub fetch_ratings: bool,
    // --- 登录 ---
    /// 允许登录的邮箱
    pub admin_email: String,
    /// 允许登录的密码
    pub admin_password: String,
    /// 登录表单输入的邮箱
    pub login_email: String,
    /// 登录表单输入的密码
    pub login_password: String,
    // --- 表格 ---
    /// 每页行数
    pub page_size: usize,
    /// 按作者过滤的关键字
    pub search_text: String,
    /// 排序列（title / author / year / subject / birth_date / top_work）
    pub sort_key: Option<String>,
    /// 是否降序
    pub sort_descending: bool,
    /// CSV 输出文件
    pub csv_output: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_base_url: "https://openlibrary.org".to_string(),
            reading_list_path: "/people/mekBot/books/want-to-read.json".to_string(),
            reading_list_limit: 100,
            fetch_ratings: false,
            admin_email: "admin@gmail.com".to_string(),
            admin_password: "admin@123".to_string(),
            login_email: String::new(),
            login_password: String::new(),
            page_size: 10,
            search_text: String::new(),
            sort_key: None,
            sort_descending: false,
            csv_output: "books.csv".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 读取配置：如果设置了 `DASHBOARD_CONFIG` 就先加载该 TOML 文件，再用环境变量覆盖
    pub fn from_env() -> AppResult<Self> {
        let base = match std::env::var("DASHBOARD_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = toml::from_str(&content).map_err(|e| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(config)
    }

    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
            path: String::new(),
            source: e,
        })
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        Ok(Self {
            catalog_base_url: env_string("CATALOG_BASE_URL").unwrap_or(self.catalog_base_url),
            reading_list_path: env_string("READING_LIST_PATH").unwrap_or(self.reading_list_path),
            reading_list_limit: env_parse("READING_LIST_LIMIT", "usize")?
                .unwrap_or(self.reading_list_limit),
            fetch_ratings: env_parse("FETCH_RATINGS", "bool")?.unwrap_or(self.fetch_ratings),
            admin_email: env_string("ADMIN_EMAIL").unwrap_or(self.admin_email),
            admin_password: env_string("ADMIN_PASSWORD").unwrap_or(self.admin_password),
            login_email: env_string("LOGIN_EMAIL").unwrap_or(self.login_email),
            login_password: env_string("LOGIN_PASSWORD").unwrap_or(self.login_password),
            page_size: env_parse("PAGE_SIZE", "usize")?.unwrap_or(self.page_size),
            search_text: env_string("SEARCH_TEXT").unwrap_or(self.search_text),
            sort_key: env_string("SORT_KEY").or(self.sort_key),
            sort_descending: env_parse("SORT_DESCENDING", "bool")?
                .unwrap_or(self.sort_descending),
            csv_output: env_string("CSV_OUTPUT").unwrap_or(self.csv_output),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
        })
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok()
}

/// 环境变量存在但无法解析时返回错误，而不是悄悄回退到默认值
fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
