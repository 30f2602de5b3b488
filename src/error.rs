//! 错误类型
//!
//! 网络错误在调用点就被处理：阅读列表失败 → 会话进入错误状态；
//! 作者查询失败 → 该作者记为缺失。没有任何错误会被重试。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 书目 API 错误
    #[error("书目API错误: {0}")]
    Catalog(#[from] CatalogError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 登录错误
    #[error("登录错误: {0}")]
    Auth(#[from] AuthError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 书目 API 错误
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 阅读列表获取失败，对整个会话是致命的
    #[error("阅读列表获取失败 ({endpoint}): {source}")]
    ReadingListFetch {
        endpoint: String,
        #[source]
        source: RequestError,
    },
    /// 单个作者查询失败，只影响该作者所在的行
    #[error("作者查询失败 ({name}): {source}")]
    AuthorLookup {
        name: String,
        #[source]
        source: RequestError,
    },
    /// HTTP 客户端创建失败
    #[error("HTTP客户端创建失败: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// 单本书评分查询失败
    #[error("评分查询失败 ({title}): {source}")]
    RatingLookup {
        title: String,
        #[source]
        source: RequestError,
    },
}

/// 单次 HTTP 请求失败的原因
#[derive(Debug, Error)]
pub enum RequestError {
    /// 网络请求失败
    #[error("网络请求失败: {0}")]
    Transport(#[from] reqwest::Error),
    /// 返回了非 2xx 状态码
    #[error("返回错误状态码: {status}")]
    BadStatus { status: u16 },
    /// 响应体无法解析
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
    /// 测试或模拟环境中构造的错误
    #[error("{0}")]
    Other(String),
}

/// CSV 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV 序列化失败
    #[error("CSV写入失败: {0}")]
    Csv(#[from] csv::Error),
    /// 输出不是合法的 UTF-8
    #[error("CSV内容不是合法UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 登录错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// 邮箱或密码不匹配
    #[error("Email or password is wrong! Try again")]
    InvalidCredentials,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 未知的排序列
    #[error("未知的排序列: {0}")]
    UnknownSortKey(String),
}

// ========== 便捷构造函数 ==========

impl CatalogError {
    /// 创建阅读列表获取失败错误
    pub fn reading_list(endpoint: impl Into<String>, source: impl Into<RequestError>) -> Self {
        CatalogError::ReadingListFetch {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// 创建作者查询失败错误
    pub fn author_lookup(name: impl Into<String>, source: impl Into<RequestError>) -> Self {
        CatalogError::AuthorLookup {
            name: name.into(),
            source: source.into(),
        }
    }

    /// 创建评分查询失败错误
    pub fn rating_lookup(title: impl Into<String>, source: impl Into<RequestError>) -> Self {
        CatalogError::RatingLookup {
            title: title.into(),
            source: source.into(),
        }
    }

    /// 是否会使整个会话失败
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, CatalogError::ReadingListFetch { .. })
    }
}

impl From<&str> for RequestError {
    fn from(msg: &str) -> Self {
        RequestError::Other(msg.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
