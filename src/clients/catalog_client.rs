/// Open Library API 客户端
///
/// 只做只读 GET 请求并解析原始记录，每次调用只尝试一次
use crate::config::Config;
use crate::error::{CatalogError, RequestError};
use crate::models::work::null_as_default;
use crate::models::{AuthorRecord, RatingRecord, WorkRecord};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

const AUTHOR_SEARCH_PATH: &str = "/search/authors.json";
const WORK_SEARCH_PATH: &str = "/search.json";

/// 书目 API 能力
///
/// 流程层只依赖这个 trait，测试时可以替换成内存实现
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// 获取阅读列表（最多 `limit` 条，保持上游顺序）
    async fn fetch_reading_list(&self) -> Result<Vec<WorkRecord>, CatalogError>;

    /// 按作者名模糊搜索，没有候选时返回 `Ok(None)`
    async fn fetch_author(&self, name: &str) -> Result<Option<AuthorRecord>, CatalogError>;

    /// 按书名搜索评分，没有候选时返回 `Ok(None)`
    async fn fetch_rating(&self, title: &str) -> Result<Option<RatingRecord>, CatalogError>;
}

/// Open Library 客户端
pub struct CatalogClient {
    http: Client,
    base_url: String,
    reading_list_path: String,
    reading_list_limit: usize,
}

impl CatalogClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .user_agent(concat!("book-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CatalogError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: config.catalog_base_url.trim_end_matches('/').to_string(),
            reading_list_path: config.reading_list_path.clone(),
            reading_list_limit: config.reading_list_limit,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET 并解析 JSON，非 2xx 视为失败
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RequestError> {
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn fetch_reading_list(&self) -> Result<Vec<WorkRecord>, CatalogError> {
        let url = self.url(&self.reading_list_path);
        debug!("请求阅读列表: {}", url);

        let response: ReadingLogResponse = self
            .get_json(&url, &[])
            .await
            .map_err(|e| CatalogError::reading_list(&url, e))?;

        Ok(response.into_works(self.reading_list_limit))
    }

    async fn fetch_author(&self, name: &str) -> Result<Option<AuthorRecord>, CatalogError> {
        let url = self.url(AUTHOR_SEARCH_PATH);
        debug!("查询作者: {}", name);

        let response: SearchResponse<AuthorDoc> = self
            .get_json(&url, &[("q", name)])
            .await
            .map_err(|e| CatalogError::author_lookup(name, e))?;

        Ok(select_author(name, response.docs))
    }

    async fn fetch_rating(&self, title: &str) -> Result<Option<RatingRecord>, CatalogError> {
        let url = self.url(WORK_SEARCH_PATH);
        debug!("查询评分: {}", title);

        let response: SearchResponse<WorkDoc> = self
            .get_json(&url, &[("q", title)])
            .await
            .map_err(|e| CatalogError::rating_lookup(title, e))?;

        Ok(select_rating(title, response.docs))
    }
}

// ========== 响应结构 ==========

#[derive(Debug, Deserialize)]
struct ReadingLogResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    reading_log_entries: Vec<ReadingLogEntry>,
}

#[derive(Debug, Deserialize)]
struct ReadingLogEntry {
    work: Option<WorkRecord>,
}

impl ReadingLogResponse {
    fn into_works(self, limit: usize) -> Vec<WorkRecord> {
        self.reading_log_entries
            .into_iter()
            .filter_map(|entry| entry.work)
            .take(limit)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default)]
    docs: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorDoc {
    #[serde(default)]
    birth_date: Option<String>,
    #[serde(default)]
    top_work: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    top_subjects: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkDoc {
    #[serde(default)]
    ratings_average: Option<f64>,
}

/// 多个候选时总是取第一个
fn select_author(name: &str, docs: Vec<AuthorDoc>) -> Option<AuthorRecord> {
    docs.into_iter().next().map(|doc| AuthorRecord {
        name: name.to_string(),
        birth_date: doc.birth_date,
        top_work: doc.top_work,
        top_subjects: doc.top_subjects,
    })
}

fn select_rating(title: &str, docs: Vec<WorkDoc>) -> Option<RatingRecord> {
    docs.into_iter().next().map(|doc| RatingRecord {
        title: title.to_string(),
        ratings_average: doc.ratings_average,
    })
}
