//! 数据补全流水线 - 流程层
//!
//! 一次会话的完整流程：
//! 1. 获取阅读列表（失败 → 会话进入错误状态，不展示任何数据）
//! 2. 作者名去重
//! 3. 每个作者并发查询一次（全部发出，再等待全部结束）
//! 4. 每个查询结束后写入会话缓存（找到 / 缺失）
//! 5. 全部结束后进入 Ready
//!
//! ## 数据来源约定
//!
//! 上游只提供"全部拉取"，没有服务端过滤、排序或分页。
//! 流水线一次性加载整个阅读列表，`rows()` 返回全部行，
//! 过滤 / 排序 / 分页 / 导出都由 `ViewController` 在本地完成。
//!
//! ## 状态机
//!
//! ```text
//! Idle → FetchingList → FetchingAuthors → Ready
//!             │               │
//!             └──→ Error      └──→ Cancelled
//! ```
//!
//! `EnrichmentSession` 是纯状态机，只通过 `apply(event)` 推进；
//! `EnrichmentPipeline::run` 负责发请求并把结果转成事件。

use std::collections::HashSet;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::clients::CatalogApi;
use crate::error::CatalogError;
use crate::models::{
    join_rows, AuthorCache, AuthorLookup, AuthorRecord, EnrichedRow, RatingCache, RatingLookup,
    RatingRecord, WorkRecord,
};
use crate::services::cancel::CancelToken;

/// 流水线状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    FetchingList,
    /// 阅读列表已加载，仍有查询未结束
    FetchingAuthors { pending: usize },
    Ready,
    /// 阅读列表获取失败，终态
    Error { message: String },
    /// 会话已销毁，终态
    Cancelled,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Ready | PipelineState::Error { .. } | PipelineState::Cancelled
        )
    }
}

/// 推动状态机的事件
#[derive(Debug)]
pub enum PipelineEvent {
    Start,
    ListLoaded(Vec<WorkRecord>),
    ListFailed(CatalogError),
    AuthorSettled {
        name: String,
        result: Result<Option<AuthorRecord>, CatalogError>,
    },
    RatingSettled {
        title: String,
        result: Result<Option<RatingRecord>, CatalogError>,
    },
    Cancelled,
}

/// 需要发出的查询
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup {
    Author(String),
    Rating(String),
}

/// 查询统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupStats {
    pub authors_dispatched: usize,
    pub authors_found: usize,
    pub authors_absent: usize,
    pub authors_failed: usize,
    pub ratings_dispatched: usize,
    pub ratings_failed: usize,
}

/// 一次会话的状态与缓存
///
/// 缓存属于会话本身，不是全局单例；视图层通过引用读取
#[derive(Debug)]
pub struct EnrichmentSession {
    state: PipelineState,
    fetch_ratings: bool,
    works: Vec<WorkRecord>,
    authors: AuthorCache,
    ratings: RatingCache,
    authors_in_flight: HashSet<String>,
    ratings_in_flight: HashSet<String>,
    stats: LookupStats,
}

impl EnrichmentSession {
    pub fn new(fetch_ratings: bool) -> Self {
        Self {
            state: PipelineState::Idle,
            fetch_ratings,
            works: Vec::new(),
            authors: AuthorCache::new(),
            ratings: RatingCache::default(),
            authors_in_flight: HashSet::new(),
            ratings_in_flight: HashSet::new(),
            stats: LookupStats::default(),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn works(&self) -> &[WorkRecord] {
        &self.works
    }

    pub fn authors(&self) -> &AuthorCache {
        &self.authors
    }

    pub fn ratings(&self) -> &RatingCache {
        &self.ratings
    }

    pub fn stats(&self) -> &LookupStats {
        &self.stats
    }

    /// 尚未结束的查询数
    pub fn pending(&self) -> usize {
        self.authors_in_flight.len() + self.ratings_in_flight.len()
    }

    /// 当前可展示的全部行
    ///
    /// 查询进行中时也可以调用，未解析的作者显示为 "N/A"；
    /// 错误状态下没有任何行
    pub fn rows(&self) -> Vec<EnrichedRow> {
        match self.state {
            PipelineState::Error { .. } => Vec::new(),
            _ => join_rows(&self.works, &self.authors, &self.ratings),
        }
    }

    /// 阅读列表中去重后的作者名，按首次出现的顺序
    pub fn distinct_author_names(&self) -> Vec<String> {
        distinct(self.works.iter().flat_map(|w| w.author_names.iter()))
    }

    /// 标记一个作者查询为进行中
    ///
    /// 已缓存或已在查询中时返回 None，保证同一会话内每个名字最多一个请求
    pub fn dispatch_author(&mut self, name: &str) -> Option<Lookup> {
        if self.authors.contains(name) || self.authors_in_flight.contains(name) {
            return None;
        }
        self.authors_in_flight.insert(name.to_string());
        self.stats.authors_dispatched += 1;
        Some(Lookup::Author(name.to_string()))
    }

    /// 空白书名不查询评分，该行评分显示为 "N/A"
    pub fn dispatch_rating(&mut self, title: &str) -> Option<Lookup> {
        if title.trim().is_empty()
            || self.ratings.contains(title)
            || self.ratings_in_flight.contains(title)
        {
            return None;
        }
        self.ratings_in_flight.insert(title.to_string());
        self.stats.ratings_dispatched += 1;
        Some(Lookup::Rating(title.to_string()))
    }

    /// 应用一个事件，返回需要新发出的查询
    pub fn apply(&mut self, event: PipelineEvent) -> Vec<Lookup> {
        if self.state.is_terminal() {
            debug!("会话已结束 ({:?})，忽略事件", self.state);
            return Vec::new();
        }

        match event {
            PipelineEvent::Start => {
                if self.state == PipelineState::Idle {
                    self.state = PipelineState::FetchingList;
                } else {
                    warn!("流水线已启动，忽略重复的 Start");
                }
                Vec::new()
            }
            PipelineEvent::ListLoaded(works) => {
                if self.state != PipelineState::FetchingList {
                    warn!("当前状态 {:?} 不接受阅读列表，已忽略", self.state);
                    return Vec::new();
                }
                self.works = works;
                let lookups = self.dispatch_all();
                self.refresh_pending();
                lookups
            }
            PipelineEvent::ListFailed(err) => {
                if self.state != PipelineState::FetchingList {
                    warn!("当前状态 {:?} 不接受阅读列表错误，已忽略", self.state);
                    return Vec::new();
                }
                self.state = PipelineState::Error {
                    message: err.to_string(),
                };
                Vec::new()
            }
            PipelineEvent::AuthorSettled { name, result } => {
                if !self.authors_in_flight.remove(&name) {
                    debug!("未发出过的作者查询结果: {}，已忽略", name);
                    return Vec::new();
                }
                let lookup = match result {
                    Ok(Some(record)) => {
                        self.stats.authors_found += 1;
                        AuthorLookup::Found(record)
                    }
                    Ok(None) => {
                        debug!("未找到作者: {}", name);
                        self.stats.authors_absent += 1;
                        AuthorLookup::Absent
                    }
                    Err(e) => {
                        warn!("⚠️ {}", e);
                        self.stats.authors_failed += 1;
                        AuthorLookup::Absent
                    }
                };
                self.authors.record(name, lookup);
                self.refresh_pending();
                Vec::new()
            }
            PipelineEvent::RatingSettled { title, result } => {
                if !self.ratings_in_flight.remove(&title) {
                    debug!("未发出过的评分查询结果: {}，已忽略", title);
                    return Vec::new();
                }
                let lookup = match result {
                    Ok(Some(record)) => RatingLookup::Found(record),
                    Ok(None) => RatingLookup::Absent,
                    Err(e) => {
                        warn!("⚠️ {}", e);
                        self.stats.ratings_failed += 1;
                        RatingLookup::Absent
                    }
                };
                self.ratings.record(title, lookup);
                self.refresh_pending();
                Vec::new()
            }
            PipelineEvent::Cancelled => {
                self.authors_in_flight.clear();
                self.ratings_in_flight.clear();
                self.state = PipelineState::Cancelled;
                Vec::new()
            }
        }
    }

    fn dispatch_all(&mut self) -> Vec<Lookup> {
        let mut lookups: Vec<Lookup> = self
            .distinct_author_names()
            .iter()
            .filter_map(|name| self.dispatch_author(name))
            .collect();

        if self.fetch_ratings {
            let titles = distinct(self.works.iter().map(|w| &w.title));
            lookups.extend(titles.iter().filter_map(|title| self.dispatch_rating(title)));
        }

        lookups
    }

    fn refresh_pending(&mut self) {
        let pending = self.pending();
        self.state = if pending == 0 {
            PipelineState::Ready
        } else {
            PipelineState::FetchingAuthors { pending }
        };
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen: HashSet<&String> = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .cloned()
        .collect()
}

/// 数据补全流水线
///
/// 持有书目客户端和一次会话的状态。单任务内协作式并发：
/// 所有查询在当前任务中一起 poll，不开线程，不 spawn
pub struct EnrichmentPipeline<C> {
    client: C,
    session: EnrichmentSession,
}

impl<C: CatalogApi> EnrichmentPipeline<C> {
    pub fn new(client: C, fetch_ratings: bool) -> Self {
        Self {
            client,
            session: EnrichmentSession::new(fetch_ratings),
        }
    }

    pub fn session(&self) -> &EnrichmentSession {
        &self.session
    }

    pub fn state(&self) -> &PipelineState {
        self.session.state()
    }

    /// 全部行（本地数据，调用方自行过滤 / 排序 / 分页）
    pub fn rows(&self) -> Vec<EnrichedRow> {
        self.session.rows()
    }

    /// 运行一次会话
    ///
    /// 每个查询结束后调用 `on_progress`，调用方可以观察到部分关联的结果。
    /// 只能运行一次；再次调用直接返回当前状态
    pub async fn run<F>(&mut self, cancel: &CancelToken, mut on_progress: F) -> &PipelineState
    where
        F: FnMut(&EnrichmentSession),
    {
        if self.session.state() != &PipelineState::Idle {
            warn!("流水线已运行过，不会重新获取");
            return self.session.state();
        }

        let client = &self.client;
        let session = &mut self.session;

        session.apply(PipelineEvent::Start);
        info!("📚 正在获取阅读列表...");

        let fetched = tokio::select! {
            _ = cancel.cancelled() => None,
            result = client.fetch_reading_list() => Some(result),
        };

        let lookups = match fetched {
            None => {
                info!("会话已取消");
                session.apply(PipelineEvent::Cancelled);
                return session.state();
            }
            Some(Ok(works)) => {
                info!("✓ 阅读列表共 {} 本", works.len());
                session.apply(PipelineEvent::ListLoaded(works))
            }
            Some(Err(e)) => {
                warn!("❌ {}", e);
                session.apply(PipelineEvent::ListFailed(e));
                on_progress(session);
                return session.state();
            }
        };

        info!(
            "🔍 并发查询 {} 位作者 / {} 本书的评分",
            session.stats().authors_dispatched,
            session.stats().ratings_dispatched
        );

        let mut in_flight: FuturesUnordered<BoxFuture<'_, PipelineEvent>> = lookups
            .into_iter()
            .map(|lookup| settle(client, lookup))
            .collect();

        on_progress(session);

        while !session.state().is_terminal() {
            let event = tokio::select! {
                _ = cancel.cancelled() => PipelineEvent::Cancelled,
                next = in_flight.next() => match next {
                    Some(event) => event,
                    None => break,
                },
            };

            let cancelled = matches!(event, PipelineEvent::Cancelled);
            for lookup in session.apply(event) {
                in_flight.push(settle(client, lookup));
            }
            on_progress(session);

            if cancelled {
                info!("会话已取消，放弃 {} 个进行中的查询", in_flight.len());
            }
        }

        // 取消时这里 drop 掉所有未完成的请求
        drop(in_flight);

        session.state()
    }
}

/// 发出一个查询，把结果转成事件
fn settle<C: CatalogApi>(client: &C, lookup: Lookup) -> BoxFuture<'_, PipelineEvent> {
    match lookup {
        Lookup::Author(name) => async move {
            let result = client.fetch_author(&name).await;
            PipelineEvent::AuthorSettled { name, result }
        }
        .boxed(),
        Lookup::Rating(title) => async move {
            let result = client.fetch_rating(&title).await;
            PipelineEvent::RatingSettled { title, result }
        }
        .boxed(),
    }
}
