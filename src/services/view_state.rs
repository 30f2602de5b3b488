//! 表格视图状态
//!
//! 对流水线给出的全部行做本地派生：过滤 → 排序 → 分页

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::EnrichedRow;

/// 排序列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Authors,
    Title,
    FirstPublishYear,
    Subject,
    BirthDate,
    TopWork,
    Rating,
}

impl SortKey {
    fn compare(self, a: &EnrichedRow, b: &EnrichedRow) -> Ordering {
        match self {
            SortKey::Authors => a.work.joined_authors().cmp(&b.work.joined_authors()),
            SortKey::Title => a.work.title.cmp(&b.work.title),
            SortKey::FirstPublishYear => a.work.first_publish_year.cmp(&b.work.first_publish_year),
            SortKey::Subject => subject(a).cmp(&subject(b)),
            SortKey::BirthDate => birth_date(a).cmp(&birth_date(b)),
            SortKey::TopWork => top_work(a).cmp(&top_work(b)),
            SortKey::Rating => match (a.ratings_average, b.ratings_average) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (x, y) => x.is_some().cmp(&y.is_some()),
            },
        }
    }
}

fn subject(row: &EnrichedRow) -> Option<&str> {
    row.author.as_ref().and_then(|a| a.first_subject())
}

fn birth_date(row: &EnrichedRow) -> Option<&str> {
    row.author.as_ref().and_then(|a| a.birth_date.as_deref())
}

fn top_work(row: &EnrichedRow) -> Option<&str> {
    row.author.as_ref().and_then(|a| a.top_work.as_deref())
}

impl FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "author" | "authors" => Ok(SortKey::Authors),
            "title" => Ok(SortKey::Title),
            "year" | "first_publish_year" => Ok(SortKey::FirstPublishYear),
            "subject" => Ok(SortKey::Subject),
            "birth_date" => Ok(SortKey::BirthDate),
            "top_work" => Ok(SortKey::TopWork),
            "rating" | "ratings_average" => Ok(SortKey::Rating),
            _ => Err(ConfigError::UnknownSortKey(s.to_string())),
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// 会话内的视图状态，不持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub page: usize,
    pub page_size: usize,
    pub sort_key: Option<SortKey>,
    pub direction: SortDirection,
    pub search: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 10,
            sort_key: None,
            direction: SortDirection::Ascending,
            search: String::new(),
        }
    }
}

/// 派生结果
#[derive(Debug)]
pub struct DerivedView<'a> {
    /// 过滤 + 排序后的全部行（导出使用这一份，而不是当前页）
    pub rows: Vec<&'a EnrichedRow>,
    pub page: usize,
    pub page_size: usize,
}

impl<'a> DerivedView<'a> {
    /// 当前页的行
    pub fn page_rows(&self) -> &[&'a EnrichedRow] {
        let start = (self.page * self.page_size).min(self.rows.len());
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn page_count(&self) -> usize {
        page_count(self.rows.len(), self.page_size)
    }

    /// 当前页第一行的序号（从 1 开始，跨页连续）
    pub fn first_serial(&self) -> usize {
        self.page * self.page_size + 1
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }
}

fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// 视图状态控制器
#[derive(Debug, Clone, Default)]
pub struct ViewController {
    state: ViewState,
}

impl ViewController {
    pub fn new(page_size: usize) -> Self {
        let mut controller = Self::default();
        controller.set_page_size(page_size);
        controller
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// 修改搜索词，回到第一页
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.state.search = text.into();
        self.state.page = 0;
    }

    /// 点击列头：同一列翻转方向，新列从升序开始
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.state.sort_key == Some(key) {
            self.state.direction = self.state.direction.flip();
        } else {
            self.state.sort_key = Some(key);
            self.state.direction = SortDirection::Ascending;
        }
    }

    pub fn clear_sort(&mut self) {
        self.state.sort_key = None;
        self.state.direction = SortDirection::Ascending;
    }

    /// 修改每页行数，回到第一页；0 按 1 处理
    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
        self.state.page = 0;
    }

    /// 跳到指定页，越界的页码在下次派生时收回到范围内
    pub fn set_page(&mut self, page: usize) {
        self.state.page = page;
    }

    pub fn next_page(&mut self) {
        self.state.page = self.state.page.saturating_add(1);
    }

    pub fn prev_page(&mut self) {
        self.state.page = self.state.page.saturating_sub(1);
    }

    /// 过滤 + 排序
    pub fn filter_and_sort<'a>(&self, rows: &'a [EnrichedRow]) -> Vec<&'a EnrichedRow> {
        let needle = self.state.search.to_lowercase();
        let mut filtered: Vec<&EnrichedRow> = rows
            .iter()
            .filter(|row| {
                needle.is_empty() || row.work.joined_authors().to_lowercase().contains(&needle)
            })
            .collect();

        if let Some(key) = self.state.sort_key {
            match self.state.direction {
                SortDirection::Ascending => filtered.sort_by(|a, b| key.compare(a, b)),
                SortDirection::Descending => filtered.sort_by(|a, b| key.compare(b, a)),
            }
        }

        filtered
    }

    /// 派生当前视图，先把页码收回到范围内
    pub fn derive<'a>(&mut self, rows: &'a [EnrichedRow]) -> DerivedView<'a> {
        let rows = self.filter_and_sort(rows);
        let last_page = page_count(rows.len(), self.state.page_size) - 1;
        if self.state.page > last_page {
            self.state.page = last_page;
        }

        DerivedView {
            rows,
            page: self.state.page,
            page_size: self.state.page_size,
        }
    }
}
