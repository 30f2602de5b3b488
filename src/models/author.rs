use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 作者信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    /// 关联键（查询时使用的作者名，不是 API 返回的名字）
    pub name: String,
    pub birth_date: Option<String>,
    pub top_work: Option<String>,
    pub top_subjects: Vec<String>,
}

impl AuthorRecord {
    pub fn first_subject(&self) -> Option<&str> {
        self.top_subjects.first().map(String::as_str)
    }
}

/// 作者查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorLookup {
    Found(AuthorRecord),
    /// 没有候选结果，或者查询失败
    Absent,
}

impl AuthorLookup {
    pub fn record(&self) -> Option<&AuthorRecord> {
        match self {
            AuthorLookup::Found(record) => Some(record),
            AuthorLookup::Absent => None,
        }
    }
}

/// 会话内的作者缓存
///
/// - 按作者名原样作为键，不做大小写或空白归一化
/// - 从不淘汰
#[derive(Debug, Clone, Default)]
pub struct AuthorCache {
    entries: HashMap<String, AuthorLookup>,
}

impl AuthorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AuthorLookup> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// 记录查询结果，同名已存在时保留先到的结果
    pub fn record(&mut self, name: impl Into<String>, lookup: AuthorLookup) {
        self.entries.entry(name.into()).or_insert(lookup);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 已找到作者信息的数量
    pub fn found_count(&self) -> usize {
        self.entries
            .values()
            .filter(|lookup| matches!(lookup, AuthorLookup::Found(_)))
            .count()
    }
}
