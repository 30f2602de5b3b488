use std::collections::HashMap;

/// 按书名查询到的评分
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord {
    pub title: String,
    pub ratings_average: Option<f64>,
}

/// 评分查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum RatingLookup {
    Found(RatingRecord),
    Absent,
}

/// 会话内的评分缓存，按书名原样作为键
#[derive(Debug, Clone, Default)]
pub struct RatingCache {
    entries: HashMap<String, RatingLookup>,
}

impl RatingCache {
    pub fn get(&self, title: &str) -> Option<&RatingLookup> {
        self.entries.get(title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.entries.contains_key(title)
    }

    pub fn record(&mut self, title: impl Into<String>, lookup: RatingLookup) {
        self.entries.entry(title.into()).or_insert(lookup);
    }

    /// 评分均值，未找到或未查询时为 None
    pub fn average_for(&self, title: &str) -> Option<f64> {
        match self.entries.get(title) {
            Some(RatingLookup::Found(record)) => record.ratings_average,
            _ => None,
        }
    }
}
