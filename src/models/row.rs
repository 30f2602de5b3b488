use crate::models::author::{AuthorCache, AuthorRecord};
use crate::models::rating::RatingCache;
use crate::models::work::WorkRecord;

/// 缺失字段的占位文本
pub const NOT_AVAILABLE: &str = "N/A";

/// 书与作者信息关联后的一行
///
/// 由 `join_rows` 派生，不单独保存；缓存或阅读列表变化后重新计算
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub work: WorkRecord,
    /// 主作者的信息；查询中、未找到或查询失败时为 None
    pub author: Option<AuthorRecord>,
    pub ratings_average: Option<f64>,
}

impl EnrichedRow {
    pub fn authors_display(&self) -> String {
        non_empty_or_na(self.work.joined_authors())
    }

    pub fn title_display(&self) -> String {
        non_empty_or_na(self.work.title.clone())
    }

    pub fn year_display(&self) -> String {
        self.work
            .first_publish_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn subject_display(&self) -> String {
        let subject = self.author.as_ref().and_then(AuthorRecord::first_subject);
        optional_or_na(subject)
    }

    pub fn birth_date_display(&self) -> String {
        optional_or_na(self.author.as_ref().and_then(|a| a.birth_date.as_deref()))
    }

    pub fn top_work_display(&self) -> String {
        optional_or_na(self.author.as_ref().and_then(|a| a.top_work.as_deref()))
    }

    pub fn rating_display(&self) -> String {
        match self.ratings_average {
            Some(avg) => avg.to_string(),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}

/// 把阅读列表与当前缓存关联成行，保持阅读列表的顺序
///
/// 纯函数：相同的输入总是得到相同的结果
pub fn join_rows(works: &[WorkRecord], authors: &AuthorCache, ratings: &RatingCache) -> Vec<EnrichedRow> {
    works
        .iter()
        .map(|work| EnrichedRow {
            work: work.clone(),
            author: work
                .primary_author()
                .and_then(|name| authors.get(name))
                .and_then(|lookup| lookup.record())
                .cloned(),
            ratings_average: ratings.average_for(&work.title),
        })
        .collect()
}

fn non_empty_or_na(value: String) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value
    }
}

fn optional_or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::author::AuthorLookup;
    use crate::models::rating::{RatingLookup, RatingRecord};

    fn works() -> Vec<WorkRecord> {
        vec![
            WorkRecord::new("Dune", vec!["Frank Herbert".to_string()], Some(1965)),
            WorkRecord::new("1984", vec!["George Orwell".to_string()], Some(1949)),
            WorkRecord::new("Anonymous Tales", vec![], None),
        ]
    }

    fn cache() -> AuthorCache {
        let mut cache = AuthorCache::new();
        cache.record(
            "Frank Herbert",
            AuthorLookup::Found(AuthorRecord {
                name: "Frank Herbert".to_string(),
                birth_date: Some("1920".to_string()),
                top_work: Some("Dune".to_string()),
                top_subjects: vec!["Science fiction".to_string(), "Dune (Imaginary place)".to_string()],
            }),
        );
        cache.record("George Orwell", AuthorLookup::Absent);
        cache
    }

    #[test]
    fn test_join_keeps_list_order_and_fills_na() {
        let rows = join_rows(&works(), &cache(), &RatingCache::default());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].title_display(), "Dune");
        assert_eq!(rows[0].birth_date_display(), "1920");
        assert_eq!(rows[0].subject_display(), "Science fiction");

        assert_eq!(rows[1].title_display(), "1984");
        assert_eq!(rows[1].birth_date_display(), NOT_AVAILABLE);
        assert_eq!(rows[1].top_work_display(), NOT_AVAILABLE);
        assert_eq!(rows[1].subject_display(), NOT_AVAILABLE);

        assert_eq!(rows[2].authors_display(), NOT_AVAILABLE);
        assert_eq!(rows[2].year_display(), NOT_AVAILABLE);
    }

    #[test]
    fn test_join_is_idempotent() {
        let works = works();
        let cache = cache();
        let ratings = RatingCache::default();
        assert_eq!(join_rows(&works, &cache, &ratings), join_rows(&works, &cache, &ratings));
    }

    #[test]
    fn test_pending_author_renders_placeholder() {
        // 缓存为空 = 查询仍在进行中
        let rows = join_rows(&works(), &AuthorCache::new(), &RatingCache::default());
        assert!(rows.iter().all(|row| row.author.is_none()));
        assert!(rows.iter().all(|row| row.birth_date_display() == NOT_AVAILABLE));
    }

    #[test]
    fn test_rating_is_joined_by_title() {
        let mut ratings = RatingCache::default();
        ratings.record(
            "Dune",
            RatingLookup::Found(RatingRecord {
                title: "Dune".to_string(),
                ratings_average: Some(4.256),
            }),
        );

        let rows = join_rows(&works(), &cache(), &ratings);
        assert_eq!(rows[0].rating_display(), "4.256");
        assert_eq!(rows[1].rating_display(), NOT_AVAILABLE);
    }
}
