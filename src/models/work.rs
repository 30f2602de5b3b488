use serde::{Deserialize, Deserializer, Serialize};

/// 阅读列表中的一本书
///
/// 解析后不再修改，生命周期为一次会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_names: Vec<String>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
}

impl WorkRecord {
    pub fn new(
        title: impl Into<String>,
        author_names: Vec<String>,
        first_publish_year: Option<i32>,
    ) -> Self {
        Self {
            title: title.into(),
            author_names,
            first_publish_year,
        }
    }

    /// 作者名用 ", " 连接，过滤和导出都用这个字符串
    pub fn joined_authors(&self) -> String {
        self.author_names.join(", ")
    }

    /// 用于关联作者信息的主作者
    pub fn primary_author(&self) -> Option<&str> {
        self.author_names.first().map(String::as_str)
    }
}

// API 有时返回显式的 null 而不是省略字段
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_null_fields_fall_back() {
        let work: WorkRecord =
            serde_json::from_str(r#"{"title": null, "first_publish_year": null}"#).unwrap();
        assert_eq!(work.title, "");
        assert!(work.author_names.is_empty());
        assert_eq!(work.first_publish_year, None);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let work: WorkRecord = serde_json::from_str(
            r#"{
                "title": "Good Omens",
                "key": "/works/OL453936W",
                "author_keys": ["OL25930A", "OL2631291A"],
                "author_names": ["Neil Gaiman", "Terry Pratchett"],
                "first_publish_year": 1990,
                "edition_key": ["OL1M"]
            }"#,
        )
        .unwrap();

        assert_eq!(work.joined_authors(), "Neil Gaiman, Terry Pratchett");
        assert_eq!(work.primary_author(), Some("Neil Gaiman"));
        assert_eq!(work.first_publish_year, Some(1990));
    }
}
