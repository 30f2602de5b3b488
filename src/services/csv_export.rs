//! CSV 导出
//!
//! 导出的是过滤 + 排序后的全部行，不只是当前页

use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::models::EnrichedRow;

const HEADER: [&str; 7] = [
    "S.No",
    "Author Name",
    "Title",
    "First Publish Year",
    "Subject",
    "Author Birth Date",
    "Author Top Work",
];

const RATING_HEADER: &str = "Ratings Average";

/// CSV 导出器
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter {
    include_ratings: bool,
}

impl CsvExporter {
    pub fn new(include_ratings: bool) -> Self {
        Self { include_ratings }
    }

    /// 生成 CSV 文本：表头 + 每行一条记录，序号从 1 开始
    pub fn to_csv(&self, rows: &[&EnrichedRow]) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header: Vec<&str> = HEADER.to_vec();
        if self.include_ratings {
            header.push(RATING_HEADER);
        }
        writer.write_record(&header)?;

        for (index, row) in rows.iter().enumerate() {
            let mut record = vec![
                (index + 1).to_string(),
                row.authors_display(),
                row.title_display(),
                row.year_display(),
                row.subject_display(),
                row.birth_date_display(),
                row.top_work_display(),
            ];
            if self.include_ratings {
                record.push(row.rating_display());
            }
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Csv(e.into_error().into()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// 写入文件
    pub fn write_file(&self, path: &Path, rows: &[&EnrichedRow]) -> Result<(), ExportError> {
        let content = self.to_csv(rows)?;
        std::fs::write(path, content).map_err(|e| ExportError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        info!("💾 已导出 {} 行到 {}", rows.len(), path.display());
        Ok(())
    }
}
