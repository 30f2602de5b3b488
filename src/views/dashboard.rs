//! 看板视图
//!
//! 把流水线状态和派生视图渲染成终端文本表格

use crate::services::{DerivedView, PipelineState};
use crate::utils::logging::truncate_text;

pub const TITLE: &str = "Admin Dashboard";
pub const LIST_ERROR_MESSAGE: &str = "Failed to fetch books";

const MAX_CELL_WIDTH: usize = 32;

const COLUMNS: [&str; 7] = [
    "S.No",
    "Author Name",
    "Title",
    "First Publish Year",
    "Subject",
    "Author Birth Date",
    "Author Top Work",
];

/// 渲染整个看板
///
/// 错误状态只显示错误信息，不显示表格
pub fn render(state: &PipelineState, view: &DerivedView<'_>, include_ratings: bool) -> String {
    let mut out = format!("{}\n\n", TITLE);

    match state {
        PipelineState::Error { .. } => {
            out.push_str(LIST_ERROR_MESSAGE);
            out.push('\n');
        }
        PipelineState::Idle | PipelineState::FetchingList => {
            out.push_str("Loading...\n");
        }
        PipelineState::Cancelled => {
            out.push_str("Session closed\n");
        }
        PipelineState::FetchingAuthors { pending } => {
            out.push_str(&render_table(view, include_ratings));
            out.push_str(&format!("Resolving author details ({} pending)...\n", pending));
        }
        PipelineState::Ready => {
            out.push_str(&render_table(view, include_ratings));
        }
    }

    out
}

/// 渲染当前页表格和分页信息
pub fn render_table(view: &DerivedView<'_>, include_ratings: bool) -> String {
    let mut header: Vec<String> = Vec::new();
    if include_ratings {
        header.push("Ratings Average".to_string());
    }
    header.extend(COLUMNS.iter().map(|c| c.to_string()));

    let body: Vec<Vec<String>> = view
        .page_rows()
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let mut cells = Vec::with_capacity(header.len());
            if include_ratings {
                cells.push(row.rating_display());
            }
            cells.extend([
                (view.first_serial() + offset).to_string(),
                row.authors_display(),
                row.title_display(),
                row.year_display(),
                row.subject_display(),
                row.birth_date_display(),
                row.top_work_display(),
            ]);
            cells
                .into_iter()
                .map(|cell| truncate_text(&cell, MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            body.iter()
                .map(|cells| cells[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&format_line(&header, &widths));
    out.push_str(&format!(
        "{}\n",
        widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("─┼─")
    ));
    for cells in &body {
        out.push_str(&format_line(cells, &widths));
    }
    out.push('\n');
    out.push_str(&render_footer(view));
    out
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    format!("{}\n", padded.join(" │ ").trim_end())
}

/// 分页信息；只有一页时不显示翻页控件
fn render_footer(view: &DerivedView<'_>) -> String {
    let total = view.total();
    let shown = view.page_rows().len();
    let range = if shown == 0 {
        format!("0–0 of {}", total)
    } else {
        let first = view.first_serial();
        format!("{}–{} of {}", first, first + shown - 1, total)
    };

    let mut footer = format!("Rows per page: {}    {}\n", view.page_size, range);
    if view.page_count() > 1 {
        let prev = if view.page > 0 { "‹ prev" } else { "      " };
        let next = if view.page + 1 < view.page_count() { "next ›" } else { "" };
        footer.push_str(&format!(
            "{}  page {}/{}  {}\n",
            prev,
            view.page + 1,
            view.page_count(),
            next
        ));
    }
    footer
}
