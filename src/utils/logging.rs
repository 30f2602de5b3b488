/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::services::LookupStats;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能被多次调用
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `base_url`: 书目 API 地址
/// - `limit`: 阅读列表最大条目数
pub fn log_startup(base_url: &str, limit: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 阅读列表看板");
    info!("🌐 书目API: {}", base_url);
    info!("📊 阅读列表上限: {}", limit);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `total_rows`: 阅读列表行数
/// - `shown_rows`: 过滤后的行数
/// - `stats`: 查询统计
/// - `csv_path`: 实际写入的 CSV 文件，没有写文件时为 None
pub fn print_final_stats(
    total_rows: usize,
    shown_rows: usize,
    stats: &LookupStats,
    csv_path: Option<&str>,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for line in final_stats_lines(total_rows, shown_rows, stats, csv_path) {
        info!("{}", line);
    }
}

fn final_stats_lines(
    total_rows: usize,
    shown_rows: usize,
    stats: &LookupStats,
    csv_path: Option<&str>,
) -> Vec<String> {
    let mut lines = vec![
        "=".repeat(60),
        format!("📚 阅读列表: {} 本，过滤后 {} 本", total_rows, shown_rows),
        format!(
            "✅ 作者: 查询 {} / 找到 {} / 未找到 {} / 失败 {}",
            stats.authors_dispatched, stats.authors_found, stats.authors_absent, stats.authors_failed
        ),
    ];
    if stats.ratings_dispatched > 0 {
        lines.push(format!(
            "⭐ 评分: 查询 {} / 失败 {}",
            stats.ratings_dispatched, stats.ratings_failed
        ));
    }
    lines.push("=".repeat(60));
    if let Some(path) = csv_path {
        lines.push(format!("\nCSV已保存至: {}", path));
    }
    lines
}

/// 截断长文本用于显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
