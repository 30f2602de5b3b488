//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (登录 / 加载 / 展示 / 导出)
//!     ↓
//! services::EnrichmentPipeline (阅读列表 → 作者查询 → 关联)
//!     ↓
//! services::ViewController / CsvExporter (本地派生)
//!     ↓
//! clients::CatalogClient (Open Library HTTP)
//! ```
//!
//! 向下依赖：编排层 → services → clients

pub mod app;

pub use app::{App, DashboardReport};
