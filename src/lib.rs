//! # Book Dashboard
//!
//! 一个读取 Open Library 阅读列表并补全作者信息的管理看板
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只负责 HTTP 请求和响应解析
//! - `CatalogClient` - 阅读列表 / 作者搜索 / 书名搜索
//!
//! ### ② 模型层（Models）
//! - `models/` - `WorkRecord` / `AuthorRecord` / `EnrichedRow` 和会话缓存
//!
//! ### ③ 业务能力层（Services）
//! - `EnrichmentPipeline` - 状态机驱动的数据补全流水线
//! - `ViewController` - 过滤 / 排序 / 分页
//! - `CsvExporter` - CSV 导出
//! - `SessionGate` - 登录校验
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 登录 → 加载 → 展示 → 导出
//!
//! 所有数据一次性拉取，过滤 / 排序 / 分页都在本地完成，上游没有查询能力。
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod views;

// 重新导出常用类型
pub use clients::{CatalogApi, CatalogClient};
pub use config::Config;
pub use error::{AppError, AppResult, CatalogError};
pub use models::{AuthorRecord, EnrichedRow, WorkRecord};
pub use orchestrator::{App, DashboardReport};
pub use services::{EnrichmentPipeline, PipelineState, ViewController};
