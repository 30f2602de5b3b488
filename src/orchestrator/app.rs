//! 看板应用 - 编排层
//!
//! ## 职责
//!
//! 1. **登录**：用 `SessionGate` 校验登录表单
//! 2. **加载**：运行一次 `EnrichmentPipeline`
//! 3. **展示**：按视图状态派生并渲染表格
//! 4. **导出**：把过滤 + 排序后的全部行写成 CSV
//! 5. **统计**：输出查询统计
//!
//! 不做具体业务判断，只做调度

use std::future::Future;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::clients::{CatalogApi, CatalogClient};
use crate::config::Config;
use crate::services::{
    cancel_pair, CancelHandle, CancelToken, CsvExporter, EnrichmentPipeline, PipelineState, SessionGate,
    SortKey, ViewController,
};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::views::dashboard;

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub state: PipelineState,
    /// 渲染后的看板文本
    pub rendered: String,
    /// 阅读列表总行数
    pub total_rows: usize,
    /// 过滤后的行数（也是导出的行数）
    pub shown_rows: usize,
    /// CSV 文本，只有 Ready 时才有
    pub csv: Option<String>,
}

/// 应用主结构
pub struct App<C = CatalogClient> {
    config: Config,
    client: C,
}

impl App<CatalogClient> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config.catalog_base_url, config.reading_list_limit);

        let client = CatalogClient::new(&config).context("无法创建书目客户端")?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: CatalogApi> App<C> {
    /// 使用自定义的书目客户端
    pub fn with_client(config: Config, client: C) -> Self {
        Self { config, client }
    }

    /// 运行应用主逻辑，Ctrl-C 会取消会话
    pub async fn run(self) -> Result<DashboardReport> {
        let (handle, token) = cancel_pair();
        let ctrl_c = tokio::spawn(cancel_on_interrupt(handle, tokio::signal::ctrl_c()));

        let result = self.run_session(&token).await;
        ctrl_c.abort();

        let report = result?;
        println!("{}", report.rendered);

        if let PipelineState::Error { message } = &report.state {
            anyhow::bail!("{}: {}", dashboard::LIST_ERROR_MESSAGE, message);
        }
        Ok(report)
    }

    /// 登录 → 加载 → 展示 → 导出
    pub async fn run_session(self, cancel: &CancelToken) -> Result<DashboardReport> {
        let gate = SessionGate::new(&self.config);
        gate.check(&self.config.login_email, &self.config.login_password)?;

        let mut view = self.build_view()?;

        let mut pipeline = EnrichmentPipeline::new(self.client, self.config.fetch_ratings);
        let state = pipeline
            .run(cancel, |session| {
                debug!(
                    "进度: {:?}，已缓存 {} 位作者",
                    session.state(),
                    session.authors().len()
                );
            })
            .await
            .clone();

        let rows = pipeline.rows();
        let derived = view.derive(&rows);
        let rendered = dashboard::render(&state, &derived, self.config.fetch_ratings);

        let mut written_path = None;
        let csv = if state == PipelineState::Ready {
            let exporter = CsvExporter::new(self.config.fetch_ratings);
            let content = exporter.to_csv(&derived.rows)?;
            if !self.config.csv_output.is_empty() {
                exporter
                    .write_file(Path::new(&self.config.csv_output), &derived.rows)
                    .with_context(|| format!("无法写入CSV: {}", self.config.csv_output))?;
                written_path = Some(self.config.csv_output.as_str());
            }
            Some(content)
        } else {
            None
        };

        match &state {
            PipelineState::Error { message } => error!("❌ 会话失败: {}", message),
            PipelineState::Cancelled => info!("会话已取消，未导出CSV"),
            _ => print_final_stats(
                rows.len(),
                derived.total(),
                pipeline.session().stats(),
                written_path,
            ),
        }

        Ok(DashboardReport {
            total_rows: rows.len(),
            shown_rows: derived.total(),
            state,
            rendered,
            csv,
        })
    }

    /// 根据配置构建初始视图状态
    fn build_view(&self) -> Result<ViewController> {
        let mut view = ViewController::new(self.config.page_size);
        view.set_search(self.config.search_text.clone());

        if let Some(raw) = &self.config.sort_key {
            let key: SortKey = raw.parse()?;
            view.toggle_sort(key);
            if self.config.sort_descending {
                view.toggle_sort(key);
            }
        }

        Ok(view)
    }
}

/// 收到中断信号时取消会话
///
/// 信号注册失败时一直持有 `handle`（drop 会被视为取消），直到任务被 abort
async fn cancel_on_interrupt<F>(handle: CancelHandle, signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("收到 Ctrl-C，正在取消会话...");
            handle.cancel();
        }
        Err(e) => {
            warn!("⚠️ 无法监听 Ctrl-C: {}，会话不可中断", e);
            std::future::pending::<()>().await;
        }
    }
}
