//! 会话取消信号
//!
//! 视图销毁（或收到 Ctrl-C）时通过 `CancelHandle` 通知流水线，
//! 流水线丢弃所有进行中的请求

use tokio::sync::watch;

/// 取消信号的发送端，drop 也视为取消
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// 取消信号的接收端
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

/// 创建一对取消信号
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx: Some(rx) })
}

impl CancelHandle {
    pub fn cancel(&self) {
        // 接收端全部 drop 时发送失败，此时已无人需要通知
        let _ = self.tx.send(true);
    }
}

impl CancelToken {
    /// 不会被取消的令牌，用于不需要销毁的场景
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.rx {
            Some(rx) => *rx.borrow() || rx.has_changed().is_err(),
            None => false,
        }
    }

    /// 等待取消
    pub async fn cancelled(&self) {
        let Some(mut rx) = self.rx.clone() else {
            return std::future::pending().await;
        };
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // 发送端已 drop
                return;
            }
        }
    }
}
