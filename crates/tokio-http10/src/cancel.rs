//! キャンセル通知
//!
//! `tokio::sync::watch` を使った軽量なキャンセルトークン。
//!
//! ```ignore
//! let (handle, token) = CancelToken::new();
//! let task = tokio::spawn(async move { client.send_with_cancel(request, token).await });
//! handle.cancel();
//! ```

use tokio::sync::watch;

/// キャンセルを通知する側
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// キャンセルを通知
    ///
    /// 既にキャンセル済みの場合は何もしない。
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// トークンを追加で作成
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: Some(self.tx.subscribe()),
        }
    }
}

/// キャンセルを受け取る側
///
/// クローンしたトークンはすべて同じ通知を受け取る。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// 通知側とトークンを作成
    pub fn new() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelToken { rx: Some(rx) })
    }

    /// キャンセルされないトークンを作成
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// キャンセル済みかどうか
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// キャンセルされるまで待つ
    ///
    /// 通知側がキャンセルせずに破棄された場合は永遠に完了しない。
    pub async fn cancelled(&self) {
        let Some(mut rx) = self.rx.clone() else {
            return std::future::pending().await;
        };
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_cancel() {
        let (handle, token) = CancelToken::new();
        assert!(!token.is_cancelled());

        let waiter = token.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        handle.cancel();
        assert!(token.is_cancelled());
        assert!(handle.token().is_cancelled());
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_never() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
        let result = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dropped_handle_never_fires() {
        let (handle, token) = CancelToken::new();
        drop(handle);
        let result = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(result.is_err());
        assert!(!token.is_cancelled());
    }
}
