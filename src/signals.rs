//! 关闭信号处理
//!
//! 把操作系统的终止信号统一转换为一条广播消息，
//! 调度循环据此发起协作式停止

use crate::error::Result;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[cfg(unix)]
use signal_hook::consts::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook_tokio::Signals;

/// 注册关闭信号监听
///
/// Unix下监听SIGINT与SIGTERM，其余平台退回tokio的Ctrl+C监听。
/// 任一信号到达时向`shutdown_tx`广播一条消息。
pub async fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>) -> Result<()> {
    #[cfg(unix)]
    {
        setup_unix_signals(shutdown_tx)
    }
    #[cfg(not(unix))]
    {
        setup_ctrl_c_handler(shutdown_tx);
        Ok(())
    }
}

#[cfg(unix)]
fn setup_unix_signals(shutdown_tx: broadcast::Sender<()>) -> Result<()> {
    use futures::stream::StreamExt;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let handle = signals.handle();

    tokio::spawn(async move {
        while let Some(signal) = signals.next().await {
            match signal {
                SIGINT | SIGTERM => {
                    let name = if signal == SIGINT { "SIGINT" } else { "SIGTERM" };
                    info!("接收到 {name} 信号，开始优雅关闭...");
                    if shutdown_tx.send(()).is_err() {
                        error!("关闭信号没有任何接收方");
                    }
                    break;
                }
                other => {
                    warn!("接收到未监听的信号: {other}");
                }
            }
        }
        handle.close();
    });

    Ok(())
}

/// 注册Ctrl+C监听任务
#[cfg(not(unix))]
fn setup_ctrl_c_handler(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("监听 Ctrl+C 失败: {e}");
            return;
        }
        info!("接收到 Ctrl+C，开始优雅关闭...");
        if shutdown_tx.send(()).is_err() {
            error!("关闭信号没有任何接收方");
        }
    });
}

/// 阻塞到关闭信号到达为止
///
/// 发送端全部关闭时同样返回，调用方无须区分两种情况。
pub async fn wait_for_shutdown(mut shutdown_rx: broadcast::Receiver<()>) {
    match shutdown_rx.recv().await {
        Ok(()) => {
            info!("收到关闭请求，准备停止调度...");
        }
        Err(e) => {
            error!("关闭信号通道异常: {e}");
        }
    }
}
