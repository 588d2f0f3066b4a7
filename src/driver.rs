use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use crate::{
    activity::ActivityKind,
    clock::TokioClock,
    overlay::OverlaySurface,
    timer::{BlockController, BlockQuery, BlockQueryResponse, ControllerSnapshot},
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub type SharedController<S> = Arc<Mutex<BlockController<TokioClock, S>>>;

/// Runs a controller on tokio: one task sleeps until the controller's next
/// deadline and feeds it activity from a channel.
pub struct SessionDriver<S: OverlaySurface> {
    controller: SharedController<S>,
    activity_tx: Option<mpsc::UnboundedSender<ActivityKind>>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl<S> SessionDriver<S>
where
    S: OverlaySurface + Send + 'static,
    S::Element: Send + 'static,
{
    pub fn new(controller: BlockController<TokioClock, S>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            activity_tx: None,
            handle: None,
            cancel_token: None,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            bail!("driver already running");
        }

        self.controller.lock().await.start();

        let cancel_token = CancellationToken::new();
        let (activity_tx, activity_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drive_loop(
            self.controller.clone(),
            activity_rx,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.activity_tx = Some(activity_tx);
        Ok(())
    }

    pub fn notify_activity(&self, kind: ActivityKind) -> Result<()> {
        let tx = self
            .activity_tx
            .as_ref()
            .ok_or_else(|| anyhow!("driver is not running"))?;
        tx.send(kind).context("driver loop has exited")
    }

    pub async fn query(&self, query: BlockQuery) -> BlockQueryResponse {
        self.controller.lock().await.answer(query)
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        self.controller.lock().await.snapshot()
    }

    pub fn controller(&self) -> SharedController<S> {
        self.controller.clone()
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.activity_tx = None;
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("driver task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

async fn drive_loop<S>(
    controller: SharedController<S>,
    mut activity_rx: mpsc::UnboundedReceiver<ActivityKind>,
    cancel_token: CancellationToken,
) where
    S: OverlaySurface + Send + 'static,
    S::Element: Send + 'static,
{
    loop {
        let deadline = {
            let guard = controller.lock().await;
            guard
                .next_deadline_ms()
                .map(|at_ms| guard.clock().instant_at(at_ms))
        };

        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("driver loop shutting down");
                break;
            }
            _ = sleep_until(deadline) => {
                controller.lock().await.advance();
            }
            activity = activity_rx.recv() => match activity {
                Some(kind) => {
                    controller.lock().await.on_activity(kind);
                }
                None => {
                    log_warn!("activity channel closed; driver loop exiting");
                    break;
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
