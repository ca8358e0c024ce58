use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::assets::decode::DecodedImage;
use crate::assets::loader::AssetLoader;
use crate::assets::reference::SourceAsset;
use crate::caption::Anchor;
use crate::foundation::config::EngineOpts;
use crate::foundation::core::Viewport;
use crate::foundation::error::{Fault, MemeError, MemeResult};
use crate::persist::client::PersistenceClient;
use crate::persist::record::{CompositionRecord, NewComposition};
use crate::render::frame::RenderFrame;
use crate::session::compositor::{Compositor, EngineState, LoadTicket, RequestToken};
use crate::session::scheduler::ResizeScheduler;

/// What the host renders: published after every change.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Increases with every publication.
    pub revision: u64,
    /// Engine state.
    pub state: EngineState,
    /// Last committed frame. While Loading this is the previous frame, if any.
    pub frame: Option<Arc<RenderFrame>>,
    /// Last surfaced fault.
    pub fault: Option<Fault>,
}

enum Msg {
    Select(SourceAsset),
    SetCaption(Anchor, String),
    Viewport(Viewport),
    Deselect,
    ReportFault(Fault),
    Export(oneshot::Sender<MemeResult<Vec<u8>>>),
    Draft(oneshot::Sender<MemeResult<NewComposition>>),
    Barrier(oneshot::Sender<()>),
    Shutdown,
    LoadDone {
        token: RequestToken,
        result: MemeResult<DecodedImage>,
    },
    ResizeElapsed {
        generation: u64,
    },
}

/// Handle to a composition session running on a Tokio task.
///
/// Commands are applied in order. Loads run concurrently; only the completion of the latest
/// selection can commit a frame. Viewport changes are debounced and coalesced.
pub struct MemeEngine {
    tx: mpsc::UnboundedSender<Msg>,
    snapshots: watch::Receiver<Snapshot>,
    task: Option<JoinHandle<()>>,
}

impl MemeEngine {
    /// Start a session on the current Tokio runtime.
    pub fn spawn(opts: &EngineOpts, loader: Arc<dyn AssetLoader>) -> MemeResult<Self> {
        let compositor = Compositor::from_opts(opts)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| MemeError::validation(format!("engine needs a tokio runtime: {e}")))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let weak = tx.downgrade();
        let scheduler = ResizeScheduler::new(opts.resize_quiet(), move |generation| {
            if let Some(tx) = weak.upgrade() {
                let _ = tx.send(Msg::ResizeElapsed { generation });
            }
        });

        let (snapshot_tx, snapshots) = watch::channel(Snapshot {
            revision: 0,
            state: compositor.state(),
            frame: None,
            fault: None,
        });
        let actor = Actor {
            compositor,
            loader,
            tx: tx.downgrade(),
            scheduler,
            pending_viewport: None,
            inflight: None,
            snapshot_tx,
            revision: 0,
        };
        let task = runtime.spawn(actor.run(rx));
        Ok(Self {
            tx,
            snapshots,
            task: Some(task),
        })
    }

    /// Select a source asset; the load starts immediately.
    pub fn select(&self, asset: SourceAsset) -> MemeResult<()> {
        self.send(Msg::Select(asset))
    }

    /// Edit the caption at `anchor`.
    pub fn set_caption(&self, anchor: Anchor, text: impl Into<String>) -> MemeResult<()> {
        self.send(Msg::SetCaption(anchor, text.into()))
    }

    /// Report a viewport change. Applied once changes stop for the quiet window.
    pub fn on_viewport_change(&self, viewport: Viewport) -> MemeResult<()> {
        self.send(Msg::Viewport(viewport))
    }

    /// Drop the current selection.
    pub fn deselect(&self) -> MemeResult<()> {
        self.send(Msg::Deselect)
    }

    /// State as of the latest snapshot.
    pub fn state(&self) -> EngineState {
        self.snapshots.borrow().state
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait until every command sent so far is applied and no load is in flight.
    pub async fn settled(&self) -> MemeResult<Snapshot> {
        let (reply, done) = oneshot::channel();
        self.send(Msg::Barrier(reply))?;
        done.await.map_err(|_| MemeError::SessionClosed)?;

        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.state != EngineState::Loading)
            .await
            .map_err(|_| MemeError::SessionClosed)?
            .clone();
        Ok(snapshot)
    }

    /// PNG bytes of the committed frame.
    pub async fn export(&self) -> MemeResult<Vec<u8>> {
        let (reply, rx) = oneshot::channel();
        self.send(Msg::Export(reply))?;
        rx.await.map_err(|_| MemeError::SessionClosed)?
    }

    /// Save payload for the committed frame.
    pub async fn draft(&self) -> MemeResult<NewComposition> {
        let (reply, rx) = oneshot::channel();
        self.send(Msg::Draft(reply))?;
        rx.await.map_err(|_| MemeError::SessionClosed)?
    }

    /// Persist the committed frame. Composition state is left untouched either way.
    pub async fn save(&self, client: &PersistenceClient) -> MemeResult<CompositionRecord> {
        let draft = self.draft().await?;
        let result = client.create(&draft).await;
        if let Err(err) = &result
            && let Some(fault) = err.fault()
        {
            let _ = self.send(Msg::ReportFault(fault));
        }
        result
    }

    /// Stop the session, cancelling any pending resize and in-flight load.
    pub async fn shutdown(mut self) {
        let _ = self.tx.send(Msg::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    fn send(&self, msg: Msg) -> MemeResult<()> {
        self.tx.send(msg).map_err(|_| MemeError::SessionClosed)
    }
}

struct Actor {
    compositor: Compositor,
    loader: Arc<dyn AssetLoader>,
    tx: mpsc::WeakUnboundedSender<Msg>,
    scheduler: ResizeScheduler,
    pending_viewport: Option<Viewport>,
    inflight: Option<JoinHandle<()>>,
    snapshot_tx: watch::Sender<Snapshot>,
    revision: u64,
}

impl Actor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Msg>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                Msg::Select(asset) => {
                    self.cancel_pending_work();
                    let ticket = self.compositor.select(asset);
                    self.absorb_pending_viewport();
                    self.start_load(ticket);
                    self.publish();
                }
                Msg::SetCaption(anchor, text) => {
                    if let Err(err) = self.compositor.set_caption(anchor, text) {
                        warn!("caption redraw failed: {err}");
                    }
                    self.publish();
                }
                Msg::Viewport(viewport) => self.on_viewport(viewport),
                Msg::ResizeElapsed { generation } => {
                    if !self.scheduler.is_current(generation) {
                        debug!(generation, "ignoring superseded resize");
                        continue;
                    }
                    self.scheduler.cancel();
                    if let Some(viewport) = self.pending_viewport.take() {
                        debug!(?viewport, "applying debounced viewport");
                        if let Err(err) = self.compositor.on_viewport_change(viewport) {
                            warn!("resize redraw failed: {err}");
                        }
                        self.publish();
                    }
                }
                Msg::Deselect => {
                    self.cancel_pending_work();
                    self.compositor.deselect();
                    self.absorb_pending_viewport();
                    self.publish();
                }
                Msg::ReportFault(fault) => {
                    self.compositor.report_fault(fault);
                    self.publish();
                }
                Msg::LoadDone { token, result } => {
                    let outcome = self.compositor.complete_load(token, result);
                    debug!(?outcome, "load completed");
                    self.publish();
                }
                Msg::Export(reply) => {
                    let _ = reply.send(self.compositor.export());
                }
                Msg::Draft(reply) => {
                    let _ = reply.send(self.compositor.draft());
                }
                Msg::Barrier(reply) => {
                    let _ = reply.send(());
                }
                Msg::Shutdown => break,
            }
        }
        self.cancel_pending_work();
        debug!("engine session closed");
    }

    fn on_viewport(&mut self, viewport: Viewport) {
        if self.compositor.asset().is_none() {
            // Nothing to redraw; the next selection picks it up.
            if let Err(err) = self.compositor.on_viewport_change(viewport) {
                warn!("viewport update failed: {err}");
            }
            return;
        }
        self.pending_viewport = Some(viewport);
        if let Err(err) = self.scheduler.schedule() {
            warn!("resize scheduling failed: {err}");
        }
    }

    fn start_load(&mut self, ticket: LoadTicket) {
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        self.inflight = Some(tokio::spawn(async move {
            let result = loader.load(&ticket.reference).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Msg::LoadDone {
                    token: ticket.token,
                    result,
                });
            }
        }));
    }

    /// Abort the in-flight load and disarm the resize timer. Late completions would be
    /// rejected by token anyway.
    fn cancel_pending_work(&mut self) {
        if let Some(load) = self.inflight.take() {
            load.abort();
        }
        self.scheduler.cancel();
    }

    /// Record a debounced viewport without waiting for the timer. Only redraws when Ready.
    fn absorb_pending_viewport(&mut self) {
        if let Some(viewport) = self.pending_viewport.take()
            && let Err(err) = self.compositor.on_viewport_change(viewport)
        {
            warn!("viewport update failed: {err}");
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.snapshot_tx.send_replace(Snapshot {
            revision: self.revision,
            state: self.compositor.state(),
            frame: self.compositor.frame().cloned(),
            fault: self.compositor.fault().cloned(),
        });
    }
}
