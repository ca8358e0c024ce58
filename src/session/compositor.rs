use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::assets::decode::DecodedImage;
use crate::assets::reference::{AssetReference, SourceAsset};
use crate::caption::{Anchor, Captions};
use crate::encode::png::Exporter;
use crate::foundation::config::EngineOpts;
use crate::foundation::core::{ContainerBounds, Viewport};
use crate::foundation::error::{Fault, FaultKind, MemeError, MemeResult};
use crate::layout::fit::fit_into;
use crate::persist::record::NewComposition;
use crate::render::frame::RenderFrame;
use crate::render::surface::{ImagePaint, RenderSurface};
use crate::render::text::{TextStroker, font_size_px};

/// Lifecycle state of a composition session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum EngineState {
    /// No asset selected.
    Idle,
    /// Asset selected, decode in flight.
    Loading,
    /// A frame is committed; export and save are allowed.
    Ready,
    /// Load or first draw failed; nothing is committed.
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Monotonic id of an asset selection. Only the latest token may commit a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// What the caller must load after [`Compositor::select`].
#[derive(Clone, Debug)]
pub struct LoadTicket {
    /// Token to hand back to [`Compositor::complete_load`].
    pub token: RequestToken,
    /// Reference to resolve.
    pub reference: AssetReference,
}

/// Result of delivering a load completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The load was current and a frame was committed.
    Committed,
    /// The load was superseded (or the asset deselected) and was ignored.
    Stale,
    /// The load was current but loading or drawing failed.
    Failed,
}

struct LoadedImage {
    decoded: Arc<DecodedImage>,
    paint: ImagePaint,
}

/// Synchronous composition state machine.
///
/// Owns the render surface exclusively. Every composition clears and redraws the whole surface
/// and only a fully drawn frame is committed, so a failure never exposes a partial frame.
pub struct Compositor {
    bounds: ContainerBounds,
    viewport: Viewport,
    token: RequestToken,
    state: EngineState,
    asset: Option<SourceAsset>,
    image: Option<LoadedImage>,
    captions: Captions,
    stroker: Option<TextStroker>,
    surface: Option<RenderSurface>,
    frame: Option<Arc<RenderFrame>>,
    fault: Option<Fault>,
}

impl Compositor {
    /// Idle compositor. Captions can only be drawn when `stroker` is present.
    pub fn new(bounds: ContainerBounds, viewport: Viewport, stroker: Option<TextStroker>) -> Self {
        Self {
            bounds,
            viewport: viewport.sanitized(),
            token: RequestToken(0),
            state: EngineState::Idle,
            asset: None,
            image: None,
            captions: Captions::default(),
            stroker,
            surface: None,
            frame: None,
            fault: None,
        }
    }

    /// Build from options, loading the caption font if one is configured.
    pub fn from_opts(opts: &EngineOpts) -> MemeResult<Self> {
        let stroker = opts
            .font_path
            .as_ref()
            .map(TextStroker::from_path)
            .transpose()?;
        Ok(Self::new(opts.bounds, opts.initial_viewport(), stroker))
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Last committed frame, if any. While Loading this is the prior frame.
    pub fn frame(&self) -> Option<&Arc<RenderFrame>> {
        self.frame.as_ref()
    }

    /// Last surfaced fault, cleared by the next successful commit or selection.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Selected asset, if any.
    pub fn asset(&self) -> Option<&SourceAsset> {
        self.asset.as_ref()
    }

    /// Current caption texts.
    pub fn captions(&self) -> &Captions {
        &self.captions
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Token of the latest selection.
    pub fn current_token(&self) -> RequestToken {
        self.token
    }

    /// Fit box in effect: the container clamped by the viewport.
    pub fn effective_bounds(&self) -> ContainerBounds {
        self.bounds.clamp_to(self.viewport)
    }

    /// Select a new asset. Invalidates any in-flight load and resets both captions.
    pub fn select(&mut self, asset: SourceAsset) -> LoadTicket {
        self.token = RequestToken(self.token.0 + 1);
        debug!(token = self.token.0, asset = %asset.id, "select");

        let reference = asset.reference.clone();
        self.asset = Some(asset);
        self.image = None;
        self.captions = Captions::default();
        self.fault = None;
        self.state = EngineState::Loading;
        LoadTicket {
            token: self.token,
            reference,
        }
    }

    /// Drop the selection and everything derived from it.
    pub fn deselect(&mut self) {
        self.token = RequestToken(self.token.0 + 1);
        debug!(token = self.token.0, "deselect");

        self.asset = None;
        self.image = None;
        self.captions = Captions::default();
        self.frame = None;
        self.fault = None;
        self.state = EngineState::Idle;
        if let Some(surface) = self.surface.take() {
            surface.release();
        }
    }

    /// Deliver the completion of the load started for `token`.
    pub fn complete_load(
        &mut self,
        token: RequestToken,
        result: MemeResult<DecodedImage>,
    ) -> LoadOutcome {
        if token != self.token || self.state != EngineState::Loading {
            debug!(
                token = token.0,
                current = self.token.0,
                "ignoring stale load completion"
            );
            return LoadOutcome::Stale;
        }

        let loaded = result.and_then(|decoded| {
            if decoded.width == 0 || decoded.height == 0 {
                let reference = self
                    .asset
                    .as_ref()
                    .map(|a| a.reference.describe())
                    .unwrap_or_default();
                return Err(MemeError::asset_load(reference, "image has no pixels"));
            }
            let paint = ImagePaint::from_decoded(&decoded)?;
            Ok(LoadedImage {
                decoded: Arc::new(decoded),
                paint,
            })
        });

        match loaded {
            Ok(image) => {
                self.image = Some(image);
                match self.compose() {
                    Ok(frame) => {
                        self.commit(frame);
                        LoadOutcome::Committed
                    }
                    Err(err) => {
                        self.fail(err);
                        LoadOutcome::Failed
                    }
                }
            }
            Err(err) => {
                self.fail(err);
                LoadOutcome::Failed
            }
        }
    }

    /// Edit one caption. Redraws immediately when Ready; otherwise the text is kept for the
    /// next composition.
    pub fn set_caption(&mut self, anchor: Anchor, text: impl Into<String>) -> MemeResult<()> {
        if !self.captions.set(anchor, text) {
            return Ok(());
        }
        self.recompose_if_ready()
    }

    /// Apply a viewport change. Redraws immediately when Ready.
    pub fn on_viewport_change(&mut self, viewport: Viewport) -> MemeResult<()> {
        let viewport = viewport.sanitized();
        if viewport == self.viewport {
            return Ok(());
        }
        self.viewport = viewport;
        self.recompose_if_ready()
    }

    /// Record a fault raised outside the compositor (e.g. a failed save) without changing state.
    pub fn report_fault(&mut self, fault: Fault) {
        warn!(kind = ?fault.kind, "{}", fault.message);
        self.fault = Some(fault);
    }

    /// PNG bytes of the committed frame. Only valid in Ready.
    pub fn export(&self) -> MemeResult<Vec<u8>> {
        Exporter::encode_png(self.ready_frame()?)
    }

    /// Save payload for the committed frame. Only valid in Ready.
    pub fn draft(&self) -> MemeResult<NewComposition> {
        Ok(NewComposition::from_frame(self.ready_frame()?))
    }

    fn ready_frame(&self) -> MemeResult<&RenderFrame> {
        match (&self.state, &self.frame) {
            (EngineState::Ready, Some(frame)) => Ok(frame.as_ref()),
            _ => Err(MemeError::NotReady(self.state)),
        }
    }

    fn recompose_if_ready(&mut self) -> MemeResult<()> {
        if self.state != EngineState::Ready {
            return Ok(());
        }
        match self.compose() {
            Ok(frame) => {
                self.commit(frame);
                Ok(())
            }
            Err(err) => {
                // The previously committed frame stays visible and exportable.
                if let Some(fault) = err.fault() {
                    self.report_fault(fault);
                }
                Err(err)
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(token = self.token.0))]
    fn compose(&mut self) -> MemeResult<Arc<RenderFrame>> {
        let (Some(asset), Some(image)) = (&self.asset, &self.image) else {
            return Err(MemeError::draw("no decoded image to compose"));
        };

        let layout = fit_into(
            image.decoded.width,
            image.decoded.height,
            self.bounds.clamp_to(self.viewport),
        );
        let mut surface = match self.surface.take() {
            Some(mut surface) => {
                surface.reconfigure(layout, self.viewport.scale)?;
                surface
            }
            None => RenderSurface::acquire(layout, self.viewport.scale)?,
        };

        surface.draw_image(&image.paint);
        if !self.captions.is_blank() {
            let stroker = self
                .stroker
                .as_mut()
                .ok_or_else(|| MemeError::draw("no caption font configured"))?;
            let size = font_size_px(layout.width);
            for caption in self.captions.captions() {
                stroker.draw(&mut surface, &caption, layout.width, layout.height, size)?;
            }
        }

        let pixels = surface.commit();
        let frame = RenderFrame {
            layout,
            scale: surface.scale(),
            asset: asset.clone(),
            image: image.decoded.clone(),
            captions: self.captions.clone(),
            pixels,
        };
        self.surface = Some(surface);
        debug!(
            width = layout.width,
            height = layout.height,
            scale = frame.scale,
            "composed frame"
        );
        Ok(Arc::new(frame))
    }

    fn commit(&mut self, frame: Arc<RenderFrame>) {
        self.frame = Some(frame);
        self.fault = None;
        self.state = EngineState::Ready;
    }

    fn fail(&mut self, err: MemeError) {
        self.image = None;
        self.frame = None;
        self.state = EngineState::Failed;
        let fault = err.fault().unwrap_or_else(|| Fault {
            kind: FaultKind::DrawFailed,
            message: err.to_string(),
        });
        self.report_fault(fault);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/compositor.rs"]
mod tests;
