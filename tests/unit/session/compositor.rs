use crate::foundation::core::LogicalLayout;
use crate::foundation::error::FaultKind;

use super::*;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Impact.ttf",
    "/Library/Fonts/Arial.ttf",
];

fn stroker() -> Option<TextStroker> {
    let from_env = std::env::var("MEMEFORGE_TEST_FONT").ok();
    let bytes = from_env
        .iter()
        .map(String::as_str)
        .chain(FONT_CANDIDATES.iter().copied())
        .find_map(|p| std::fs::read(p).ok());
    let Some(bytes) = bytes else {
        eprintln!("skipping: no TrueType font found (set MEMEFORGE_TEST_FONT)");
        return None;
    };
    Some(TextStroker::from_font_bytes(bytes).unwrap())
}

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DecodedImage {
    let data = rgba
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    DecodedImage::from_rgba8(width, height, data).unwrap()
}

fn asset(id: u32) -> SourceAsset {
    SourceAsset::template(id, format!("Template {id}"), "https://example.test/t.png").unwrap()
}

fn compositor() -> Compositor {
    Compositor::new(ContainerBounds::default(), Viewport::default(), None)
}

fn ready(c: &mut Compositor, image: DecodedImage) {
    let ticket = c.select(asset(1));
    assert_eq!(c.complete_load(ticket.token, Ok(image)), LoadOutcome::Committed);
    assert_eq!(c.state(), EngineState::Ready);
}

#[test]
fn starts_idle_and_refuses_export() {
    let c = compositor();
    assert_eq!(c.state(), EngineState::Idle);
    assert!(c.frame().is_none());
    assert!(matches!(
        c.export(),
        Err(MemeError::NotReady(EngineState::Idle))
    ));
}

#[test]
fn select_enters_loading_and_refuses_export() {
    let mut c = compositor();
    let first = c.select(asset(1));
    let second = c.select(asset(2));
    assert!(second.token > first.token);
    assert_eq!(c.state(), EngineState::Loading);
    assert!(matches!(
        c.export(),
        Err(MemeError::NotReady(EngineState::Loading))
    ));
    assert!(matches!(
        c.draft(),
        Err(MemeError::NotReady(EngineState::Loading))
    ));
}

#[test]
fn landscape_image_fits_container_width() {
    let mut c = compositor();
    ready(&mut c, solid(800, 400, [10, 20, 30, 255]));
    let frame = c.frame().unwrap();
    assert_eq!(
        frame.layout,
        LogicalLayout {
            width: 500.0,
            height: 250.0
        }
    );
    assert_eq!(frame.physical_size(), (500, 250));
    assert_eq!(frame.pixels.data[..4], [10, 20, 30, 255]);
}

#[test]
fn superseded_load_never_commits() {
    let mut c = compositor();
    let a = c.select(asset(1));
    let b = c.select(asset(2));

    assert_eq!(
        c.complete_load(a.token, Ok(solid(4, 4, [255, 0, 0, 255]))),
        LoadOutcome::Stale
    );
    assert_eq!(c.state(), EngineState::Loading);
    assert!(c.frame().is_none());

    assert_eq!(
        c.complete_load(b.token, Ok(solid(4, 4, [0, 0, 255, 255]))),
        LoadOutcome::Committed
    );
    assert_eq!(c.frame().unwrap().asset.id, asset(2).id);

    // A late duplicate of A must not disturb B's frame.
    assert_eq!(
        c.complete_load(a.token, Ok(solid(4, 4, [255, 0, 0, 255]))),
        LoadOutcome::Stale
    );
    assert_eq!(c.frame().unwrap().pixels.data[..4], [0, 0, 255, 255]);
}

#[test]
fn failed_load_surfaces_asset_fault() {
    let mut c = compositor();
    let ticket = c.select(asset(1));
    let outcome = c.complete_load(
        ticket.token,
        Err(MemeError::asset_load("https://example.test/t.png", "HTTP 404")),
    );
    assert_eq!(outcome, LoadOutcome::Failed);
    assert_eq!(c.state(), EngineState::Failed);
    assert!(c.frame().is_none());
    assert_eq!(c.fault().unwrap().kind, FaultKind::AssetLoadFailed);
    assert!(matches!(
        c.export(),
        Err(MemeError::NotReady(EngineState::Failed))
    ));

    // Re-selecting recovers.
    let ticket = c.select(asset(1));
    assert!(c.fault().is_none());
    c.complete_load(ticket.token, Ok(solid(2, 2, [1, 2, 3, 255])));
    assert_eq!(c.state(), EngineState::Ready);
}

#[test]
fn zero_sized_image_is_an_asset_failure() {
    let mut c = compositor();
    let ticket = c.select(asset(1));
    let empty = DecodedImage {
        width: 0,
        height: 0,
        rgba8_premul: Arc::new(Vec::new()),
    };
    assert_eq!(c.complete_load(ticket.token, Ok(empty)), LoadOutcome::Failed);
    assert_eq!(c.fault().unwrap().kind, FaultKind::AssetLoadFailed);
}

#[test]
fn export_is_idempotent() {
    let mut c = compositor();
    ready(&mut c, solid(300, 200, [200, 100, 50, 255]));
    let a = c.export().unwrap();
    let b = c.export().unwrap();
    assert_eq!(a, b);
    assert_eq!(&a[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn identical_inputs_produce_identical_frames() {
    let mut a = compositor();
    let mut b = compositor();
    ready(&mut a, solid(640, 480, [90, 10, 200, 255]));
    ready(&mut b, solid(640, 480, [90, 10, 200, 255]));
    assert_eq!(a.frame().unwrap().pixels, b.frame().unwrap().pixels);
}

#[test]
fn empty_captions_match_the_plain_image() {
    let image = solid(120, 60, [40, 80, 120, 255]);
    let mut c = compositor();
    ready(&mut c, image.clone());
    c.set_caption(Anchor::Top, "").unwrap();
    c.set_caption(Anchor::Bottom, "").unwrap();

    let mut surface = RenderSurface::acquire(c.frame().unwrap().layout, 1.0).unwrap();
    surface.draw_image(&ImagePaint::from_decoded(&image).unwrap());
    assert_eq!(c.frame().unwrap().pixels, surface.commit());
}

#[test]
fn caption_without_font_keeps_prior_frame() {
    let mut c = compositor();
    ready(&mut c, solid(100, 100, [0, 255, 0, 255]));
    let before = c.frame().unwrap().clone();

    let err = c.set_caption(Anchor::Top, "hello").unwrap_err();
    assert!(matches!(err, MemeError::DrawFailed(_)));
    assert_eq!(c.state(), EngineState::Ready);
    assert!(Arc::ptr_eq(c.frame().unwrap(), &before));
    assert_eq!(c.fault().unwrap().kind, FaultKind::DrawFailed);
    assert!(c.export().is_ok());
}

#[test]
fn select_resets_captions() {
    let mut c = compositor();
    c.set_caption(Anchor::Top, "top").unwrap();
    c.set_caption(Anchor::Bottom, "bottom").unwrap();
    c.select(asset(3));
    assert!(c.captions().is_blank());
}

#[test]
fn captions_edited_while_loading_apply_on_commit() {
    let Some(stroker) = stroker() else {
        return;
    };
    let mut c = Compositor::new(ContainerBounds::default(), Viewport::default(), Some(stroker));
    let ticket = c.select(asset(1));
    c.set_caption(Anchor::Bottom, "LATER").unwrap();
    assert!(c.frame().is_none());

    c.complete_load(ticket.token, Ok(solid(500, 500, [0, 0, 255, 255])));
    let frame = c.frame().unwrap();
    assert_eq!(frame.captions.bottom, "LATER");
    let has_white = frame
        .pixels
        .data
        .chunks_exact(4)
        .any(|p| p == [255, 255, 255, 255]);
    assert!(has_white);
}

#[test]
fn viewport_scale_changes_backing_raster_only() {
    let mut c = compositor();
    ready(&mut c, solid(800, 400, [5, 5, 5, 255]));
    c.on_viewport_change(Viewport {
        width: 1024.0,
        height: 768.0,
        scale: 2.0,
    })
    .unwrap();
    let frame = c.frame().unwrap();
    assert_eq!(frame.layout.width, 500.0);
    assert_eq!(frame.physical_size(), (1000, 500));
}

#[test]
fn narrow_viewport_shrinks_layout() {
    let mut c = compositor();
    ready(&mut c, solid(800, 400, [5, 5, 5, 255]));
    c.on_viewport_change(Viewport {
        width: 300.0,
        height: 800.0,
        scale: 1.0,
    })
    .unwrap();
    assert_eq!(
        c.frame().unwrap().layout,
        LogicalLayout {
            width: 300.0,
            height: 150.0
        }
    );
}

#[test]
fn viewport_change_while_loading_applies_later() {
    let mut c = compositor();
    let ticket = c.select(asset(1));
    c.on_viewport_change(Viewport {
        width: 500.0,
        height: 500.0,
        scale: 3.0,
    })
    .unwrap();
    assert!(c.frame().is_none());
    c.complete_load(ticket.token, Ok(solid(10, 10, [9, 9, 9, 255])));
    assert_eq!(c.frame().unwrap().physical_size(), (30, 30));
}

#[test]
fn oversized_raster_fails_without_losing_frame() {
    let mut c = compositor();
    ready(&mut c, solid(100, 100, [9, 9, 9, 255]));
    let before = c.frame().unwrap().clone();
    let err = c
        .on_viewport_change(Viewport {
            width: 500.0,
            height: 500.0,
            scale: 1000.0,
        })
        .unwrap_err();
    assert!(matches!(err, MemeError::DrawFailed(_)));
    assert!(Arc::ptr_eq(c.frame().unwrap(), &before));
    assert_eq!(c.state(), EngineState::Ready);
}

#[test]
fn deselect_returns_to_idle_and_drops_late_loads() {
    let mut c = compositor();
    let ticket = c.select(asset(1));
    c.deselect();
    assert_eq!(c.state(), EngineState::Idle);
    assert_eq!(
        c.complete_load(ticket.token, Ok(solid(2, 2, [0, 0, 0, 255]))),
        LoadOutcome::Stale
    );
    assert_eq!(c.state(), EngineState::Idle);
    assert!(c.frame().is_none());
}

#[test]
fn draft_reflects_committed_frame() {
    let mut c = compositor();
    ready(&mut c, solid(10, 10, [9, 9, 9, 255]));
    let draft = c.draft().unwrap();
    assert_eq!(draft.template_name, "Template 1");
    assert_eq!(draft.image_url, "https://example.test/t.png");
}
