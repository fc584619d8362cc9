use lava_blob::color::{Hsla, Rgba};
use lava_blob::config::LampConfig;
use lava_blob::paint::{
    make_painter, sample_stops, Canvas, Painter, PainterKind, RasterPainter, StaticPainter,
    Viewport,
};
use lava_blob::sim::{Blob, Ripple, Scene};

fn scene<'a>(blobs: &'a [Blob], ripples: &'a [Ripple], minimized: bool) -> Scene<'a> {
    Scene {
        width: 120.0,
        height: 200.0,
        blobs,
        ripples,
        hue: 240.0,
        minimized,
        minimized_height: 60.0,
    }
}

fn brightness(px: [u8; 4]) -> u32 {
    px[0] as u32 + px[1] as u32 + px[2] as u32
}

fn close(a: [u8; 4], b: [u8; 3], tol: i32) -> bool {
    (0..3).all(|i| (a[i] as i32 - b[i] as i32).abs() <= tol)
}

// ── Canvas ──────────────────────────────────────────────────────────────────

#[test]
fn sample_stops_interpolates_and_holds_ends() {
    let stops = [
        (0.0, Rgba::new(0.0, 0.0, 0.0, 1.0)),
        (1.0, Rgba::new(200.0, 100.0, 50.0, 0.0)),
    ];
    let mid = sample_stops(&stops, 0.5);
    assert_eq!(mid.to_u8(), [100, 50, 25]);
    assert!((mid.a - 0.5).abs() < 1e-6);
    assert_eq!(sample_stops(&stops, -1.0).to_u8(), [0, 0, 0]);
    assert_eq!(sample_stops(&stops, 2.0).to_u8(), [200, 100, 50]);
    assert_eq!(sample_stops(&[], 0.3).a, 0.0);
}

#[test]
fn fill_rect_respects_clip() {
    let mut c = Canvas::new(10, 10);
    c.fill(Rgba::rgb(0, 0, 0));
    c.set_clip(2.0, 2.0, 5.0, 5.0);
    c.fill_rect(0.0, 0.0, 10.0, 10.0, Rgba::rgb(255, 0, 0));
    assert_eq!(c.pixel(3, 3), [255, 0, 0, 255]);
    assert_eq!(c.pixel(1, 1), [0, 0, 0, 255]);
    assert_eq!(c.pixel(6, 6), [0, 0, 0, 255]);

    c.clear_clip();
    c.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::rgb(0, 255, 0));
    assert_eq!(c.pixel(0, 0), [0, 255, 0, 255]);
    assert_eq!(c.pixel(99, 0), [0, 0, 0, 0], "out of range reads as empty");
}

#[test]
fn half_alpha_blends_halfway() {
    let mut c = Canvas::new(2, 2);
    c.fill(Rgba::rgb(0, 0, 0));
    c.fill_rect(0.0, 0.0, 2.0, 2.0, Rgba::new(200.0, 100.0, 0.0, 0.5));
    assert_eq!(c.pixel(1, 1)[..3], [100, 50, 0]);
}

#[test]
fn circle_covers_centre_not_corners() {
    let mut c = Canvas::new(21, 21);
    c.fill(Rgba::rgb(0, 0, 0));
    c.fill_circle(10.5, 10.5, 6.0, Rgba::rgb(255, 255, 255));
    assert_eq!(c.pixel(10, 10)[..3], [255, 255, 255]);
    assert_eq!(c.pixel(0, 0)[..3], [0, 0, 0]);
    assert_eq!(c.pixel(20, 20)[..3], [0, 0, 0]);
}

#[test]
fn ensure_size_resizes_buffer() {
    let mut c = Canvas::new(4, 4);
    c.ensure_size(8, 3);
    assert_eq!((c.width(), c.height()), (8, 3));
    assert_eq!(c.pixels().len(), 8 * 3 * 4);
}

// ── Viewport ────────────────────────────────────────────────────────────────

#[test]
fn viewport_fits_uniformly_and_centres() {
    let vp = Viewport::fit(120.0, 0.0, 200.0, 60, 50);
    assert!((vp.scale - 0.25).abs() < 1e-6);
    assert!((vp.offset_x - 15.0).abs() < 1e-4);
    assert!(vp.offset_y.abs() < 1e-4);

    let (px, py) = vp.to_canvas(60.0, 100.0);
    let (x, y) = vp.to_lamp(px, py).expect("inside");
    assert!((x - 60.0).abs() < 1e-3 && (y - 100.0).abs() < 1e-3);

    assert_eq!(vp.to_lamp(1.0, 1.0), None);
    assert_eq!(vp.to_lamp(59.0, 25.0), None);
}

#[test]
fn viewport_maps_minimized_band() {
    let vp = Viewport::fit(120.0, 140.0, 200.0, 120, 200);
    assert!((vp.scale - 1.0).abs() < 1e-6);
    assert!((vp.offset_y - 70.0).abs() < 1e-4);
    let (x, y) = vp.to_lamp(60.0, 70.0).expect("top of band");
    assert!((x - 60.0).abs() < 1e-4 && (y - 140.0).abs() < 1e-4);
}

// ── Painters ────────────────────────────────────────────────────────────────

#[test]
fn empty_scene_shows_background() {
    let cfg = LampConfig::default();
    let mut painter = RasterPainter::new(&cfg);
    let mut canvas = Canvas::new(120, 200);
    painter.paint(&scene(&[], &[], false), &mut canvas);
    let px = canvas.pixel(100, 50);
    assert!(close(px, [10, 5, 15], 1), "background pixel {px:?}");
}

#[test]
fn blob_is_painted_in_its_colour() {
    let cfg = LampConfig::default();
    let mut painter = RasterPainter::new(&cfg);
    let color = Hsla::new(240.0, 80.0, 40.0, 0.8);
    let blobs = [Blob::new(60.0, 85.0, 30.0, color)];
    let mut canvas = Canvas::new(120, 200);
    painter.paint(&scene(&blobs, &[], false), &mut canvas);
    let [r, g, b] = color.to_rgba().to_u8();
    let px = canvas.pixel(60, 85);
    assert!(close(px, [r, g, b], 3), "centre pixel {px:?} vs {:?}", [r, g, b]);
}

#[test]
fn ripple_brightens_the_blob_under_it() {
    let cfg = LampConfig::default();
    let mut painter = RasterPainter::new(&cfg);
    let blobs = [Blob::new(60.0, 85.0, 30.0, Hsla::new(240.0, 80.0, 40.0, 0.8))];
    let ripples = [Ripple {
        x: 60.0,
        y: 85.0,
        radius: 20.0,
        opacity: 0.7,
        age: 0.0,
    }];

    let mut plain = Canvas::new(120, 200);
    painter.paint(&scene(&blobs, &[], false), &mut plain);
    let mut rippled = Canvas::new(120, 200);
    painter.paint(&scene(&blobs, &ripples, false), &mut rippled);

    assert!(brightness(rippled.pixel(80, 85)) > brightness(plain.pixel(80, 85)));
    assert_eq!(rippled.pixel(60, 85), plain.pixel(60, 85), "ring interior untouched");
}

#[test]
fn minimized_lamp_leaves_backdrop_above() {
    let cfg = LampConfig::default();
    let mut painter = make_painter(PainterKind::Raster, &cfg);
    let mut canvas = Canvas::new(120, 200);
    painter.paint(&scene(&[], &[], true), &mut canvas);
    assert_eq!(canvas.pixel(60, 0), [6, 6, 10, 255]);
    assert_ne!(canvas.pixel(100, 100)[..3], [6, 6, 10]);
}

#[test]
fn static_painter_ignores_motion_and_quantizes() {
    let cfg = LampConfig::default();
    let mut painter = StaticPainter::new(&cfg);
    assert!(!painter.animated());
    assert_eq!(painter.name(), "static");

    let a = [Blob::new(30.0, 60.0, 20.0, Hsla::new(10.0, 90.0, 60.0, 0.8))];
    let b = [Blob::new(90.0, 140.0, 35.0, Hsla::new(300.0, 90.0, 60.0, 0.8))];
    let ripples = [Ripple {
        x: 60.0,
        y: 60.0,
        radius: 15.0,
        opacity: 0.7,
        age: 0.0,
    }];

    let mut first = Canvas::new(60, 100);
    painter.paint(&scene(&a, &[], false), &mut first);
    let mut second = Canvas::new(60, 100);
    painter.paint(&scene(&b, &ripples, false), &mut second);

    assert_eq!(first.pixels(), second.pixels());
    for px in first.pixels().chunks_exact(4) {
        assert!(px[..3].iter().all(|v| v % 51 == 0), "pixel {px:?} off the cube");
    }
}

#[test]
fn painters_skip_empty_canvas() {
    let cfg = LampConfig::default();
    for kind in [PainterKind::Raster, PainterKind::Static] {
        let mut painter = make_painter(kind, &cfg);
        assert_eq!(painter.name(), kind.label());
        let mut canvas = Canvas::new(0, 0);
        painter.paint(&scene(&[], &[], false), &mut canvas);
        assert!(canvas.pixels().is_empty());
    }
}
