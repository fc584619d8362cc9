use lava_blob::config::RendererMode;
use lava_blob::render::{
    draw_overlay_popup, make_renderer, BrailleRenderer, Frame, HalfBlockRenderer, KittyRenderer,
    Renderer,
};

/// Build a solid-color RGBA pixel buffer.
fn solid_pixels(w: usize, h: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px[0] = r;
        px[1] = g;
        px[2] = b;
        px[3] = 255;
    }
    buf
}

/// Build a gradient pixel buffer (varies across x).
fn gradient_pixels(w: usize, h: usize) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 4;
            let t = (x as f32 / w.max(1) as f32 * 255.0) as u8;
            buf[i] = t;
            buf[i + 1] = 40;
            buf[i + 2] = 255 - t;
            buf[i + 3] = 255;
        }
    }
    buf
}

fn make_frame<'a>(
    cols: u16,
    visual_rows: u16,
    pw: usize,
    ph: usize,
    pixels: &'a [u8],
    sync: bool,
) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: visual_rows + 2,
        visual_rows,
        pixel_width: pw,
        pixel_height: ph,
        pixels_rgba: pixels,
        hud: "Memory: 42% | Hue: 240 -> 153",
        hud_rows: 1,
        overlay: None,
        sync_updates: sync,
    }
}

fn render_to_string(renderer: &mut dyn Renderer, frame: &Frame<'_>) -> String {
    let mut out = Vec::new();
    renderer.render(frame, &mut out).unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

// ── HalfBlock renderer ─────────────────────────────────────────────────────

#[test]
fn halfblock_renders_gradient_frame() {
    let cols = 16u16;
    let rows = 4u16;
    let pw = cols as usize;
    let ph = (rows as usize) * 2;
    let pixels = gradient_pixels(pw, ph);
    let frame = make_frame(cols, rows, pw, ph, &pixels, true);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.starts_with("\x1b[?2026h"), "missing sync-begin");
    assert!(s.ends_with("\x1b[?2026l"), "missing sync-end");
    assert!(s.contains("\x1b[H"), "missing home cursor");
    assert!(s.contains("\x1b[?7l"), "missing autowrap-off");
    assert!(s.contains("\x1b[?7h"), "missing autowrap-on");
    assert_eq!(s.matches('\u{2580}').count(), (cols * rows) as usize);
    assert!(s.contains("38;2;"), "missing FG escape");
    assert!(s.contains("48;2;"), "missing BG escape");
    assert!(s.contains("Memory: 42%"), "HUD text missing");
}

#[test]
fn halfblock_splits_top_and_bottom_pixels() {
    let (cols, rows) = (1u16, 1u16);
    let mut pixels = solid_pixels(1, 2, 255, 0, 0);
    pixels[4..8].copy_from_slice(&[0, 0, 255, 255]);
    let frame = make_frame(cols, rows, 1, 2, &pixels, false);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.contains("\x1b[38;2;255;0;0m"), "top pixel should be the foreground");
    assert!(s.contains("\x1b[48;2;0;0;255m"), "bottom pixel should be the background");
}

#[test]
fn halfblock_skips_dimension_mismatch() {
    // pixel_height should be visual_rows*2, but give visual_rows*1
    let pixels = solid_pixels(4, 4, 100, 100, 100);
    let frame = make_frame(4, 4, 4, 4, &pixels, false);
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&frame, &mut out).unwrap();
    assert!(out.is_empty(), "expected empty output for dimension mismatch");
}

#[test]
fn zero_size_frames_are_skipped() {
    let pixels = solid_pixels(1, 1, 0, 0, 0);
    let frame = make_frame(0, 0, 0, 0, &pixels, false);
    for mode in [RendererMode::HalfBlock, RendererMode::Braille, RendererMode::Kitty] {
        let mut out = Vec::new();
        make_renderer(mode).render(&frame, &mut out).unwrap();
        assert!(out.is_empty(), "{mode:?} wrote output for a zero-size frame");
    }
}

#[test]
fn colour_escapes_are_not_repeated_for_flat_frames() {
    let (cols, rows) = (6u16, 2u16);
    let pixels = solid_pixels(6, 4, 10, 20, 30);
    let frame = make_frame(cols, rows, 6, 4, &pixels, false);
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert_eq!(s.matches("38;2;10;20;30").count(), 1);
    assert_eq!(s.matches("48;2;10;20;30").count(), 1);
}

#[test]
fn halfblock_resets_color_cache_each_frame() {
    let mut renderer = HalfBlockRenderer::new();

    let pixels = solid_pixels(4, 4, 255, 0, 0);
    let frame = make_frame(4, 2, 4, 4, &pixels, false);
    let first = render_to_string(&mut renderer, &frame);
    let second = render_to_string(&mut renderer, &frame);
    assert!(first.contains("38;2;255;0;0"));
    assert!(second.contains("38;2;255;0;0"), "same colour must be re-emitted after home");
}

// ── Braille renderer ────────────────────────────────────────────────────────

#[test]
fn braille_renders_gradient_frame() {
    let cols = 16u16;
    let rows = 3u16;
    let pw = (cols as usize) * 2;
    let ph = (rows as usize) * 4;
    let pixels = gradient_pixels(pw, ph);
    let frame = make_frame(cols, rows, pw, ph, &pixels, false);
    let s = render_to_string(&mut BrailleRenderer::new(), &frame);
    assert!(
        s.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)),
        "no braille characters found"
    );
    assert!(s.contains("Memory: 42%"), "HUD text missing");
}

#[test]
fn braille_flat_cells_are_blank() {
    let pixels = solid_pixels(4, 4, 90, 90, 90);
    let frame = make_frame(2, 1, 4, 4, &pixels, false);
    let s = render_to_string(&mut BrailleRenderer::new(), &frame);
    assert!(!s.chars().any(|c| ('\u{2800}'..='\u{28FF}').contains(&c)));
    assert!(s.contains("48;2;90;90;90"));
}

#[test]
fn braille_lights_bright_half() {
    // Left column bright, right column dark: dots 1,2,3,7 (0x47).
    let mut pixels = solid_pixels(2, 4, 0, 0, 0);
    for y in 0..4 {
        let i = y * 2 * 4;
        pixels[i..i + 3].copy_from_slice(&[250, 250, 250]);
    }
    let frame = make_frame(1, 1, 2, 4, &pixels, false);
    let s = render_to_string(&mut BrailleRenderer::new(), &frame);
    assert!(s.contains('\u{2847}'), "got {s:?}");
    assert!(s.contains("38;2;250;250;250"));
    assert!(s.contains("48;2;0;0;0"));
}

// ── Kitty renderer ──────────────────────────────────────────────────────────

#[test]
fn kitty_transmits_single_chunk_image() {
    let pixels = solid_pixels(8, 8, 1, 2, 3);
    let frame = make_frame(4, 2, 8, 8, &pixels, false);
    let s = render_to_string(&mut KittyRenderer::new(), &frame);
    assert!(s.contains("\x1b_Ga=T,f=32,s=8,v=8,t=d,i=1,p=1,c=4,r=2,C=1,q=2,z=-1;"), "got {s:?}");
    assert!(!s.contains("m=1"), "small image needs one chunk");
    assert!(s.contains("\x1b\\"));
    // Four columns leave room for the start of the HUD only.
    assert!(s.contains("Memo"));
    assert!(!s.contains("Memory"), "HUD must be clipped to the frame width");
}

#[test]
fn kitty_chunks_large_images() {
    let (cols, rows) = (40u16, 10u16);
    let (pw, ph) = (80, 40);
    let pixels = gradient_pixels(pw, ph);
    let frame = make_frame(cols, rows, pw, ph, &pixels, false);
    let s = render_to_string(&mut KittyRenderer::new(), &frame);

    // 12800 bytes of RGBA in 3072-byte pieces: five chunks.
    assert!(s.contains("q=2,z=-1,m=1;"), "first chunk should announce more");
    assert_eq!(s.matches("\x1b_Gm=1;").count(), 3);
    assert_eq!(s.matches("\x1b_Gm=0;").count(), 1);
    for payload in s.split("\x1b_G").skip(1) {
        let body = payload.split_once(';').map(|(_, b)| b).unwrap();
        let data = body.split("\x1b\\").next().unwrap();
        assert!(data.len() <= 4096, "chunk too large: {}", data.len());
    }
}

#[test]
fn kitty_overlay_deletes_image() {
    let pixels = solid_pixels(80, 40, 5, 5, 5);
    let mut frame = make_frame(40, 10, 80, 40, &pixels, false);
    frame.term_rows = 14;
    frame.overlay = Some("Help\nm  minimize");
    let s = render_to_string(&mut KittyRenderer::new(), &frame);
    assert!(s.contains("\x1b_Ga=d,d=I,i=1\x1b\\"));
    assert!(!s.contains("a=T"), "no image while the popup is up");
    assert!(s.contains("Help"));
}

// ── Overlay / HUD ───────────────────────────────────────────────────────────

#[test]
fn halfblock_renders_overlay_popup() {
    let cols = 40u16;
    let rows = 10u16;
    let pixels = solid_pixels(cols as usize, rows as usize * 2, 50, 50, 50);
    let mut frame = make_frame(cols, rows, cols as usize, rows as usize * 2, &pixels, false);
    frame.overlay = Some("Lamp help\nclick  ripple");
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.contains("Lamp help"), "overlay title missing");
    assert!(s.contains("click  ripple"), "overlay body missing");
}

#[test]
fn overlay_popup_needs_room() {
    let mut out = Vec::new();
    draw_overlay_popup(&mut out, 6, 3, "Too small").unwrap();
    assert!(out.is_empty());

    draw_overlay_popup(&mut out, 40, 12, "   ").unwrap();
    assert!(out.is_empty());

    draw_overlay_popup(&mut out, 20, 12, "A very long line that has to wrap twice over").unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("+----"));
    assert!(s.contains("A very long"));
}

#[test]
fn hud_lines_are_clipped_to_width() {
    let pixels = solid_pixels(10, 4, 0, 0, 0);
    let mut frame = make_frame(10, 2, 10, 4, &pixels, false);
    frame.hud = "0123456789ABCDEF\nsecond";
    frame.hud_rows = 2;
    frame.term_rows = 4;
    let s = render_to_string(&mut HalfBlockRenderer::new(), &frame);
    assert!(s.contains("0123456789"));
    assert!(!s.contains("ABCDEF"));
    assert!(s.contains("second"));
    assert!(s.contains("\x1b[3;1H"), "HUD starts below the lamp rows");
}

#[test]
fn renderer_names_and_cells() {
    let expected = [
        (RendererMode::HalfBlock, "half-block", (1, 2)),
        (RendererMode::Braille, "braille", (2, 4)),
        (RendererMode::Kitty, "kitty", (2, 4)),
    ];
    for (mode, name, cell) in expected {
        let r = make_renderer(mode);
        assert_eq!(r.name(), name);
        assert_eq!(r.cell_pixels(), cell);
    }
}
