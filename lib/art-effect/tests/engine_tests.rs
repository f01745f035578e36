use anyhow::Result;
use art_effect::{
    ArtEffectError, EffectEngine, EffectKind, EffectParameters, RasterBuffer,
    monochrome_effect::luma,
};
use image::{Rgba, RgbaImage};
use std::{sync::Arc, thread, time::Duration};

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / (width - 1)) as u8,
            (y * 255 / (height - 1)) as u8,
            ((x + y) * 3 % 256) as u8,
            255,
        ])
    })
}

fn striped_rows(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |_, y| {
        if y % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

#[test]
fn test_oil_painting_keeps_uniform_image() -> Result<()> {
    let red = RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255]));
    let params = EffectParameters::new(EffectKind::OilPainting).with_brush_size(15);

    let output = EffectEngine::seeded(3).apply(RasterBuffer::new(100, 100)?, &red, &params)?;

    assert_eq!(output.into_image(), red);
    Ok(())
}

#[test]
fn test_mosaic_tiles_average_stripes() -> Result<()> {
    let params = EffectParameters::new(EffectKind::Mosaic)
        .with_brush_size(15)
        .with_color_variance(0);

    let output = EffectEngine::seeded(4).apply(RasterBuffer::new(8, 8)?, &striped_rows(8), &params)?;

    for y in 0..8 {
        let expected = if y < 5 { 102 } else { 170 };
        for x in 0..8 {
            assert_eq!(
                output.get(x, y)?,
                Rgba([expected, expected, expected, 255]),
                "pixel ({x}, {y})"
            );
        }
    }
    Ok(())
}

#[test]
fn test_quiet_sketch_is_grayscale() -> Result<()> {
    let source = gradient(40, 30);
    let params = EffectParameters::new(EffectKind::Sketch)
        .with_intensity(0)
        .with_complexity(0);

    let output = EffectEngine::seeded(5).apply(RasterBuffer::new(40, 30)?, &source, &params)?;

    for (x, y, px) in source.enumerate_pixels() {
        let gray = luma(px[0], px[1], px[2]);
        assert_eq!(output.get(x, y)?, Rgba([gray, gray, gray, 255]));
    }
    Ok(())
}

#[test]
fn test_seeded_engine_is_deterministic() -> Result<()> {
    let source = gradient(48, 32);

    for kind in EffectKind::all_effects() {
        let params = EffectParameters::new(*kind);
        let first = EffectEngine::seeded(42).apply(RasterBuffer::new(48, 32)?, &source, &params)?;
        let second = EffectEngine::seeded(42).apply(RasterBuffer::new(48, 32)?, &source, &params)?;

        assert_eq!(first, second, "{kind} is not reproducible");
        assert_eq!(first.dimensions(), (48, 32));
    }
    Ok(())
}

#[test]
fn test_every_effect_changes_gradient() -> Result<()> {
    let source = gradient(64, 64);

    for kind in EffectKind::all_effects() {
        let params = EffectParameters::new(*kind).with_intensity(80).with_complexity(80);
        let output = EffectEngine::seeded(9).apply(RasterBuffer::new(64, 64)?, &source, &params)?;

        assert_ne!(output.as_image(), &source, "{kind} left the image untouched");
    }
    Ok(())
}

#[test]
fn test_out_of_range_parameters_are_clamped() -> Result<()> {
    let source = gradient(32, 32);
    let wild = EffectParameters::new(EffectKind::Impressionist)
        .with_intensity(400)
        .with_color_variance(-7)
        .with_brush_size(1)
        .with_complexity(1000);
    let tame = wild.clamped();

    let engine = EffectEngine::seeded(11);
    let a = engine.apply(RasterBuffer::new(32, 32)?, &source, &wild)?;
    let b = engine.apply(RasterBuffer::new(32, 32)?, &source, &tame)?;

    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_latest_request_wins() -> Result<()> {
    let source = gradient(24, 24);
    let params = EffectParameters::new(EffectKind::Watercolor);
    let engine = EffectEngine::seeded(1);

    let stale = engine.begin_request();
    let current = engine.begin_request();

    let superseded =
        engine.apply_with_signal(RasterBuffer::new(24, 24)?, &source, &params, &stale);
    assert!(matches!(superseded, Err(ArtEffectError::Cancelled)));

    let output = engine.apply_with_signal(RasterBuffer::new(24, 24)?, &source, &params, &current)?;
    assert_eq!(output.dimensions(), (24, 24));
    Ok(())
}

#[test]
fn test_newer_request_stops_running_watercolor() -> Result<()> {
    let engine = Arc::new(EffectEngine::seeded(8));
    let source = Arc::new(gradient(1500, 1500));
    let signal = engine.begin_request();

    let worker = {
        let engine = engine.clone();
        let source = source.clone();
        thread::spawn(move || {
            let params = EffectParameters::new(EffectKind::Watercolor).with_intensity(100);
            engine.apply_with_signal(RasterBuffer::new(1500, 1500)?, &source, &params, &signal)
        })
    };

    thread::sleep(Duration::from_millis(2));
    let current = engine.begin_request();
    let result = worker.join().expect("worker panicked");

    assert!(matches!(result, Err(ArtEffectError::Cancelled)));
    assert!(!current.is_cancelled());
    Ok(())
}

#[test]
fn test_cancel_stops_running_pop_art() -> Result<()> {
    let engine = Arc::new(EffectEngine::seeded(8));
    let source = Arc::new(gradient(2000, 2000));
    let signal = engine.begin_request();

    let worker = {
        let engine = engine.clone();
        let source = source.clone();
        let signal = signal.clone();
        thread::spawn(move || {
            let params = EffectParameters::new(EffectKind::PopArt);
            engine.apply_with_signal(RasterBuffer::new(2000, 2000)?, &source, &params, &signal)
        })
    };

    thread::sleep(Duration::from_millis(2));
    signal.cancel();

    let result = worker.join().expect("worker panicked");
    assert!(matches!(result, Err(ArtEffectError::Cancelled)));
    Ok(())
}

#[test]
fn test_generate_letterboxes_source() -> Result<()> {
    let wide = RgbaImage::from_pixel(200, 50, Rgba([0, 0, 255, 255]));
    let params = EffectParameters::new(EffectKind::OilPainting);

    let output = EffectEngine::seeded(2).generate(100, 100, &wide, &params)?;

    assert_eq!(output.dimensions(), (100, 100));
    assert_eq!(output.get(50, 50)?, Rgba([0, 0, 255, 255]));
    assert_eq!(output.get(50, 5)?[3], 0);
    assert_eq!(output.get(50, 95)?[3], 0);
    Ok(())
}

#[test]
fn test_rejects_empty_source() -> Result<()> {
    let result = EffectEngine::default().generate(
        10,
        10,
        &RgbaImage::new(0, 0),
        &EffectParameters::default(),
    );

    assert!(matches!(
        result,
        Err(ArtEffectError::InvalidDimensions { width: 0, height: 0 })
    ));
    Ok(())
}

#[test]
fn test_parameters_from_json() -> Result<()> {
    let params: EffectParameters =
        serde_json::from_str(r#"{"effect":"pop-art","intensity":70,"colorVariance":10}"#)?;

    assert_eq!(params.effect, EffectKind::PopArt);
    assert_eq!(params.intensity, 70);
    assert_eq!(params.color_variance, 10);
    assert_eq!(params.brush_size, 15);
    assert_eq!(params.complexity, 60);

    let json = serde_json::to_string(&params)?;
    assert!(json.contains(r#""effect":"pop-art""#));
    assert!(json.contains(r#""brushSize":15"#));

    let unknown = serde_json::from_str::<EffectParameters>(r#"{"effect":"sepia"}"#);
    assert!(unknown.unwrap_err().to_string().contains("Unknown effect: sepia"));
    Ok(())
}
