/// Art effects example
/// Renders every effect over a synthetic photo into tmp/

use art_effect::{DEFAULT_CANVAS_SIZE, EffectEngine, EffectKind, EffectParameters, EngineConfig};
use image::{Rgba, RgbaImage};
use std::{path::Path, time::Instant};

fn test_photo(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width) as u8;
        let g = (y * 255 / height) as u8;
        let b = ((x + y) * 255 / (width + height)) as u8;
        Rgba([r, g, b, 255])
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    // Landscape source so the letterbox bands are visible
    let photo = test_photo(800, 500);
    let engine = EffectEngine::new(EngineConfig::new().with_seed(Some(2024)));

    for kind in EffectKind::all_effects() {
        let params = EffectParameters::new(*kind)
            .with_intensity(65)
            .with_color_variance(40);

        let start = Instant::now();
        let output = engine.generate(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE, &photo, &params)?;
        let path = output_dir.join(format!("{}.png", kind.id()));
        output.into_image().save(&path)?;

        println!("✓ {:<16} {:>8.2?}  {}", kind.name(), start.elapsed(), path.display());
    }

    Ok(())
}
