/// Superseded request example
/// A slow request is overtaken by a newer one and its output is dropped

use art_effect::{ArtEffectError, EffectEngine, EffectKind, EffectParameters, RasterBuffer};
use image::{Rgba, RgbaImage};
use std::{sync::Arc, thread};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let engine = Arc::new(EffectEngine::seeded(7));
    let photo = Arc::new(RgbaImage::from_pixel(1200, 1200, Rgba([90, 140, 200, 255])));

    let slow = {
        let engine = engine.clone();
        let photo = photo.clone();
        let signal = engine.begin_request();

        thread::spawn(move || {
            let params = EffectParameters::new(EffectKind::Watercolor).with_intensity(100);
            engine.apply_with_signal(RasterBuffer::new(1200, 1200)?, &photo, &params, &signal)
        })
    };

    let params = EffectParameters::new(EffectKind::PopArt);
    let latest = engine.apply(RasterBuffer::new(300, 300)?, &photo, &params)?;
    println!("✓ latest request finished: {:?}", latest.dimensions());

    match slow.join() {
        Ok(Err(ArtEffectError::Cancelled)) => println!("✓ earlier request was cancelled"),
        Ok(Ok(_)) => println!("earlier request finished before it was superseded"),
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => return Err("worker thread panicked".into()),
    }

    Ok(())
}
