use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::warn;

use crate::sprite_keys::validate_sprite_key;

pub(crate) struct LoadedSprite {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

/// Lazily loaded sprites keyed by name. A failed load is remembered as `None`
/// so each missing key is logged once and never retried.
pub(crate) struct SpriteCache {
    sprites_dir: PathBuf,
    entries: HashMap<String, Option<LoadedSprite>>,
}

impl SpriteCache {
    pub(crate) fn new(sprites_dir: PathBuf) -> Self {
        Self {
            sprites_dir,
            entries: HashMap::new(),
        }
    }

    pub(crate) fn resolve(&mut self, key: &str) -> Option<&LoadedSprite> {
        if !self.entries.contains_key(key) {
            let loaded = match resolve_sprite_image_path(&self.sprites_dir, key)
                .and_then(|path| load_sprite_rgba(&path).map_err(|reason| (Some(path), reason)))
            {
                Ok(sprite) => Some(sprite),
                Err((path, reason)) => {
                    let path_display = path
                        .map(|path| path.display().to_string())
                        .unwrap_or_else(|| "<unresolved>".to_string());
                    warn!(
                        sprite_key = key,
                        path = %path_display,
                        reason = reason.as_str(),
                        "sprite_load_failed_using_fallback"
                    );
                    None
                }
            };
            self.entries.insert(key.to_string(), loaded);
        }
        self.entries.get(key).and_then(Option::as_ref)
    }

    #[cfg(test)]
    pub(crate) fn cached_key_count(&self) -> usize {
        self.entries.len()
    }
}

fn resolve_sprite_image_path(
    sprites_dir: &Path,
    key: &str,
) -> Result<PathBuf, (Option<PathBuf>, String)> {
    validate_sprite_key(key).map_err(|error| (None, format!("invalid_key:{error}")))?;
    Ok(sprites_dir.join(format!("{key}.png")))
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
