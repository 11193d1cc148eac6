use thiserror::Error;

/// Why a sprite key cannot be turned into a path below the sprites directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start or end with '/'")]
    EdgeSlash,
    #[error("sprite key must not contain an empty path segment")]
    EmptySegment,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Keys look like `houses/small_house`: lowercase segments joined by `/`.
pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(SpriteKeyError::EdgeSlash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    if key.split('/').any(str::is_empty) {
        return Err(SpriteKeyError::EmptySegment);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
    {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_village_sprite_keys() {
        for key in ["houses/small_house", "objects/fountain", "trees/oak-2", "tavern"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_keys_that_escape_or_break_paths() {
        assert_eq!(validate_sprite_key(""), Err(SpriteKeyError::Empty));
        assert_eq!(validate_sprite_key("/houses"), Err(SpriteKeyError::EdgeSlash));
        assert_eq!(validate_sprite_key("houses/"), Err(SpriteKeyError::EdgeSlash));
        assert_eq!(
            validate_sprite_key("houses//inn"),
            Err(SpriteKeyError::EmptySegment)
        );
        assert_eq!(
            validate_sprite_key("houses/../secret"),
            Err(SpriteKeyError::ParentTraversal)
        );
        assert_eq!(
            validate_sprite_key(r"houses\inn"),
            Err(SpriteKeyError::InvalidCharacter { character: '\\' })
        );
        assert_eq!(
            validate_sprite_key("Houses"),
            Err(SpriteKeyError::InvalidCharacter { character: 'H' })
        );
    }
}
