//! Name and metadata validators
//!
//! These are pure checks. They return `false` for bad input and leave the
//! choice of error to the caller.

/// Maximum container name length, in characters
pub const MAX_CONTAINER_NAME_LENGTH: usize = 256;

/// Maximum object name length, in characters
pub const MAX_OBJECT_NAME_LENGTH: usize = 128;

/// Maximum metadata key length, in characters
pub const MAX_METADATA_KEY_LENGTH: usize = 128;

/// Maximum metadata value length, in characters
pub const MAX_METADATA_VALUE_LENGTH: usize = 128;

/// Check a container name: non-empty, at most 256 characters, no `/` or `?`
pub fn validate_container_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_CONTAINER_NAME_LENGTH
        && !name.contains(['/', '?'])
}

/// Check an object name: non-empty, at most 128 characters
pub fn validate_object_name(name: &str) -> bool {
    !name.is_empty() && name.chars().count() <= MAX_OBJECT_NAME_LENGTH
}

/// Check a metadata key: non-empty, at most 128 characters
pub fn validate_metadata_key(key: &str) -> bool {
    !key.is_empty() && key.chars().count() <= MAX_METADATA_KEY_LENGTH
}

/// Check a metadata value: at most 128 characters
pub fn validate_metadata_value(value: &str) -> bool {
    value.chars().count() <= MAX_METADATA_VALUE_LENGTH
}
