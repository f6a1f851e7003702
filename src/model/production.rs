//! Production extension types

/// Production attributes (`p:UUID`, `p:path`) attached to build, item,
/// object and component elements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductionAttr {
    /// UUID identifier
    pub uuid: Option<String>,
    /// Absolute path of the part holding the referenced object
    pub path: Option<String>,
}

impl ProductionAttr {
    /// Create a ProductionAttr with just a UUID
    pub fn with_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            path: None,
        }
    }
}

/// Returns true for the canonical `8-4-4-4-12` hexadecimal UUID form
pub fn is_valid_uuid(value: &str) -> bool {
    let groups: Vec<&str> = value.split('-').collect();
    let lengths = [8, 4, 4, 4, 12];
    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_format() {
        assert!(is_valid_uuid("3e93ab1c-1a6c-4d8f-9f5a-0f0b2c6b6d11"));
        assert!(is_valid_uuid("3E93AB1C-1A6C-4D8F-9F5A-0F0B2C6B6D11"));
        assert!(!is_valid_uuid("3e93ab1c1a6c4d8f9f5a0f0b2c6b6d11"));
        assert!(!is_valid_uuid("3e93ab1c-1a6c-4d8f-9f5a-0f0b2c6b6d1"));
        assert!(!is_valid_uuid("zzzzzzzz-1a6c-4d8f-9f5a-0f0b2c6b6d11"));
    }
}
