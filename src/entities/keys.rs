//! Property key constants for paint node access.
//!
//! Avoid string typos, enable IDE autocomplete.
//! Usage: `props.get_i32(node, K_NEXT_ID)`

// === Paint component ===
/// Per-node element id counter
pub const K_NEXT_ID: &str = "paint.nextId";
/// Paint layer visibility flag
pub const K_SHOW: &str = "paint.show";

// === Frame order ===
/// Prefix of per-frame order lists: `frame:<n>.order`
pub const FRAME_PREFIX: &str = "frame:";
/// Suffix of per-frame order lists
pub const ORDER_SUFFIX: &str = ".order";

// === Text element components (`<element name>.<component>`) ===
/// Position (float[2])
pub const A_POSITION: &str = "position";
/// RGBA color (float[4])
pub const A_COLOR: &str = "color";
/// Letter spacing
pub const A_SPACING: &str = "spacing";
/// Text size relative to image height
pub const A_SIZE: &str = "size";
/// Resolution normalization scale
pub const A_SCALE: &str = "scale";
/// Rotation in degrees
pub const A_ROTATION: &str = "rotation";
/// Font name (empty = host default)
pub const A_FONT: &str = "font";
/// Text content
pub const A_TEXT: &str = "text";
/// Origin tag (empty = host default)
pub const A_ORIGIN: &str = "origin";
/// Host debug flag
pub const A_DEBUG: &str = "debug";
/// First frame the element is visible on
pub const A_START_FRAME: &str = "startFrame";
/// Visible duration in frames
pub const A_DURATION: &str = "duration";
/// Render mode (0 = render over)
pub const A_MODE: &str = "mode";

/// Key of the order list for a frame.
pub fn order_key(frame: i32) -> String {
    format!("{}{}{}", FRAME_PREFIX, frame, ORDER_SUFFIX)
}

/// Parse frame number from an order list key, None for any other key.
pub fn parse_order_key(key: &str) -> Option<i32> {
    key.strip_prefix(FRAME_PREFIX)?
        .strip_suffix(ORDER_SUFFIX)?
        .parse::<i32>()
        .ok()
}

/// Key of one component of an element: `<element>.<component>`.
pub fn element_key(element: &str, component: &str) -> String {
    format!("{}.{}", element, component)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_key_roundtrip() {
        assert_eq!(order_key(12), "frame:12.order");
        assert_eq!(parse_order_key("frame:12.order"), Some(12));
        assert_eq!(parse_order_key("frame:-3.order"), Some(-3));
        assert_eq!(parse_order_key("frame:x.order"), None);
        assert_eq!(parse_order_key("text:1:12:note.text"), None);
    }
}
