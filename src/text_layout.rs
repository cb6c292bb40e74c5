//! Note text layout: wrapping, stacking, outline and resolution scale.
//!
//! Paint coordinates are frame-centered and aspect-corrected:
//! x spans -aspect/2 (left) .. +aspect/2 (right), y spans -0.5 (bottom) .. +0.5 (top).
//! Nothing here rasterizes; the host renders whatever the store describes.
//!
//! # Line length
//!
//! `max_chars_per_line = 0.29 / text_size` (58 at the default 0.005).
//! Single words longer than `force_break_length` (65% of that) are chunked
//! regardless of word boundaries: CJK and other wide scripts render much wider
//! per character than the ASCII estimate behind `max_chars_per_line`.

/// Height that text size is authored against.
pub const REFERENCE_HEIGHT: f32 = 1080.0;
/// Fallback image aspect when media info is unavailable.
pub const DEFAULT_ASPECT: f32 = 16.0 / 9.0;

/// Max characters per line for a text size.
pub fn max_chars_per_line(text_size: f32) -> usize {
    if text_size <= 0.0 {
        return 1;
    }
    ((0.29 / text_size).round() as usize).max(1)
}

/// Hard chunk size for words longer than any line.
pub fn force_break_length(max_len: usize) -> usize {
    ((max_len as f32 * 0.65) as usize).max(1)
}

/// Image aspect (width / height), 16:9 when either side is unknown.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        DEFAULT_ASPECT
    } else {
        width as f32 / height as f32
    }
}

/// Scale that keeps perceived text size constant across resolutions.
pub fn resolution_scale(image_height: f32, reference_height: f32) -> f32 {
    if image_height <= 0.0 {
        return 1.0;
    }
    reference_height / image_height
}

/// Eight outline copy positions around `primary`: 4 corners, then 4 cardinals.
pub fn outline_offsets(primary: [f32; 2], offset: f32) -> [[f32; 2]; 8] {
    let [x, y] = primary;
    [
        [x - offset, y - offset],
        [x + offset, y - offset],
        [x + offset, y + offset],
        [x - offset, y + offset],
        [x, y - offset],
        [x, y + offset],
        [x - offset, y],
        [x + offset, y],
    ]
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Push `size`-char chunks of `word` to `out` while it is longer than `size`,
/// return the rest (at most `size` chars, possibly empty).
fn split_long(word: &str, size: usize, out: &mut Vec<String>) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut start = 0;
    while chars.len() - start > size {
        out.push(chars[start..start + size].iter().collect());
        start += size;
    }
    chars[start..].iter().collect()
}

/// Word-wrap note text.
///
/// Existing newlines are kept; each input line wraps on its own. Lines within
/// `max_len` pass through untouched. A leading lone `-` sticks to the first word.
pub fn wrap(text: &str, max_len: usize, force_break_len: usize) -> String {
    let force_break_len = force_break_len.max(1);
    let mut lines: Vec<String> = Vec::new();

    for line in text.split('\n') {
        if char_len(line) <= max_len {
            lines.push(line.to_string());
            continue;
        }

        let mut words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if words.len() >= 2 && words[0] == "-" {
            words[0] = format!("- {}", words[1]);
            words.remove(1);
        }

        if words.len() == 1 {
            let rest = split_long(&words[0], force_break_len, &mut lines);
            if !rest.is_empty() {
                lines.push(rest);
            }
            continue;
        }

        let mut current = String::new();
        for word in words {
            if char_len(&word) > force_break_len {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = split_long(&word, force_break_len, &mut lines);
            } else if char_len(&current) + char_len(&word) + 1 <= max_len {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&word);
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = word;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines.join("\n")
}

/// Layout parameters for note placement.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Text size relative to image height
    pub text_size: f32,
    /// Vertical distance between stacked lines
    pub line_spacing: f32,
    /// Padding from the top-left corner [x, y]
    pub padding: [f32; 2],
    /// Outline copy distance
    pub shadow_offset: f32,
    pub reference_height: f32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            text_size: 0.005,
            line_spacing: 0.08,
            padding: [0.06, 0.15],
            shadow_offset: 0.002,
            reference_height: REFERENCE_HEIGHT,
        }
    }
}

impl TextLayout {
    pub fn max_chars(&self) -> usize {
        max_chars_per_line(self.text_size)
    }

    pub fn force_break(&self) -> usize {
        force_break_length(self.max_chars())
    }

    pub fn wrap(&self, text: &str) -> String {
        wrap(text, self.max_chars(), self.force_break())
    }

    /// Top-left anchored position below `existing_lines` already stacked lines.
    pub fn stack_position(&self, existing_lines: usize, aspect: f32) -> [f32; 2] {
        let aspect = if aspect > 0.0 { aspect } else { DEFAULT_ASPECT };
        let left = -aspect / 2.0;
        let top = 0.5;
        [
            left + self.padding[0],
            top - self.padding[1] - existing_lines as f32 * self.line_spacing,
        ]
    }

    pub fn outline_offsets(&self, primary: [f32; 2]) -> [[f32; 2]; 8] {
        outline_offsets(primary, self.shadow_offset)
    }

    pub fn resolution_scale(&self, image_height: f32) -> f32 {
        resolution_scale(image_height, self.reference_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "- hello",
        "- The quick brown fox jumps over the lazy dog while the reviewer keeps typing notes",
        "- first line\nsecond line that is quite a bit longer than fifty eight characters in total",
        "- supercalifragilisticexpialidocioussupercalifragilisticexpialidocious",
        "- short words then averyveryveryveryverylongtokenwithoutanyspacesinside and more",
        "- 色彩が暗すぎるので明るさを調整してくださいこのショット全体にわたって確認が必要です",
        "-",
        "",
    ];

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_defaults() {
        let layout = TextLayout::default();
        assert_eq!(layout.max_chars(), 58);
        assert_eq!(layout.force_break(), 37);
        assert_eq!(max_chars_per_line(0.006), 48);
    }

    #[test]
    fn test_short_text_unchanged() {
        for text in ["- hello", "- a\n- b", "", "   spaced   out   "] {
            assert_eq!(wrap(text, 58, 37), text);
        }
    }

    #[test]
    fn test_wrap_preserves_words() {
        for text in SAMPLES {
            let wrapped = wrap(text, 58, 37);
            let joined: String = words(&wrapped).concat();
            assert_eq!(joined, words(text).concat(), "content changed for {text:?}");
        }
    }

    #[test]
    fn test_force_break_bound() {
        for text in SAMPLES {
            for (max_len, force) in [(58, 37), (20, 13), (10, 6)] {
                let wrapped = wrap(text, max_len, force);
                for line in wrapped.split('\n') {
                    assert!(
                        line.chars().count() <= max_len.max(force),
                        "{line:?} too long for {max_len}/{force}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_long_merged_token_chunks() {
        let text = "- supercalifragilisticexpialidocioussupercalifragilisticexpialidocious";
        let wrapped = wrap(text, 58, 37);
        let lines: Vec<&str> = wrapped.split('\n').collect();
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 37));
        assert!(lines[0].starts_with("- super"));
    }

    #[test]
    fn test_greedy_wrap() {
        let wrapped = wrap("- aaa bbb ccc ddd", 8, 6);
        assert_eq!(wrapped, "- aaa\nbbb ccc\nddd");
    }

    #[test]
    fn test_long_word_between_words() {
        let wrapped = wrap("ab abcdefghij cd", 8, 4);
        assert_eq!(wrapped, "ab\nabcd\nefgh\nij cd");
    }

    #[test]
    fn test_stack_position() {
        let layout = TextLayout::default();
        let [x, y] = layout.stack_position(0, 2.0);
        assert!((x - (-1.0 + 0.06)).abs() < 1e-6);
        assert!((y - 0.35).abs() < 1e-6);

        let [_, y2] = layout.stack_position(2, 2.0);
        assert!((y2 - (0.35 - 0.16)).abs() < 1e-6);

        // Unknown aspect falls back to 16:9
        let [xd, _] = layout.stack_position(0, 0.0);
        assert!((xd - (-DEFAULT_ASPECT / 2.0 + 0.06)).abs() < 1e-6);
    }

    #[test]
    fn test_outline_offsets() {
        let offsets = outline_offsets([0.0, 0.0], 0.002);
        assert_eq!(offsets[0], [-0.002, -0.002]);
        assert_eq!(offsets[2], [0.002, 0.002]);
        assert_eq!(offsets[4], [0.0, -0.002]);
        assert_eq!(offsets[7], [0.002, 0.0]);
    }

    #[test]
    fn test_resolution_scale() {
        assert_eq!(resolution_scale(1080.0, REFERENCE_HEIGHT), 1.0);
        assert_eq!(resolution_scale(2160.0, REFERENCE_HEIGHT), 0.5);
        assert_eq!(resolution_scale(0.0, REFERENCE_HEIGHT), 1.0);
        assert_eq!(aspect_ratio(1920, 1080), 1920.0 / 1080.0);
        assert_eq!(aspect_ratio(0, 1080), DEFAULT_ASPECT);
    }
}
