//! Unicode heuristics for flagging comments.
//!
//! Every predicate works on code points (`char`s). The range tables are
//! sorted and non-overlapping so lookups can binary search them.

use crate::types::CommentFilter;
use serde::Serialize;
use std::cmp::Ordering;

pub const HIGHLIGHT_OPEN: &str = r#"<span class="unicode-highlight">"#;
pub const HIGHLIGHT_CLOSE: &str = "</span>";

const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x2600, 0x26FF),   // Miscellaneous Symbols
    (0x2700, 0x27BF),   // Dingbats
    (0x1F000, 0x1F6FF), // Mahjong through Transport and Map Symbols
    (0x1F900, 0x1F9FF), // Supplemental Symbols and Pictographs
];

const NON_LATIN_RANGES: &[(u32, u32)] = &[
    (0x0400, 0x04FF), // Cyrillic
    (0x0590, 0x05FF), // Hebrew
    (0x0600, 0x06FF), // Arabic
    (0x0700, 0x074F), // Syriac
    (0x0750, 0x077F), // Arabic Supplement
    (0x0980, 0x09FF), // Bengali
    (0x0A00, 0x0A7F), // Gurmukhi
    (0x0A80, 0x0AFF), // Gujarati
    (0x0B00, 0x0B7F), // Oriya
    (0x0B80, 0x0BFF), // Tamil
    (0x0C00, 0x0C7F), // Telugu
    (0x0C80, 0x0CFF), // Kannada
    (0x0D00, 0x0D7F), // Malayalam
    (0x0D80, 0x0DFF), // Sinhala
    (0x0E00, 0x0E7F), // Thai
    (0x0E80, 0x0EFF), // Lao
    (0x0F00, 0x0FFF), // Tibetan
    (0x1000, 0x109F), // Myanmar
    (0x10A0, 0x10FF), // Georgian
    (0x1100, 0x11FF), // Hangul Jamo
    (0x1200, 0x137F), // Ethiopic
    (0x1380, 0x139F), // Ethiopic Supplement
    (0x13A0, 0x13FF), // Cherokee
    (0x1400, 0x167F), // Unified Canadian Aboriginal Syllabics
    (0x1680, 0x169F), // Ogham
    (0x16A0, 0x16FF), // Runic
    (0x1700, 0x171F), // Tagalog
    (0x1720, 0x173F), // Hanunoo
    (0x1740, 0x175F), // Buhid
    (0x1760, 0x177F), // Tagbanwa
    (0x1780, 0x17FF), // Khmer
    (0x1800, 0x18AF), // Mongolian
    (0x1900, 0x194F), // Limbu
    (0x1950, 0x197F), // Tai Le
    (0x1980, 0x19DF), // New Tai Lue
    (0x19E0, 0x19FF), // Khmer Symbols
    (0x1A00, 0x1A1F), // Buginese
    (0x1A20, 0x1AAF), // Tai Tham
    (0x1B00, 0x1B7F), // Balinese
    (0x1B80, 0x1BBF), // Sundanese
    (0x1BC0, 0x1BFF), // Batak
    (0x1C00, 0x1C4F), // Lepcha
    (0x1C50, 0x1C7F), // Ol Chiki
    (0x1C80, 0x1C8F), // Cyrillic Extended-C
    (0x1C90, 0x1CBF), // Georgian Extended
    (0x1CC0, 0x1CCF), // Sundanese Supplement
    (0x1CD0, 0x1CFF), // Vedic Extensions
    (0x1D00, 0x1D7F), // Phonetic Extensions
    (0x1D80, 0x1DBF), // Phonetic Extensions Supplement
    (0x1DC0, 0x1DFF), // Combining Diacritical Marks Supplement
    (0x1E00, 0x1EFF), // Latin Extended Additional
    (0x1F00, 0x1FFF), // Greek Extended
    (0x2C00, 0x2C5F), // Glagolitic
    (0x2C60, 0x2C7F), // Latin Extended-C
    (0x2C80, 0x2CFF), // Coptic
    (0x2D00, 0x2D2F), // Georgian Supplement
    (0x2D30, 0x2D7F), // Tifinagh
    (0x2D80, 0x2DDF), // Ethiopic Extended
    (0x2DE0, 0x2DFF), // Cyrillic Extended-A
    (0x2E00, 0x2E7F), // Supplemental Punctuation
    (0x2F00, 0x2FDF), // Kangxi Radicals
    (0x3000, 0x303F), // CJK Symbols and Punctuation
    (0x3040, 0x309F), // Hiragana
    (0x30A0, 0x30FF), // Katakana
    (0x3100, 0x312F), // Bopomofo
    (0x3130, 0x318F), // Hangul Compatibility Jamo
    (0x3190, 0x319F), // Kanbun
    (0x31A0, 0x31BF), // Bopomofo Extended
    (0x31C0, 0x31EF), // CJK Strokes
    (0x31F0, 0x31FF), // Katakana Phonetic Extensions
    (0x3200, 0x32FF), // Enclosed CJK Letters and Months
    (0x3300, 0x33FF), // CJK Compatibility
    (0x3400, 0x4DBF), // CJK Unified Ideographs Extension A
    (0x4DC0, 0x4DFF), // Yijing Hexagram Symbols
    (0x4E00, 0x9FFF), // CJK Unified Ideographs
    (0xA000, 0xA48F), // Yi Syllables
    (0xA490, 0xA4CF), // Yi Radicals
    (0xA4D0, 0xA4FF), // Lisu
    (0xA500, 0xA63F), // Vai
    (0xA640, 0xA69F), // Cyrillic Extended-B
    (0xA6A0, 0xA6FF), // Bamum
    (0xA700, 0xA71F), // Modifier Tone Letters
    (0xA720, 0xA7FF), // Latin Extended-D
    (0xA800, 0xA82F), // Syloti Nagri
    (0xA830, 0xA83F), // Common Indic Number Forms
    (0xA840, 0xA87F), // Phags-pa
    (0xA880, 0xA8DF), // Saurashtra
    (0xA8E0, 0xA8FF), // Devanagari Extended
    (0xA900, 0xA92F), // Kayah Li
    (0xA930, 0xA95F), // Rejang
    (0xA960, 0xA97F), // Hangul Jamo Extended-A
    (0xA980, 0xA9DF), // Javanese
    (0xA9E0, 0xA9FF), // Myanmar Extended-B
    (0xAA00, 0xAA5F), // Cham
    (0xAA60, 0xAA7F), // Myanmar Extended-A
    (0xAA80, 0xAADF), // Tai Viet
    (0xAAE0, 0xAAFF), // Meetei Mayek Extensions
    (0xAB00, 0xAB2F), // Ethiopic Extended-A
    (0xAB30, 0xAB6F), // Latin Extended-E
    (0xAB70, 0xABBF), // Cherokee Supplement
    (0xABC0, 0xABFF), // Meetei Mayek
    (0xAC00, 0xD7AF), // Hangul Syllables
    (0xD7B0, 0xD7FF), // Hangul Jamo Extended-B
    (0xF900, 0xFAFF), // CJK Compatibility Ideographs
    (0xFB00, 0xFB4F), // Alphabetic Presentation Forms
    (0xFB50, 0xFDFF), // Arabic Presentation Forms-A
    (0xFE00, 0xFE0F), // Variation Selectors
    (0xFE10, 0xFE1F), // Vertical Forms
    (0xFE20, 0xFE2F), // Combining Half Marks
    (0xFE30, 0xFE4F), // CJK Compatibility Forms
    (0xFE50, 0xFE6F), // Small Form Variants
    (0xFE70, 0xFEFF), // Arabic Presentation Forms-B
    (0xFF00, 0xFFEF), // Halfwidth and Fullwidth Forms
    // Supplementary planes, minus the U+1F000..U+1FFFF symbol and emoji area.
    (0x10000, 0x1EFFF),
    (0x20000, 0x10FFFF),
];

const SPECIAL_SYMBOL_RANGES: &[(u32, u32)] = &[
    (0x2000, 0x206F), // General Punctuation
    (0x2100, 0x214F), // Letterlike Symbols
    (0x2190, 0x21FF), // Arrows
    (0x2200, 0x22FF), // Mathematical Operators
    (0x2300, 0x23FF), // Miscellaneous Technical
    (0x2400, 0x243F), // Control Pictures
    (0x2440, 0x245F), // Optical Character Recognition
    (0x2460, 0x24FF), // Enclosed Alphanumerics
    (0x2500, 0x257F), // Box Drawing
    (0x2580, 0x259F), // Block Elements
    (0x25A0, 0x25FF), // Geometric Shapes
    (0x2600, 0x26FF), // Miscellaneous Symbols
    (0x2700, 0x27BF), // Dingbats
    (0x27C0, 0x27EF), // Miscellaneous Mathematical Symbols-A
    (0x27F0, 0x27FF), // Supplemental Arrows-A
    (0x2800, 0x28FF), // Braille Patterns
    (0x2900, 0x297F), // Supplemental Arrows-B
    (0x2980, 0x29FF), // Miscellaneous Mathematical Symbols-B
    (0x2A00, 0x2AFF), // Supplemental Mathematical Operators
    (0x2B00, 0x2BFF), // Miscellaneous Symbols and Arrows
    (0x2E00, 0x2E7F), // Supplemental Punctuation
];

fn in_ranges(c: char, ranges: &[(u32, u32)]) -> bool {
    let cp = c as u32;
    ranges
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                Ordering::Less
            } else if lo > cp {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .is_ok()
}

pub fn contains_non_ascii(text: &str) -> bool {
    !text.is_ascii()
}

pub fn contains_emoji(text: &str) -> bool {
    text.chars().any(|c| in_ranges(c, EMOJI_RANGES))
}

pub fn contains_non_latin_script(text: &str) -> bool {
    text.chars().any(|c| in_ranges(c, NON_LATIN_RANGES))
}

pub fn contains_special_symbols(text: &str) -> bool {
    text.chars().any(|c| in_ranges(c, SPECIAL_SYMBOL_RANGES))
}

/// Wraps every non-ASCII code point in its own highlight span.
pub fn highlight(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(HIGHLIGHT_OPEN);
            out.push(c);
            out.push_str(HIGHLIGHT_CLOSE);
        }
    }
    out
}

pub fn classify(text: &str, filter: CommentFilter) -> bool {
    match filter {
        CommentFilter::All => contains_non_ascii(text),
        CommentFilter::Emoji => contains_emoji(text),
        CommentFilter::NonLatin => contains_non_latin_script(text),
        CommentFilter::Special => contains_special_symbols(text),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub non_ascii: bool,
    pub emoji: bool,
    pub non_latin: bool,
    pub special: bool,
    pub highlighted_text: String,
}

impl ClassificationResult {
    pub fn matches(&self, filter: CommentFilter) -> bool {
        match filter {
            CommentFilter::All => self.non_ascii,
            CommentFilter::Emoji => self.emoji,
            CommentFilter::NonLatin => self.non_latin,
            CommentFilter::Special => self.special,
        }
    }
}

pub fn analyze(text: &str) -> ClassificationResult {
    ClassificationResult {
        non_ascii: contains_non_ascii(text),
        emoji: contains_emoji(text),
        non_latin: contains_non_latin_script(text),
        special: contains_special_symbols(text),
        highlighted_text: highlight(text),
    }
}
