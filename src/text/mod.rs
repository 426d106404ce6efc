//! Legacy chat color codes and localized strings.
//!
//! Display names and lore lines carry `§`-prefixed color codes the way the
//! host client renders them. Reference data is written with `&` codes and
//! colorized on load or on use.

pub mod language;

pub use language::Language;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix character of every color/format code.
pub const COLOR_CHAR: char = '§';

/// Alternate prefix used in reference data files.
pub const ALT_COLOR_CHAR: char = '&';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
    // Formats
    Magic,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
}

impl ChatColor {
    pub fn code(self) -> char {
        match self {
            Self::Black => '0',
            Self::DarkBlue => '1',
            Self::DarkGreen => '2',
            Self::DarkAqua => '3',
            Self::DarkRed => '4',
            Self::DarkPurple => '5',
            Self::Gold => '6',
            Self::Gray => '7',
            Self::DarkGray => '8',
            Self::Blue => '9',
            Self::Green => 'a',
            Self::Aqua => 'b',
            Self::Red => 'c',
            Self::LightPurple => 'd',
            Self::Yellow => 'e',
            Self::White => 'f',
            Self::Magic => 'k',
            Self::Bold => 'l',
            Self::Strikethrough => 'm',
            Self::Underline => 'n',
            Self::Italic => 'o',
            Self::Reset => 'r',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        let color = match code.to_ascii_lowercase() {
            '0' => Self::Black,
            '1' => Self::DarkBlue,
            '2' => Self::DarkGreen,
            '3' => Self::DarkAqua,
            '4' => Self::DarkRed,
            '5' => Self::DarkPurple,
            '6' => Self::Gold,
            '7' => Self::Gray,
            '8' => Self::DarkGray,
            '9' => Self::Blue,
            'a' => Self::Green,
            'b' => Self::Aqua,
            'c' => Self::Red,
            'd' => Self::LightPurple,
            'e' => Self::Yellow,
            'f' => Self::White,
            'k' => Self::Magic,
            'l' => Self::Bold,
            'm' => Self::Strikethrough,
            'n' => Self::Underline,
            'o' => Self::Italic,
            'r' => Self::Reset,
            _ => return None,
        };
        Some(color)
    }

    pub fn is_format(self) -> bool {
        matches!(
            self,
            Self::Magic | Self::Bold | Self::Strikethrough | Self::Underline | Self::Italic
        )
    }

    pub fn is_color(self) -> bool {
        !self.is_format() && self != Self::Reset
    }
}

impl fmt::Display for ChatColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", COLOR_CHAR, self.code())
    }
}

/// Translate `&` codes into `§` codes. `&&` survives as a literal `&`.
pub fn colorize(s: &str) -> String {
    s.replace(ALT_COLOR_CHAR, "§").replace("§§", "&")
}

pub fn colorize_all(lines: &[String]) -> Vec<String> {
    lines.iter().map(|l| colorize(l)).collect()
}

/// Remove every recognised color/format code.
pub fn strip_color(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == COLOR_CHAR {
            if let Some(&next) = chars.peek() {
                if ChatColor::from_code(next).is_some() {
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Color of the first code in the string, if that code is recognised.
pub fn first_color(s: &str) -> Option<ChatColor> {
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == COLOR_CHAR {
            return chars.next().and_then(ChatColor::from_code);
        }
    }
    None
}

/// Codes still in effect at the end of the string: the last color plus any
/// formats applied after it.
pub fn last_colors(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();
    for index in (0..chars.len()).rev() {
        if chars[index] != COLOR_CHAR || index + 1 >= chars.len() {
            continue;
        }
        if let Some(color) = ChatColor::from_code(chars[index + 1]) {
            result = format!("{}{}", color, result);
            if color.is_color() || color == ChatColor::Reset {
                break;
            }
        }
    }
    result
}

/// Substitute `%placeholder%` style arguments in order.
pub fn replace_args(s: &str, args: &[(&str, &str)]) -> String {
    let mut out = s.to_string();
    for (from, to) in args {
        out = out.replace(from, to);
    }
    out
}

/// Case-insensitive substring test on color-stripped text.
pub fn contains_any_ignore_case(haystack: &str, needles: &[String]) -> bool {
    let upper = haystack.to_uppercase();
    needles
        .iter()
        .filter(|n| !n.is_empty())
        .any(|n| upper.contains(&n.to_uppercase()))
}
