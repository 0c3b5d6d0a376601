//! Text styling and layout style attributes.
//!
//! SGR codes are composed in a fixed order so identical props always produce
//! identical bytes: bold, dim, italic, underline, strikethrough, foreground,
//! background. Hyperlinks wrap the styled run last (see [`crate::ansi`]).

use crossterm::style::{Attribute, SetAttribute, SetBackgroundColor, SetForegroundColor};
use std::str::FromStr;

use crate::ansi::ansi;
use crate::error::RenderError;

/// Sequence that clears every attribute and color.
pub fn reset() -> String {
    ansi(SetAttribute(Attribute::Reset))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Ansi256(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    /// The crossterm color with the same palette slot. Plain names are the
    /// normal-intensity entries, which crossterm calls `Dark*`.
    pub fn to_crossterm(self) -> crossterm::style::Color {
        use crossterm::style::Color as C;
        match self {
            Color::Black => C::Black,
            Color::Red => C::DarkRed,
            Color::Green => C::DarkGreen,
            Color::Yellow => C::DarkYellow,
            Color::Blue => C::DarkBlue,
            Color::Magenta => C::DarkMagenta,
            Color::Cyan => C::DarkCyan,
            Color::White => C::Grey,
            Color::Gray => C::DarkGrey,
            Color::BrightRed => C::Red,
            Color::BrightGreen => C::Green,
            Color::BrightYellow => C::Yellow,
            Color::BrightBlue => C::Blue,
            Color::BrightMagenta => C::Magenta,
            Color::BrightCyan => C::Cyan,
            Color::BrightWhite => C::White,
            Color::Ansi256(n) => C::AnsiValue(n),
            Color::Rgb(r, g, b) => C::Rgb { r, g, b },
        }
    }

    /// SGR sequence selecting this color as foreground.
    pub fn fg_sequence(self) -> String {
        ansi(SetForegroundColor(self.to_crossterm()))
    }

    /// SGR sequence selecting this color as background.
    pub fn bg_sequence(self) -> String {
        ansi(SetBackgroundColor(self.to_crossterm()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }

    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }

    /// Opening escape sequences, in composition order.
    pub fn to_ansi_codes(&self) -> String {
        let mut out = String::new();
        let attrs = [
            (self.bold, Attribute::Bold),
            (self.dim, Attribute::Dim),
            (self.italic, Attribute::Italic),
            (self.underline, Attribute::Underlined),
            (self.strikethrough, Attribute::CrossedOut),
        ];
        for (on, attr) in attrs {
            if on {
                out.push_str(&ansi(SetAttribute(attr)));
            }
        }
        if let Some(fg) = self.fg {
            out.push_str(&fg.fg_sequence());
        }
        if let Some(bg) = self.bg {
            out.push_str(&bg.bg_sequence());
        }
        out
    }

    /// Wraps `text` in this style, followed by a reset. Plain styles return
    /// the text untouched.
    pub fn paint(&self, text: &str) -> String {
        if self.is_plain() || text.is_empty() {
            return text.to_string();
        }
        format!("{}{}{}", self.to_ansi_codes(), text, reset())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextWrap {
    #[default]
    Wrap,
    /// Same as `TruncateEnd`.
    Truncate,
    TruncateStart,
    TruncateMiddle,
    TruncateEnd,
}

/// How a box background color is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundMode {
    /// Color only the rendered content.
    #[default]
    Inline,
    /// Pad each line to the full available width and clear to end of line.
    Extend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
    ColumnReverse,
    RowReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexWrap {
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    Start,
    End,
    Center,
    Stretch,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// A size in cells, a percentage of the parent's width, or automatic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Cells(u16),
    Percent(f32),
}

impl FromStr for Dimension {
    type Err = RenderError;

    /// Parses `"auto"`, `"12"` or `"50%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "auto" {
            return Ok(Dimension::Auto);
        }
        if let Some(pct) = s.strip_suffix('%') {
            return pct
                .trim()
                .parse::<f32>()
                .map(Dimension::Percent)
                .map_err(|_| RenderError::InvalidDimension(s.to_string()));
        }
        s.parse::<u16>()
            .map(Dimension::Cells)
            .map_err(|_| RenderError::InvalidDimension(s.to_string()))
    }
}

impl From<u16> for Dimension {
    fn from(cells: u16) -> Self {
        Dimension::Cells(cells)
    }
}

/// Per-edge spacing. `None` edges are left untouched when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub top: Option<u16>,
    pub right: Option<u16>,
    pub bottom: Option<u16>,
    pub left: Option<u16>,
}

impl Edges {
    pub fn all(n: u16) -> Self {
        Self {
            top: Some(n),
            right: Some(n),
            bottom: Some(n),
            left: Some(n),
        }
    }

    pub fn xy(x: u16, y: u16) -> Self {
        Self {
            top: Some(y),
            right: Some(x),
            bottom: Some(y),
            left: Some(x),
        }
    }

    pub fn top_or_zero(&self) -> u16 {
        self.top.unwrap_or(0)
    }

    pub fn right_or_zero(&self) -> u16 {
        self.right.unwrap_or(0)
    }

    pub fn bottom_or_zero(&self) -> u16 {
        self.bottom.unwrap_or(0)
    }

    pub fn left_or_zero(&self) -> u16 {
        self.left.unwrap_or(0)
    }

    pub fn horizontal(&self) -> u16 {
        self.left_or_zero() + self.right_or_zero()
    }

    fn merge(&mut self, other: &Edges) {
        self.top = other.top.or(self.top);
        self.right = other.right.or(self.right);
        self.bottom = other.bottom.or(self.bottom);
        self.left = other.left.or(self.left);
    }
}

/// Layout-affecting attributes. Every field is optional so that applying a
/// style only touches what was set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutStyle {
    pub flex_direction: Option<FlexDirection>,
    pub flex_wrap: Option<FlexWrap>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Option<Dimension>,
    pub align_items: Option<AlignItems>,
    pub align_self: Option<AlignItems>,
    pub justify_content: Option<JustifyContent>,
    pub padding: Edges,
    pub margin: Edges,
    pub column_gap: Option<u16>,
    pub row_gap: Option<u16>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub min_width: Option<Dimension>,
    pub min_height: Option<Dimension>,
    pub max_width: Option<Dimension>,
    pub max_height: Option<Dimension>,
}

impl LayoutStyle {
    /// Overlays the set attributes of `other` onto `self`.
    pub fn merge(&mut self, other: &LayoutStyle) {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if other.$field.is_some() { self.$field = other.$field; } )*
            };
        }
        take!(
            flex_direction,
            flex_wrap,
            flex_grow,
            flex_shrink,
            flex_basis,
            align_items,
            align_self,
            justify_content,
            column_gap,
            row_gap,
            width,
            height,
            min_width,
            min_height,
            max_width,
            max_height
        );
        self.padding.merge(&other.padding);
        self.margin.merge(&other.margin);
    }

    pub fn direction(&self) -> FlexDirection {
        self.flex_direction.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn composition_order_is_fixed() {
        let style = Style::new()
            .bg(Color::Blue)
            .fg(Color::Red)
            .strikethrough()
            .underline()
            .italic()
            .dim()
            .bold();

        assert_eq!(
            style.to_ansi_codes(),
            "\x1b[1m\x1b[2m\x1b[3m\x1b[4m\x1b[9m\x1b[38;5;1m\x1b[48;5;4m"
        );
    }

    #[test]
    fn plain_style_paints_nothing() {
        assert_eq!(Style::new().paint("x"), "x");
        assert_eq!(Style::new().bold().paint(""), "");
    }

    #[test]
    fn bold_red_is_deterministic() {
        let a = Style::new().bold().fg(Color::Red).paint("X");
        let b = Style::new().fg(Color::Red).bold().paint("X");
        assert_eq!(a, "\x1b[1m\x1b[38;5;1mX\x1b[0m");
        assert_eq!(a, b);
    }

    #[test]
    fn named_colors_use_the_normal_palette_slots() {
        assert_eq!(Color::Red.fg_sequence(), "\x1b[38;5;1m");
        assert_eq!(Color::BrightRed.fg_sequence(), "\x1b[38;5;9m");
        assert_eq!(Color::Gray.bg_sequence(), "\x1b[48;5;8m");
        assert_eq!(Color::White.fg_sequence(), "\x1b[38;5;7m");
    }

    #[test]
    fn extended_colors_use_38_and_48() {
        assert_eq!(Color::Ansi256(208).fg_sequence(), "\x1b[38;5;208m");
        assert_eq!(Color::Rgb(1, 2, 3).bg_sequence(), "\x1b[48;2;1;2;3m");
    }

    #[test]
    fn reset_clears_all_attributes() {
        assert_eq!(reset(), "\x1b[0m");
    }

    #[test_case("12", Dimension::Cells(12))]
    #[test_case("50%", Dimension::Percent(50.0))]
    #[test_case("auto", Dimension::Auto)]
    fn parses_dimensions(input: &str, expected: Dimension) {
        assert_eq!(input.parse::<Dimension>().unwrap(), expected);
    }

    #[test_case("wide" ; "word")]
    #[test_case("12px" ; "unit suffix")]
    #[test_case("x%" ; "bad percentage")]
    fn rejects_bad_dimensions(input: &str) {
        assert!(matches!(
            input.parse::<Dimension>(),
            Err(RenderError::InvalidDimension(ref s)) if s == input
        ));
    }

    #[test]
    fn layout_merge_keeps_unset_attributes() {
        let mut base = LayoutStyle {
            flex_direction: Some(FlexDirection::Row),
            width: Some(Dimension::Cells(10)),
            padding: Edges::all(1),
            ..Default::default()
        };
        let update = LayoutStyle {
            width: Some(Dimension::Percent(50.0)),
            padding: Edges {
                left: Some(3),
                ..Default::default()
            },
            ..Default::default()
        };

        base.merge(&update);

        assert_eq!(base.flex_direction, Some(FlexDirection::Row));
        assert_eq!(base.width, Some(Dimension::Percent(50.0)));
        assert_eq!(base.padding.left, Some(3));
        assert_eq!(base.padding.top, Some(1));
    }
}
