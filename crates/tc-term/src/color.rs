// SPDX-License-Identifier: MIT
//
// Color codec — color specifiers in, SGR-wrapped strings out, and back.
//
// The forward direction turns a color specifier (alias, palette index, RGB
// triple, hex string) plus a payload into `prefix + payload + reset`. The
// reverse direction takes such a string apart again:
//
//   extract_pure   → the human-visible payload
//   extract_style  → the escape fragments around it, with a splice point
//
// Stacked styles nest symmetrically, so the payload always sits in the
// middle fragment once the string is split on every CSI introducer:
//
//   "\x1b[41m\x1b[37mX\x1b[0m\x1b[0m"
//    ""  | "41m" | "37mX" | "0m" | "0m"        ← middle = "37mX" → "X"
//
// Locating the payload by byte offset (rather than splitting the string on
// the payload text) keeps the skeleton intact when the payload also occurs
// inside an escape code, e.g. the glyph "1" inside "\x1b[31m".
//
// Every function here is stateless. The alias registry is built once on
// first use and never mutated.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::ansi::{self, CSI, RESET};
use crate::error::ColorError;

// ─── Alias Registry ──────────────────────────────────────────────────────────

/// Suffix selecting the background variant of a base color alias.
pub const BG_SUFFIX: &str = "Bg";

/// Base 16-color palette aliases, indexed by palette entry.
///
/// The first name of each entry is the canonical one.
pub const BASE_COLORS: [&[&str]; 16] = [
    &["black"],
    &["red"],
    &["green"],
    &["yellow"],
    &["blue"],
    &["magenta"],
    &["cyan"],
    &["white"],
    &["brightBlack", "lightBlack", "gray", "grey"],
    &["brightRed", "lightRed"],
    &["brightGreen", "lightGreen"],
    &["brightYellow", "lightYellow"],
    &["brightBlue", "lightBlue"],
    &["brightMagenta", "lightMagenta"],
    &["brightCyan", "lightCyan"],
    &["brightWhite", "lightWhite"],
];

/// Text attribute aliases keyed by SGR code. Attributes have no `…Bg` form.
pub const ATTRIBUTES: [(u8, &[&str]); 18] = [
    (0, &["reset", "normal"]),
    (1, &["bold"]),
    (2, &["dim", "faint"]),
    (3, &["italic"]),
    (4, &["underline"]),
    (5, &["slowBlink", "blink"]),
    (6, &["rapidBlink", "fastBlink"]),
    (7, &["reverse", "invert"]),
    (8, &["conceal", "hide", "invisible"]),
    (9, &["strike", "crossedOut"]),
    (21, &["doubleUnderline", "boldOff"]),
    (22, &["boldOrDimOff"]),
    (23, &["italicOff"]),
    (24, &["underlineOff"]),
    (25, &["blinkOff"]),
    (27, &["reverseOff", "invertOff"]),
    (28, &["concealOff", "show", "visible"]),
    (29, &["crossedOutOff"]),
];

static REGISTRY: LazyLock<HashMap<String, String>> = LazyLock::new(build_registry);

fn sgr_string(code: u8) -> String {
    format!("{CSI}{code}m")
}

fn build_registry() -> HashMap<String, String> {
    let mut map = HashMap::new();

    for (idx, names) in (0u8..).zip(BASE_COLORS) {
        let fg = sgr_string(ansi::ansi16_code(idx, false));
        let bg = sgr_string(ansi::ansi16_code(idx, true));
        for name in names {
            map.insert((*name).to_owned(), fg.clone());
            map.insert(format!("{name}{BG_SUFFIX}"), bg.clone());
        }
    }

    for (code, names) in ATTRIBUTES {
        let seq = sgr_string(code);
        for name in names {
            map.insert((*name).to_owned(), seq.clone());
        }
    }

    map
}

/// Look up an alias (case-sensitive) and return its escape sequence.
///
/// ```
/// use tc_term::color::resolve_alias;
///
/// assert_eq!(resolve_alias("red"), Some("\x1b[31m"));
/// assert_eq!(resolve_alias("redBg"), Some("\x1b[41m"));
/// assert_eq!(resolve_alias("Red"), None);
/// ```
#[must_use]
pub fn resolve_alias(name: &str) -> Option<&'static str> {
    REGISTRY.get(name).map(String::as_str)
}

/// Every registered alias, sorted.
#[must_use]
pub fn aliases() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

/// The canonical alias of a 16-color palette entry, if `idx < 16`.
#[must_use]
pub fn alias_for_index(idx: u8) -> Option<&'static str> {
    BASE_COLORS.get(usize::from(idx)).map(|names| names[0])
}

// ─── Forward: payload → escaped ──────────────────────────────────────────────

/// Wrap `text` with an opening sequence and a reset.
fn wrap(text: &str, open: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::with_capacity(text.len() + 24);
    // Writing into a String cannot fail.
    let _ = open(&mut out);
    out.push_str(text);
    out.push_str(RESET);
    out
}

/// Wrap `text` with a registered alias, or `None` if the alias is unknown.
#[must_use]
pub fn apply_alias(text: &str, name: &str) -> Option<String> {
    resolve_alias(name).map(|seq| {
        wrap(text, |w| {
            w.push_str(seq);
            Ok(())
        })
    })
}

/// Color `text` with a 16-color palette entry.
///
/// # Errors
///
/// [`ColorError::IndexOutOfRange`] if `idx > 15`.
pub fn apply_4bit(text: &str, idx: u8, background: bool) -> Result<String, ColorError> {
    if idx > 15 {
        return Err(ColorError::IndexOutOfRange {
            index: u32::from(idx),
            max: 15,
        });
    }
    Ok(wrap(text, |w| ansi::ansi16(w, idx, background)))
}

/// Color `text` with a 256-color palette entry.
///
/// The index wraps modulo 256 (negatives wrap upward), so every integer
/// resolves to a valid entry and multiples of 256 resolve to entry 0.
#[must_use]
pub fn apply_8bit(text: &str, idx: i64, background: bool) -> String {
    // rem_euclid(256) is always in 0..256.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = idx.rem_euclid(256) as u8;
    wrap(text, |w| ansi::ansi256(w, idx, background))
}

/// Round a channel to 0–255. Non-finite values become 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(v: f64) -> u8 {
    if v.is_finite() {
        // Safe: clamped to 0.0..=255.0 before truncation.
        (v + 0.5).floor().clamp(0.0, 255.0) as u8
    } else {
        0
    }
}

/// Color `text` with a 24-bit RGB value.
///
/// Channels are rounded half-up and clamped; NaN and infinities become 0.
#[must_use]
pub fn apply_rgb(text: &str, r: f64, g: f64, b: f64, background: bool) -> String {
    let (r, g, b) = (channel(r), channel(g), channel(b));
    wrap(text, |w| ansi::rgb(w, r, g, b, background))
}

/// Color `text` with a hex string (`#RRGGBB`, `RRGGBB`, `#RGB`, `RGB`).
///
/// # Errors
///
/// [`ColorError::InvalidHex`] if the string has the wrong length or
/// contains non-hex digits.
pub fn apply_hex(text: &str, hex: &str, background: bool) -> Result<String, ColorError> {
    let (r, g, b) = parse_hex(hex)?;
    Ok(apply_rgb(
        text,
        f64::from(r),
        f64::from(g),
        f64::from(b),
        background,
    ))
}

/// Color `text` according to any [`ColorSpec`].
///
/// Dispatch:
/// - numeric index below 16 → 16-color, below 256 → 256-color, otherwise
///   a packed `0xRRGGBB` value;
/// - hex-looking alias (`#…`, or six bare hex digits that are not a
///   registered alias) → decoded as hex, so a malformed `"#12"` is an error;
/// - alias → registry lookup. With `background`, the `…Bg` variant is tried
///   first, then the plain alias. An unknown alias returns `text` unchanged.
///
/// # Errors
///
/// Malformed hex strings and out-of-range indices.
pub fn keyword(text: &str, spec: &ColorSpec, background: bool) -> Result<String, ColorError> {
    match spec {
        ColorSpec::Index(n) => match *n {
            // Guarded by the match arm: n < 16 fits in u8.
            #[allow(clippy::cast_possible_truncation)]
            n @ 0..16 => apply_4bit(text, n as u8, background),
            n @ 16..256 => Ok(apply_8bit(text, i64::from(n), background)),
            n @ 256..=0xFF_FFFF => {
                let [_, r, g, b] = n.to_be_bytes();
                Ok(apply_rgb(
                    text,
                    f64::from(r),
                    f64::from(g),
                    f64::from(b),
                    background,
                ))
            }
            n => Err(ColorError::IndexOutOfRange {
                index: n,
                max: 0xFF_FFFF,
            }),
        },
        ColorSpec::Ansi16(idx) => apply_4bit(text, *idx, background),
        ColorSpec::Ansi256(idx) => Ok(apply_8bit(text, i64::from(*idx), background)),
        ColorSpec::Rgb(r, g, b) => Ok(apply_rgb(
            text,
            f64::from(*r),
            f64::from(*g),
            f64::from(*b),
            background,
        )),
        ColorSpec::Hex(hex) => apply_hex(text, hex, background),
        ColorSpec::Alias(name) if looks_like_hex(name) => apply_hex(text, name, background),
        ColorSpec::Alias(name) => {
            let styled = if background {
                apply_alias(text, &format!("{name}{BG_SUFFIX}"))
                    .or_else(|| apply_alias(text, name))
            } else {
                apply_alias(text, name)
            };
            Ok(styled.unwrap_or_else(|| text.to_owned()))
        }
    }
}

/// Whether an alias string is really a hex color.
fn looks_like_hex(name: &str) -> bool {
    name.starts_with('#')
        || (name.len() == 6
            && name.bytes().all(|b| b.is_ascii_hexdigit())
            && resolve_alias(name).is_none())
}

/// Apply a foreground then a background specifier to `text`.
///
/// # Errors
///
/// Whatever [`keyword`] returns for either specifier.
pub fn colorize(text: &str, fg: &ColorSpec, bg: &ColorSpec) -> Result<String, ColorError> {
    keyword(&keyword(text, fg, false)?, bg, true)
}

// ─── Reverse: escaped → payload / skeleton ───────────────────────────────────

/// Byte range of the visible payload inside an escaped string.
fn payload_span(escaped: &str) -> Range<usize> {
    let starts: Vec<usize> = escaped.match_indices(CSI).map(|(i, _)| i).collect();
    if starts.is_empty() {
        return 0..escaped.len();
    }

    // Fragment k (k ≥ 1) runs from just after starts[k-1]'s introducer to
    // starts[k] (or the end). With n+1 fragments the payload is fragment
    // (n+1)/2, which is always ≥ 1 here.
    let mid = (starts.len() + 1) / 2;
    let frag_start = starts[mid - 1] + CSI.len();
    let frag_end = starts.get(mid).copied().unwrap_or(escaped.len());
    let fragment = &escaped.as_bytes()[frag_start..frag_end];

    let params = fragment
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b';' || **b == b':')
        .count();

    if fragment.get(params) == Some(&b'm') {
        (frag_start + params + 1)..frag_end
    } else {
        frag_start..frag_end
    }
}

/// The human-visible payload of an escaped string.
///
/// Plain strings come back unchanged.
///
/// ```
/// use tc_term::color::extract_pure;
///
/// assert_eq!(extract_pure("\x1b[41m\x1b[37mhi\x1b[0m\x1b[0m"), "hi");
/// assert_eq!(extract_pure("plain"), "plain");
/// ```
#[must_use]
pub fn extract_pure(escaped: &str) -> &str {
    &escaped[payload_span(escaped)]
}

/// The style skeleton around the payload of an escaped string.
#[must_use]
pub fn extract_style(escaped: &str) -> Style {
    Style::from_escaped(escaped)
}

/// Splice `payload` into a skeleton: `prefix + payload + suffix`.
#[must_use]
pub fn recompose(style: &Style, payload: &str) -> String {
    style.paint(payload)
}

/// Split a region at every CSI introducer, keeping each introducer with
/// the text that follows it.
fn split_fragments(region: &str) -> Vec<&str> {
    let mut cuts: Vec<usize> = region.match_indices(CSI).map(|(i, _)| i).collect();
    if cuts.first() != Some(&0) {
        cuts.insert(0, 0);
    }
    cuts.push(region.len());
    cuts.windows(2)
        .map(|w| &region[w[0]..w[1]])
        .filter(|s| !s.is_empty())
        .collect()
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// A style skeleton: the ordered escape fragments around a payload plus the
/// index at which a new payload is spliced in.
///
/// Built once from a fully colorized string, then reused to paint any number
/// of payloads with identical styling, without resolving colors again.
///
/// ```
/// use tc_term::color::{colorize, ColorSpec, Style};
///
/// let escaped = colorize("text", &"red".into(), &"blue".into()).unwrap();
/// let style = Style::from_escaped(&escaped);
///
/// assert_eq!(style.splice_point(), 2);
/// assert_eq!(style.paint("x"), "\x1b[44m\x1b[31mx\x1b[0m\x1b[0m");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    fragments: Vec<String>,
    splice: usize,
}

impl Style {
    /// The skeleton of an escaped string.
    #[must_use]
    pub fn from_escaped(escaped: &str) -> Self {
        let span = payload_span(escaped);
        let prefix: Vec<String> = split_fragments(&escaped[..span.start])
            .into_iter()
            .map(str::to_owned)
            .collect();
        let splice = prefix.len();
        let mut fragments = prefix;
        fragments.extend(
            split_fragments(&escaped[span.end..])
                .into_iter()
                .map(str::to_owned),
        );
        Self { fragments, splice }
    }

    /// A skeleton from an explicit fragment list, splicing at the middle.
    #[must_use]
    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fragments: Vec<String> = fragments.into_iter().map(Into::into).collect();
        let splice = fragments.len() / 2;
        Self { fragments, splice }
    }

    /// A skeleton from a dotted keyword chain such as `"red.whiteBg.bold"`.
    ///
    /// Each keyword is parsed as a [`ColorSpec`] and applied in order.
    ///
    /// # Errors
    ///
    /// Any keyword that fails to parse or apply.
    pub fn from_keywords(chain: &str) -> Result<Self, ColorError> {
        let mut placeholder = String::from(" ");
        for kw in chain.split('.').filter(|kw| !kw.is_empty()) {
            placeholder = keyword(&placeholder, &kw.parse()?, false)?;
        }
        Ok(Self::from_escaped(&placeholder))
    }

    /// The fragments in order.
    #[inline]
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Number of fragments preceding the payload.
    #[inline]
    #[must_use]
    pub const fn splice_point(&self) -> usize {
        self.splice
    }

    /// Whether the skeleton carries no styling at all.
    #[inline]
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Everything before the payload.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.fragments[..self.splice].concat()
    }

    /// Everything after the payload.
    #[must_use]
    pub fn suffix(&self) -> String {
        self.fragments[self.splice..].concat()
    }

    /// Paint a new payload with this skeleton.
    #[must_use]
    pub fn paint(&self, payload: &str) -> String {
        let mut out = String::with_capacity(
            payload.len() + self.fragments.iter().map(String::len).sum::<usize>(),
        );
        for fragment in &self.fragments[..self.splice] {
            out.push_str(fragment);
        }
        out.push_str(payload);
        for fragment in &self.fragments[self.splice..] {
            out.push_str(fragment);
        }
        out
    }
}

// ─── ColorSpec ───────────────────────────────────────────────────────────────

/// Any way of naming a color.
///
/// `From<&str>` always builds an alias, which [`keyword`] still decodes as
/// hex when it looks like one. Use [`str::parse`] to validate hex strings up
/// front and to recognise numeric indices in text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorSpec {
    /// A registry alias such as `"red"`, `"brightBlueBg"`, or `"bold"`.
    Alias(String),
    /// A number dispatched by magnitude (16-color, 256-color, packed RGB).
    Index(u32),
    /// A 16-color palette entry (0–15).
    Ansi16(u8),
    /// A 256-color palette entry.
    Ansi256(u8),
    /// A 24-bit color.
    Rgb(u8, u8, u8),
    /// A hex string, `#RRGGBB` or `RRGGBB` (short forms accepted).
    Hex(String),
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self::Alias("white".to_owned())
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias(name) => f.write_str(name),
            Self::Index(n) => write!(f, "{n}"),
            Self::Ansi16(n) => write!(f, "ansi16({n})"),
            Self::Ansi256(n) => write!(f, "ansi256({n})"),
            Self::Rgb(r, g, b) => write!(f, "rgb({r}, {g}, {b})"),
            Self::Hex(hex) => f.write_str(hex),
        }
    }
}

impl FromStr for ColorSpec {
    type Err = ColorError;

    /// `#…` → hex (validated), all digits → index, anything else → alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('#') {
            parse_hex(s)?;
            return Ok(Self::Hex(s.to_owned()));
        }
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u32>()
                .map(Self::Index)
                .map_err(|_| ColorError::IndexOutOfRange {
                    index: u32::MAX,
                    max: 0xFF_FFFF,
                });
        }
        Ok(Self::Alias(s.to_owned()))
    }
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> Self {
        Self::Alias(name.to_owned())
    }
}

impl From<String> for ColorSpec {
    fn from(name: String) -> Self {
        Self::Alias(name)
    }
}

impl From<u8> for ColorSpec {
    fn from(n: u8) -> Self {
        Self::Index(u32::from(n))
    }
}

impl From<u32> for ColorSpec {
    fn from(n: u32) -> Self {
        Self::Index(n)
    }
}

impl From<(u8, u8, u8)> for ColorSpec {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::Rgb(r, g, b)
    }
}

// ─── Hex Parsing ─────────────────────────────────────────────────────────────

/// Parse a hex color string into byte channels.
fn parse_hex(input: &str) -> Result<(u8, u8, u8), ColorError> {
    let invalid = || ColorError::InvalidHex {
        input: input.to_owned(),
    };
    let s = input.strip_prefix('#').unwrap_or(input);
    let b = s.as_bytes();

    match b.len() {
        // #RGB
        3 => {
            let r = parse_hex_digit(b[0]).ok_or_else(invalid)?;
            let g = parse_hex_digit(b[1]).ok_or_else(invalid)?;
            let bl = parse_hex_digit(b[2]).ok_or_else(invalid)?;
            Ok((r << 4 | r, g << 4 | g, bl << 4 | bl))
        }
        // #RRGGBB
        6 => {
            let r = parse_hex_byte(&b[0..2]).ok_or_else(invalid)?;
            let g = parse_hex_byte(&b[2..4]).ok_or_else(invalid)?;
            let bl = parse_hex_byte(&b[4..6]).ok_or_else(invalid)?;
            Ok((r, g, bl))
        }
        _ => Err(invalid()),
    }
}

#[inline]
const fn parse_hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn parse_hex_byte(bytes: &[u8]) -> Option<u8> {
    let hi = parse_hex_digit(bytes[0])?;
    let lo = parse_hex_digit(bytes[1])?;
    Some(hi << 4 | lo)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
