//! Timestamp canonicalization to `YYYY-MM-DD HH:MM:SS`
//!
//! Normalization runs in passes:
//!
//! 1. Pre-clean: `年` and `月` become `-`, `日` is dropped, surrounding whitespace trimmed
//! 2. Glue repair: a date directly followed by `HH:MM` gets a space inserted
//! 3. Whitespace runs collapse to one space
//! 4. Shape dispatch over [`TimeShape::PRIORITY`], first match wins
//!
//! Every shape captures the same named groups (`y`, `m`, `d` and optionally
//! `H`, `M`, `S`), so one formatter produces the canonical form for all of
//! them. Values are reshaped, never validated: month 13 stays month 13.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static HYPHEN_GLUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4}-[0-9]{1,2}-[0-9]{1,2})([0-9]{2}:[0-9]{2})").unwrap());
static SLASH_GLUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4}/[0-9]{1,2}/[0-9]{1,2})([0-9]{2}:[0-9]{2})").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static COMPACT_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<y>[0-9]{4})(?P<m>[0-9]{2})(?P<d>[0-9]{2})(?P<H>[0-9]{2})(?P<M>[0-9]{2})(?P<S>[0-9]{2})$").unwrap()
});
static COMPACT_SPLIT_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<y>[0-9]{4})(?P<m>[0-9]{2})(?P<d>[0-9]{2})\s+(?P<H>[0-9]{2})(?P<M>[0-9]{2})(?P<S>[0-9]{2})$")
        .unwrap()
});
static COMPACT_MINUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<y>[0-9]{4})(?P<m>[0-9]{2})(?P<d>[0-9]{2})(?P<H>[0-9]{2})(?P<M>[0-9]{2})$").unwrap()
});
static COMPACT_SPLIT_MINUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<y>[0-9]{4})(?P<m>[0-9]{2})(?P<d>[0-9]{2})\s+(?P<H>[0-9]{2})(?P<M>[0-9]{2})$").unwrap()
});
static COMPACT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<y>[0-9]{4})(?P<m>[0-9]{2})(?P<d>[0-9]{2})$").unwrap());

static HYPHEN_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<y>[0-9]{4})-(?P<m>[0-9]{1,2})-(?P<d>[0-9]{1,2})\s+(?P<H>[0-9]{1,2}):(?P<M>[0-9]{2}):(?P<S>[0-9]{2})$")
        .unwrap()
});
static HYPHEN_MINUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<y>[0-9]{4})-(?P<m>[0-9]{1,2})-(?P<d>[0-9]{1,2})\s+(?P<H>[0-9]{1,2}):(?P<M>[0-9]{2})$").unwrap()
});
static HYPHEN_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<y>[0-9]{4})-(?P<m>[0-9]{1,2})-(?P<d>[0-9]{1,2})$").unwrap());

static SLASH_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<y>[0-9]{4})/(?P<m>[0-9]{1,2})/(?P<d>[0-9]{1,2})\s+(?P<H>[0-9]{1,2}):(?P<M>[0-9]{2}):(?P<S>[0-9]{2})$")
        .unwrap()
});
static SLASH_MINUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<y>[0-9]{4})/(?P<m>[0-9]{1,2})/(?P<d>[0-9]{1,2})\s+(?P<H>[0-9]{1,2}):(?P<M>[0-9]{2})$").unwrap()
});
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<y>[0-9]{4})/(?P<m>[0-9]{1,2})/(?P<d>[0-9]{1,2})$").unwrap());
// Not anchored at the end: trailing text after the date is dropped.
static SLASH_DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<y>[0-9]{4})/(?P<m>[0-9]{1,2})/(?P<d>[0-9]{1,2})").unwrap());

static CANONICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<y>[0-9]{4})-(?P<m>[0-9]{2})-(?P<d>[0-9]{2}) (?P<H>[0-9]{2}):(?P<M>[0-9]{2}):(?P<S>[0-9]{2})$").unwrap()
});

/// Recognized raw timestamp spellings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeShape {
    /// `YYYYMMDDHHMMSS`
    CompactFull,
    /// `YYYYMMDD HHMMSS`
    CompactSplitFull,
    /// `YYYYMMDDHHMM`
    CompactMinutes,
    /// `YYYYMMDD HHMM`
    CompactSplitMinutes,
    /// `YYYYMMDD`
    CompactDate,
    /// `YYYY-M-D H:MM:SS`, one or two digits for month, day and hour
    HyphenFull,
    /// `YYYY-M-D H:MM`
    HyphenMinutes,
    /// `YYYY-M-D`
    HyphenDate,
    /// `YYYY/M/D H:MM:SS`
    SlashFull,
    /// `YYYY/M/D H:MM`
    SlashMinutes,
    /// `YYYY/M/D`
    SlashDate,
    /// `YYYY/M/D` followed by anything
    SlashDatePrefix,
    /// Already `YYYY-MM-DD HH:MM:SS`
    Canonical,
}

impl TimeShape {
    /// Dispatch order; the first matching shape wins
    pub const PRIORITY: [TimeShape; 13] = [
        TimeShape::CompactFull,
        TimeShape::CompactSplitFull,
        TimeShape::CompactMinutes,
        TimeShape::CompactSplitMinutes,
        TimeShape::CompactDate,
        TimeShape::HyphenFull,
        TimeShape::HyphenMinutes,
        TimeShape::HyphenDate,
        TimeShape::SlashFull,
        TimeShape::SlashMinutes,
        TimeShape::SlashDate,
        TimeShape::SlashDatePrefix,
        TimeShape::Canonical,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            TimeShape::CompactFull => &COMPACT_FULL,
            TimeShape::CompactSplitFull => &COMPACT_SPLIT_FULL,
            TimeShape::CompactMinutes => &COMPACT_MINUTES,
            TimeShape::CompactSplitMinutes => &COMPACT_SPLIT_MINUTES,
            TimeShape::CompactDate => &COMPACT_DATE,
            TimeShape::HyphenFull => &HYPHEN_FULL,
            TimeShape::HyphenMinutes => &HYPHEN_MINUTES,
            TimeShape::HyphenDate => &HYPHEN_DATE,
            TimeShape::SlashFull => &SLASH_FULL,
            TimeShape::SlashMinutes => &SLASH_MINUTES,
            TimeShape::SlashDate => &SLASH_DATE,
            TimeShape::SlashDatePrefix => &SLASH_DATE_PREFIX,
            TimeShape::Canonical => &CANONICAL,
        }
    }

    /// True if `text` (already cleaned) has this shape
    pub fn matches(self, text: &str) -> bool {
        self.pattern().is_match(text)
    }

    /// Canonical form of `text`, or `None` if it does not have this shape
    pub fn canonicalize(self, text: &str) -> Option<String> {
        if self == TimeShape::Canonical {
            return self.matches(text).then(|| text.to_string());
        }
        self.pattern().captures(text).map(|caps| format_canonical(&caps))
    }

    /// First shape in priority order that `text` has
    pub fn classify(text: &str) -> Option<TimeShape> {
        Self::PRIORITY.into_iter().find(|shape| shape.matches(text))
    }
}

fn format_canonical(caps: &Captures<'_>) -> String {
    let group = |name: &str| caps.name(name).map_or("00", |m| m.as_str());
    format!(
        "{}-{:0>2}-{:0>2} {:0>2}:{:0>2}:{:0>2}",
        group("y"),
        group("m"),
        group("d"),
        group("H"),
        group("M"),
        group("S"),
    )
}

fn pre_clean(raw: &str) -> String {
    raw.replace('年', "-")
        .replace('月', "-")
        .replace('日', "")
        .trim()
        .to_string()
}

fn repair_glue(text: &str) -> String {
    let text = HYPHEN_GLUE.replace(text, "$1 $2");
    SLASH_GLUE.replace(&text, "$1 $2").into_owned()
}

fn clean(raw: &str) -> String {
    let text = repair_glue(&pre_clean(raw));
    WHITESPACE_RUN.replace_all(&text, " ").into_owned()
}

/// Canonicalize a raw timestamp to `YYYY-MM-DD HH:MM:SS`
///
/// Never fails. Input matching no [`TimeShape`] is returned after cleaning
/// (glyph substitution, glue repair, whitespace collapse) but is otherwise
/// unconverted.
///
/// # Examples
///
/// ```
/// use skymark_extractor::normalize::normalize_time;
///
/// assert_eq!(normalize_time("2023-7-20 9:47"), "2023-07-20 09:47:00");
/// assert_eq!(normalize_time("2024年01月15日 14:30:45"), "2024-01-15 14:30:45");
/// assert_eq!(normalize_time("not a time"), "not a time");
/// ```
pub fn normalize_time(raw: &str) -> String {
    let cleaned = clean(raw);
    TimeShape::PRIORITY
        .into_iter()
        .find_map(|shape| shape.canonicalize(&cleaned))
        .unwrap_or(cleaned)
}
