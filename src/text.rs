//! Text normalization helpers shared by the renderers.
//!
//! Everything user-visible is French marketing copy, but the model output and
//! the user comments mix accents, casing and English color names freely. The
//! helpers here fold all of that into comparable or displayable forms.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Normalize text for accent-insensitive substring checks.
///
/// NFKD-decomposes, drops combining marks, lowercases. Idempotent: applying it
/// twice yields the same string.
pub fn normalize_for_comparison(value: &str) -> String {
    value
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when `needle` occurs in `haystack`, ignoring accents and case.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    if haystack.is_empty() || needle.is_empty() {
        return false;
    }
    normalize_for_comparison(haystack).contains(&normalize_for_comparison(needle))
}

/// Append a `%` sign when the value has none. Empty stays empty.
pub fn ensure_percent(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.ends_with('%') {
        trimmed.to_string()
    } else {
        format!("{}%", trimmed)
    }
}

static APPAREL_NX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)X$").unwrap());

/// Normalize apparel size labels to a consistent FR-friendly format.
///
/// `"1X"` becomes `"XL"`, `"3X"` becomes `"XXXL"`, `"4X"` becomes `"4XL"`.
/// Anything else is returned trimmed but otherwise untouched.
pub fn normalize_apparel_size(value: &str) -> String {
    let cleaned = value.trim();
    if cleaned.is_empty() {
        return String::new();
    }

    let collapsed: String = cleaned
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    let Some(caps) = APPAREL_NX.captures(&collapsed) else {
        return cleaned.to_string();
    };

    let count: usize = caps[1].parse().unwrap_or(0);
    if count == 0 {
        return collapsed;
    }
    if count <= 3 {
        format!("{}L", "X".repeat(count))
    } else {
        format!("{}XL", count)
    }
}

static US_WAIST_MARKED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)w\s*([0-9]{2,3})").unwrap());
static US_WAIST_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]{2,3})").unwrap());

/// Normalize US waist label strings (`"W33"`, `"33/32"`) down to the numeric token.
pub fn normalize_us_waist_label(value: &str) -> String {
    let cleaned = value.trim();
    if cleaned.is_empty() {
        return String::new();
    }
    if let Some(caps) = US_WAIST_MARKED.captures(cleaned) {
        return caps[1].to_string();
    }
    if let Some(caps) = US_WAIST_BARE.captures(cleaned) {
        return caps[1].to_string();
    }
    cleaned.to_string()
}

static SIZE_TOKEN_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Z0-9]+").unwrap());
static SIZE_HASHTAG_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"^(?:\d+)?X{0,4}[SML]$", r"^TU$", r"^T[0-9]+$", r"^\d{2,3}$"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

/// Return an uppercase token suitable for the size-coded hashtags.
///
/// Picks, in priority order, an apparel size (`XL`, `2XS`…), `TU`, a `T38`-style
/// token or a bare 2-3 digit number; falls back to the first token, then to a
/// sanitized concatenation, then to `default`.
pub fn normalize_size_hashtag(value: &str, default: &str) -> String {
    let normalized = value.trim().to_uppercase();
    if normalized.is_empty() {
        return default.to_string();
    }

    let without_keyword = normalized.replace("TAILLE", " ");
    let tokens: Vec<&str> = SIZE_TOKEN_SPLIT
        .split(&without_keyword)
        .filter(|t| !t.is_empty())
        .collect();

    for pattern in SIZE_HASHTAG_PATTERNS.iter() {
        for token in &tokens {
            if pattern.is_match(token) {
                return (*token).to_string();
            }
        }
    }

    if let Some(first) = tokens.first() {
        return (*first).to_string();
    }

    let fallback: String = normalized.chars().filter(|c| c.is_alphanumeric()).collect();
    if fallback.is_empty() {
        default.to_string()
    } else {
        fallback
    }
}

static PAREN_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

/// Return the core size value, e.g. `"XL"` from `"FR 42 (XL)"`.
pub fn extract_primary_size_label(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(caps) = PAREN_SUFFIX.captures(trimmed) {
        let inner = caps[1].trim();
        if !inner.is_empty() {
            return Some(inner.to_string());
        }
    }
    Some(trimmed.to_string())
}

/// Neckline wordings recognized inside a free-form knit pattern description.
const NECKLINE_CANDIDATES: &[&str] = &[
    "col v",
    "col en v",
    "encolure v",
    "encolure en v",
    "col rond",
    "encolure ronde",
    "col bateau",
    "encolure bateau",
    "col montant",
    "col roulé",
    "col roulee",
    "encolure roulée",
    "encolure roulee",
    "col cheminée",
    "col cheminee",
    "col tunisien",
    "col zippé",
    "col zippe",
    "col henley",
    "col polo",
    "col camionneur",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split a neckline wording out of a pattern description.
///
/// Returns `(residual_pattern, neckline)` where `neckline` is the matched span
/// of the *original* text (accents and casing preserved). Matching happens on
/// the normalized text; an index map built during decomposition carries the
/// match back onto original byte offsets, since decomposition changes character
/// counts.
pub fn split_neckline_from_pattern(pattern: &str) -> (String, String) {
    let text = pattern.trim();
    if text.is_empty() {
        return (String::new(), String::new());
    }

    // Each normalized char remembers the byte span of the original char it
    // came from.
    let mut normalized_chars: Vec<char> = Vec::new();
    let mut index_map: Vec<(usize, usize)> = Vec::new();
    for (byte_idx, ch) in text.char_indices() {
        let span = (byte_idx, byte_idx + ch.len_utf8());
        for piece in ch.nfkd() {
            if is_combining_mark(piece) {
                continue;
            }
            for lowered in piece.to_lowercase() {
                normalized_chars.push(lowered);
                index_map.push(span);
            }
        }
    }
    if normalized_chars.is_empty() {
        return (text.to_string(), String::new());
    }
    let normalized_text: String = normalized_chars.iter().collect();

    for candidate in NECKLINE_CANDIDATES {
        let needle = normalize_for_comparison(candidate);
        if needle.is_empty() {
            continue;
        }

        // Word-boundary search over the normalized char sequence.
        let needle_len = needle.chars().count();
        let mut found: Option<(usize, usize)> = None;
        for (offset, _) in normalized_text.match_indices(&needle) {
            // Convert the byte offset into a char offset.
            let char_start = normalized_text[..offset].chars().count();
            let char_end = char_start + needle_len;
            let before_ok = char_start == 0 || !is_word_char(normalized_chars[char_start - 1]);
            let after_ok =
                char_end >= normalized_chars.len() || !is_word_char(normalized_chars[char_end]);
            if before_ok && after_ok {
                found = Some((char_start, char_end));
                break;
            }
        }
        let Some((char_start, char_end)) = found else {
            continue;
        };

        let start_byte = index_map[char_start].0;
        let end_byte = index_map[char_end - 1].1;
        let neckline = text[start_byte..end_byte].trim().to_string();

        let before = text[..start_byte].trim_end();
        let after = text[end_byte..].trim_start();
        let residual = match (before.is_empty(), after.is_empty()) {
            (true, true) => String::new(),
            (false, true) => before.to_string(),
            (true, false) => after.to_string(),
            (false, false) => format!("{} {}", before, after),
        };
        return (residual, neckline);
    }

    (text.to_string(), String::new())
}

/// Extract the first isolated 3-4 digit run of a model wording.
///
/// `"470 Signature super skinny"` gives `"470"`, `"Wedgie501 premium"` gives
/// `"501 Premium"`. Runs of another length never match, so `"Tommy 01"` yields
/// nothing.
pub fn normalize_model_code(model: &str) -> Option<String> {
    let trimmed = model.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut code: Option<String> = None;
    let mut run = String::new();
    for ch in trimmed.chars().chain(std::iter::once(' ')) {
        if ch.is_ascii_digit() {
            run.push(ch);
            continue;
        }
        if (3..=4).contains(&run.len()) && code.is_none() {
            code = Some(run.clone());
        }
        run.clear();
    }

    let code = code?;
    if normalize_for_comparison(trimmed).contains("premium") {
        Some(format!("{} Premium", code))
    } else {
        Some(code)
    }
}

/// English to French color wordings, keyed by normalized English name.
static COLOR_TRANSLATIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("black", "noir"),
        ("white", "blanc"),
        ("off white", "blanc cassé"),
        ("blue", "bleu"),
        ("light blue", "bleu clair"),
        ("dark blue", "bleu foncé"),
        ("navy", "bleu marine"),
        ("navy blue", "bleu marine"),
        ("denim", "bleu denim"),
        ("red", "rouge"),
        ("burgundy", "bordeaux"),
        ("green", "vert"),
        ("dark green", "vert foncé"),
        ("khaki", "kaki"),
        ("grey", "gris"),
        ("gray", "gris"),
        ("charcoal", "gris anthracite"),
        ("beige", "beige"),
        ("cream", "crème"),
        ("ecru", "écru"),
        ("brown", "marron"),
        ("camel", "camel"),
        ("pink", "rose"),
        ("purple", "violet"),
        ("yellow", "jaune"),
        ("orange", "orange"),
    ]
    .into_iter()
    .collect()
});

const COLOR_SEPARATORS: &[&str] = &["/", ",", "&", "+", " et ", " and "];

/// Translate an English color wording to French.
///
/// Multi-color strings are split on the usual separators and each segment is
/// translated on its own, rejoined with French `"et"`. Falls back to the
/// lowercased original when nothing translates; `None` only for empty input.
pub fn translate_color_to_french(color: &str) -> Option<String> {
    let trimmed = color.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lookup = |segment: &str| -> Option<&'static str> {
        COLOR_TRANSLATIONS
            .get(normalize_for_comparison(segment.trim()).as_str())
            .copied()
    };

    if let Some(translated) = lookup(trimmed) {
        return Some(translated.to_string());
    }

    for separator in COLOR_SEPARATORS {
        if !trimmed.contains(separator) {
            continue;
        }
        let segments: Vec<&str> = trimmed
            .split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if segments.len() < 2 {
            continue;
        }
        let mut any_translated = false;
        let translated: Vec<String> = segments
            .iter()
            .map(|segment| match lookup(segment) {
                Some(french) => {
                    any_translated = true;
                    french.to_string()
                }
                None => segment.to_lowercase(),
            })
            .collect();
        if any_translated {
            return Some(translated.join(" et "));
        }
    }

    Some(trimmed.to_lowercase())
}

/// Preferred wordings for a leg fit: title form, description form, hashtag slug.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FitTerms {
    pub title: String,
    pub description: String,
    pub hashtag: String,
}

const FIT_ALIASES: &[(&[&str], (&str, &str, &str))] = &[
    (&["bootcut", "evase", "flare"], ("Bootcut/Évasé", "bootcut/évasé", "bootcut")),
    (&["straight", "droit"], ("Straight/Droit", "straight/droit", "straight")),
    (&["slim", "skinny"], ("Skinny", "skinny", "slim")),
];

/// Return the bilingual wording used in titles, the lowercase variant used in
/// descriptions and a lowercase slug for hashtags. Unrecognized fits pass
/// through unchanged in both display forms.
pub fn normalize_fit_terms(fit_leg: &str) -> FitTerms {
    let raw = fit_leg.trim();
    if raw.is_empty() {
        return FitTerms::default();
    }

    let normalized = normalize_for_comparison(raw);
    for (aliases, (title, description, hashtag)) in FIT_ALIASES {
        if aliases.iter().any(|alias| normalized.contains(alias)) {
            return FitTerms {
                title: (*title).to_string(),
                description: (*description).to_string(),
                hashtag: (*hashtag).to_string(),
            };
        }
    }

    let hashtag: String = normalized.chars().filter(|c| !c.is_whitespace()).collect();
    FitTerms {
        title: raw.to_string(),
        description: raw.to_string(),
        hashtag,
    }
}

/// Format a positive measurement as `"~74 cm"`.
pub fn format_measurement(value: Option<f64>) -> Option<String> {
    let value = value?;
    if value <= 0.0 {
        return None;
    }
    Some(format!("~{} cm", value.round() as i64))
}

/// Lowercase the first character, leaving the rest untouched.
pub(crate) fn lowercase_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
