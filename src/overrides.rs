//! User-comment overrides applied on top of the extracted fields.
//!
//! The seller's free-form comment has the last word over anything the vision
//! model inferred: explicit sizes, color, brand, model and defect mentions all
//! replace the extracted values, and whatever cannot be classified lands in
//! the feature notes untouched.

use std::sync::LazyLock;

use regex::Regex;

use crate::fields::ListingFields;
use crate::text::{normalize_for_comparison, normalize_model_code, normalize_us_waist_label};

/// Caller-supplied overrides accompanying a generation request.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserOverrides<'a> {
    pub comment: &'a str,
    /// Manually entered SKU, always authoritative.
    pub manual_sku: Option<&'a str>,
    /// Explicit FR size, same authority as an FR mention in the comment.
    pub fr_size: Option<&'a str>,
    /// Explicit US W size.
    pub us_size: Option<&'a str>,
}

static FR_SIZE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bFR\s*-?\s*(\d{2,3})\b",
        r"(?i)\b(\d{2,3})\s*FR\b",
        r"(?i)\btaille\s*(?:FR\s*)?(\d{2,3})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static US_SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bUS\s*W?\s*(\d{1,2})\b(?:\s*L\s*(\d{1,2})\b)?").unwrap());
static WL_SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bW\s*(\d{1,2})\s*L\s*(\d{1,2})\b").unwrap());

/// Keywords marking a comment segment as a defect mention.
const DEFECT_KEYWORDS: &[&str] = &[
    "tache", "tachee", "defaut", "aureole", "trou", "dechir", "usure", "accroc",
];

const COLOR_PREFIXES: &[&str] = &["couleur", "coloris"];
const BRAND_PREFIX: &str = "marque";
const MODEL_PREFIX: &str = "modele";
const DEFECT_PREFIX: &str = "defaut";

fn find_fr_size(comment: &str) -> Option<String> {
    for pattern in FR_SIZE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(comment) {
            return Some(caps[1].to_string());
        }
    }
    None
}

fn find_us_size(comment: &str) -> Option<(String, Option<String>)> {
    if let Some(caps) = US_SIZE_PATTERN.captures(comment) {
        let w = caps[1].to_string();
        let l = caps.get(2).map(|m| m.as_str().to_string());
        return Some((w, l));
    }
    if let Some(caps) = WL_SIZE_PATTERN.captures(comment) {
        return Some((caps[1].to_string(), Some(caps[2].to_string())));
    }
    None
}

/// Strip a classification prefix (plus any `:`/`-` separator) from a segment.
fn value_after_prefix(segment: &str, prefix_chars: usize) -> String {
    segment
        .chars()
        .skip(prefix_chars)
        .collect::<String>()
        .trim_start_matches([':', '-', ' '])
        .trim()
        .to_string()
}

fn mentions_size(segment: &str) -> bool {
    find_fr_size(segment).is_some() || find_us_size(segment).is_some()
}

/// Apply the comment and the explicit overrides onto the extracted fields.
///
/// Returns a rewritten copy; the input is never mutated. Runs the inferred-size
/// cleanup last, so a hallucinated size never survives without either a
/// visible label or an explicit override.
pub fn resolve_overrides(fields: &ListingFields, overrides: &UserOverrides<'_>) -> ListingFields {
    let mut updated = fields.clone();
    let comment = overrides.comment.trim();

    let fr_override = overrides
        .fr_size
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| find_fr_size(comment));
    let us_override = overrides
        .us_size
        .map(|v| normalize_us_waist_label(v))
        .filter(|v| !v.is_empty())
        .map(|w| (w, None))
        .or_else(|| find_us_size(comment));

    let size_overridden = fr_override.is_some();
    let us_mentioned = us_override.is_some();

    if let Some(fr) = fr_override {
        tracing::debug!(fr = %fr, "taille FR forcée par le commentaire");
        updated.fr_size = fr;
        updated.size_label_visible = true;
    }
    if let Some((w, l)) = us_override {
        updated.us_w = w;
        if let Some(l) = l {
            updated.us_l = l;
        }
    }
    if let Some(sku) = overrides.manual_sku.map(str::trim).filter(|s| !s.is_empty()) {
        updated.sku = sku.to_string();
    }

    let mut defect_segments: Vec<String> = Vec::new();
    let mut leftover_notes: Vec<String> = Vec::new();
    for segment in comment.split([',', ';', '\n']) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let normalized = normalize_for_comparison(segment);

        if let Some(prefix) = COLOR_PREFIXES.iter().find(|p| normalized.starts_with(**p)) {
            let value = value_after_prefix(segment, prefix.chars().count());
            if !value.is_empty() {
                updated.color_main = value;
            }
        } else if normalized.starts_with(BRAND_PREFIX) {
            let value = value_after_prefix(segment, BRAND_PREFIX.chars().count());
            if !value.is_empty() {
                updated.brand = value;
            }
        } else if normalized.starts_with(MODEL_PREFIX) {
            let value = value_after_prefix(segment, MODEL_PREFIX.chars().count());
            if !value.is_empty() {
                updated.model = normalize_model_code(&value).unwrap_or(value);
            }
        } else if normalized.starts_with(DEFECT_PREFIX) {
            let value = value_after_prefix(segment, DEFECT_PREFIX.chars().count());
            if !value.is_empty() {
                defect_segments.push(value);
            }
        } else if DEFECT_KEYWORDS.iter().any(|kw| normalized.contains(kw)) {
            defect_segments.push(segment.to_string());
        } else if mentions_size(segment) {
            // Size mentions were consumed above.
        } else {
            leftover_notes.push(segment.to_string());
        }
    }

    if !defect_segments.is_empty() {
        let joined = defect_segments.join(", ");
        for tag in crate::defects::infer_defect_tags(&joined) {
            if !updated.defect_tags.contains(&tag) {
                updated.defect_tags.push(tag);
            }
        }
        updated.defects = joined;
    }

    if !leftover_notes.is_empty() {
        let mut parts: Vec<String> = updated
            .feature_notes
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        for note in leftover_notes {
            let duplicate = parts
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(&note));
            if !duplicate {
                parts.push(note);
            }
        }
        updated.feature_notes = parts.join(", ");
    }

    // A manual FR correction invalidates whatever contradicted it.
    if size_overridden {
        if !us_mentioned {
            updated.us_w = String::new();
            updated.us_l = String::new();
        }
        updated.waist_measurement_cm = None;
        updated.waist_flat_measurement_cm = None;
    }

    strip_inferred_sizes(&mut updated, size_overridden);
    updated
}

/// Drop size values that have no evidentiary backing.
///
/// Without an override and without a visible size label, any size present can
/// only be a model hallucination and is blanked.
fn strip_inferred_sizes(fields: &mut ListingFields, size_overridden: bool) {
    if size_overridden || fields.size_label_visible {
        return;
    }
    if fields.fr_size.is_empty() && fields.us_w.is_empty() && fields.us_l.is_empty() {
        return;
    }
    tracing::debug!("tailles sans étiquette visible ignorées");
    fields.fr_size = String::new();
    fields.us_w = String::new();
    fields.us_l = String::new();
}
