//! Listing templates: registry, shared rendering rules, category renderers.
//!
//! Each template pairs the prompt sent to the vision model with a pure render
//! function turning validated fields into the final French listing copy.

mod denim;
mod fleece;
mod knitwear;
mod prompts;

use crate::defects::get_defect_descriptions;
use crate::error::TemplateError;
use crate::fields::ListingFields;
use crate::text::{lowercase_first, normalize_for_comparison};

pub const TEMPLATE_DENIM: &str = "template-jean-levis-femme";
pub const TEMPLATE_KNITWEAR: &str = "template-pull-tommy-femme";
pub const TEMPLATE_FLEECE: &str = "template-polaire-outdoor";
pub const DEFAULT_TEMPLATE: &str = TEMPLATE_DENIM;

/// Rendered output of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedListing {
    pub title: String,
    pub description: String,
    pub price_estimate: Option<String>,
}

/// A registered listing template.
#[derive(Debug)]
pub struct ListingTemplate {
    pub name: &'static str,
    pub description: &'static str,
    prompt: fn() -> String,
    render: fn(&ListingFields) -> RenderedListing,
}

impl ListingTemplate {
    /// The extraction prompt sent to the vision model.
    pub fn prompt(&self) -> String {
        (self.prompt)()
    }

    /// Render title, description and optional price estimate.
    pub fn render(&self, fields: &ListingFields) -> RenderedListing {
        (self.render)(fields)
    }
}

static TEMPLATES: &[ListingTemplate] = &[
    ListingTemplate {
        name: TEMPLATE_DENIM,
        description: "Jean Levi's femme",
        prompt: prompts::denim_prompt,
        render: denim::render,
    },
    ListingTemplate {
        name: TEMPLATE_KNITWEAR,
        description: "Pull Tommy Hilfiger femme",
        prompt: prompts::knitwear_prompt,
        render: knitwear::render,
    },
    ListingTemplate {
        name: TEMPLATE_FLEECE,
        description: "Polaire outdoor The North Face / Columbia",
        prompt: prompts::fleece_prompt,
        render: fleece::render,
    },
];

/// Names of the registered templates.
pub fn available_templates() -> Vec<&'static str> {
    TEMPLATES.iter().map(|t| t.name).collect()
}

/// Look a template up by name.
pub fn get_template(name: &str) -> Result<&'static ListingTemplate, TemplateError> {
    TEMPLATES
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))
}

/// Prompt text of a template.
pub fn get_prompt(name: &str) -> Result<String, TemplateError> {
    get_template(name).map(|t| t.prompt())
}

/// Render fields through the named template.
pub fn render_template(name: &str, fields: &ListingFields) -> Result<RenderedListing, TemplateError> {
    get_template(name).map(|t| t.render(fields))
}

/// Follow-up prompt asking only for the knitwear SKU written on the tag.
pub(crate) fn knitwear_sku_recovery_prompt() -> String {
    prompts::knitwear_sku_recovery_prompt()
}

// ---------------------------------------------------------------------------
// Shared rendering rules
// ---------------------------------------------------------------------------

pub(crate) const COMPOSITION_MISSING_SENTENCE: &str =
    "Composition non visible sur les photos (étiquette absente ou illisible).";

const NOTICE_SIZE_MISSING: &str = "Étiquette taille non visible sur les photos.";
const NOTICE_FABRIC_MISSING: &str = "Étiquette composition non visible sur les photos.";
const NOTICE_BOTH_MISSING: &str = "Étiquettes taille et composition non visibles sur les photos.";

/// The single label-status sentence for the description.
///
/// Whatever combination of label problems holds, exactly one sentence comes
/// out; none when every label is readable.
pub(crate) fn label_status_notice(fields: &ListingFields) -> Option<&'static str> {
    let size_missing = !fields.size_label_visible;
    let fabric_missing = fabric_label_missing(fields);
    match (size_missing, fabric_missing) {
        (true, true) => Some(NOTICE_BOTH_MISSING),
        (true, false) => Some(NOTICE_SIZE_MISSING),
        (false, true) => Some(NOTICE_FABRIC_MISSING),
        (false, false) => None,
    }
}

/// A cut label destroys the composition evidence just like an absent one.
pub(crate) fn fabric_label_missing(fields: &ListingFields) -> bool {
    !fields.fabric_label_visible || fields.fabric_label_cut
}

/// Displayed fiber order when percentages tie.
const FIBER_LABELS: &[(&str, fn(&ListingFields) -> &str)] = &[
    ("coton", |f| &f.cotton_pct),
    ("laine", |f| &f.wool_pct),
    ("cachemire", |f| &f.cashmere_pct),
    ("acrylique", |f| &f.acrylic_pct),
    ("nylon", |f| &f.nylon_pct),
    ("viscose", |f| &f.viscose_pct),
    ("polyamide", |f| &f.polyamide_pct),
    ("polyester", |f| &f.polyester_pct),
    ("élasthanne", |f| &f.elastane_pct),
];

/// `"Composition : 60% coton, 30% viscose et 10% polyester."`
///
/// Fibers are sorted by percentage, descending, stable on the fixed order
/// above. `None` when no positive percentage was read.
pub(crate) fn composition_sentence(fields: &ListingFields) -> Option<String> {
    let mut fibers: Vec<(f64, String)> = Vec::new();
    for (label, accessor) in FIBER_LABELS {
        let raw = accessor(fields);
        if let Some(value) = crate::fields::parse_pct(raw) {
            if value > 0.0 {
                let display = raw.trim().trim_end_matches('%').trim();
                fibers.push((value, format!("{}% {}", display, label)));
            }
        }
    }
    if fibers.is_empty() {
        return None;
    }
    fibers.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    let parts: Vec<String> = fibers.into_iter().map(|(_, part)| part).collect();
    Some(format!("Composition : {}.", join_with_et(&parts)))
}

/// Join French enumerations: `"a"`, `"a et b"`, `"a, b et c"`.
pub(crate) fn join_with_et(parts: &[String]) -> String {
    match parts.len() {
        0 => String::new(),
        1 => parts[0].clone(),
        n => format!("{} et {}", parts[..n - 1].join(", "), parts[n - 1]),
    }
}

/// Wordings that describe the absence of defects rather than a defect.
const NO_DEFECT_ALIASES: &[&str] = &[
    "aucun defaut",
    "aucun defaut notable",
    "aucun defaut apparent",
    "aucune anomalie",
    "tres bon etat",
    "tres bon etat general",
    "rien a signaler",
    "ras",
];

fn is_no_defect_alias(text: &str) -> bool {
    let normalized = normalize_for_comparison(text.trim());
    NO_DEFECT_ALIASES.contains(&normalized.as_str())
}

fn strip_voir_photos(description: &str) -> &str {
    description
        .strip_suffix(", voir photos")
        .unwrap_or(description)
}

/// The condition line of the description.
///
/// Catalog phrases win over the free-text defect wording; "no defect" aliases
/// are suppressed so they never read like defects.
pub(crate) fn condition_line(fields: &ListingFields) -> String {
    let mut parts: Vec<String> = get_defect_descriptions(&fields.defect_tags)
        .iter()
        .map(|description| lowercase_first(strip_voir_photos(description)))
        .collect();

    if parts.is_empty() {
        let free = fields.defects.trim();
        if !free.is_empty() && !is_no_defect_alias(free) {
            parts.push(lowercase_first(free));
        }
    }

    if parts.is_empty() {
        "Très bon état".to_string()
    } else {
        format!("Très bon état : {} (voir photos)", parts.join(", "))
    }
}

/// `"SKU/nc"` when the garment tag could not be read.
pub(crate) fn sku_display(sku: &str) -> String {
    let trimmed = sku.trim();
    if trimmed.is_empty() {
        "SKU/nc".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Title line: non-empty tokens joined by spaces, ending `"- {sku}"`.
pub(crate) fn join_title(tokens: Vec<String>, sku: &str) -> String {
    let mut tokens: Vec<String> = tokens
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.push(format!("- {}", sku_display(sku)));
    tokens.join(" ")
}

/// Deduplicate, cap at 10 and join the hashtag line.
pub(crate) fn finalize_hashtags(tags: Vec<String>) -> String {
    let mut seen: Vec<String> = Vec::new();
    for tag in tags {
        if tag.len() > 1 && !seen.contains(&tag) {
            seen.push(tag);
        }
        if seen.len() == 10 {
            break;
        }
    }
    seen.join(" ")
}

/// Hashtag-safe token: accent-folded, lowercase, alphanumeric only.
pub(crate) fn hashtag_slug(value: &str) -> String {
    normalize_for_comparison(value)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Paragraphs joined by blank lines, skipping empty ones.
pub(crate) fn join_paragraphs(paragraphs: Vec<Vec<String>>) -> String {
    paragraphs
        .into_iter()
        .map(|lines| {
            lines
                .into_iter()
                .filter(|l| !l.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
