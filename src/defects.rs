//! Reference catalog for standardized defect mentions.
//!
//! The vision model is asked to report defects as known slugs; the catalog maps
//! each slug to the canonical French phrase used in descriptions. Some slug
//! combinations collapse into a single combined phrase.

use crate::text::contains_normalized;

/// A standardized defect mention.
#[derive(Debug, Clone, Copy)]
pub struct DefectSpec {
    pub slug: &'static str,
    pub synonyms: &'static [&'static str],
    pub description: &'static str,
}

/// A combined phrase emitted when all required slugs co-occur.
#[derive(Debug, Clone, Copy)]
pub struct DefectCombinationSpec {
    pub slug: &'static str,
    pub required: &'static [&'static str],
    pub description: &'static str,
}

pub const DEFECT_CATALOG: &[DefectSpec] = &[
    DefectSpec {
        slug: "faded_crotch",
        synonyms: &["entrejambe délavé", "crotch fade", "décoloration entrejambe"],
        description: "Entrejambe légèrement délavée, voir photos",
    },
    DefectSpec {
        slug: "stylish_holes",
        synonyms: &["trou stylé", "effet troué", "distressed hole"],
        description: "Effets troués pour un style plus affirmé, voir photos",
    },
    DefectSpec {
        slug: "ripped",
        synonyms: &["déchirure", "effet déchiré", "ripped"],
        description: "Effets déchirés pour un style plus affirmé, voir photos",
    },
    DefectSpec {
        slug: "small_stain",
        synonyms: &["petite tache", "micro tache", "small stain"],
        description: "Petite tache discrète, voir photos",
    },
    DefectSpec {
        slug: "large_stain",
        synonyms: &["grosse tache", "tache marquée", "large stain"],
        description: "Tache visible, voir photos",
    },
    DefectSpec {
        slug: "belt_loop_wear",
        synonyms: &["passant usé", "passant abîmé", "belt loop wear"],
        description: "Légère usure sur un passant de ceinture, voir photos",
    },
    DefectSpec {
        slug: "hem_wear",
        synonyms: &["ourlet usé", "bas effiloché", "hem wear"],
        description: "Usure légère aux ourlets, voir photos",
    },
    DefectSpec {
        slug: "pilling",
        synonyms: &["bouloche", "boulochage", "pilling"],
        description: "Légères bouloches, voir photos",
    },
    DefectSpec {
        slug: "missing_button",
        synonyms: &["bouton manquant", "missing button"],
        description: "Un bouton manquant, voir photos",
    },
];

pub const DEFECT_COMBINATIONS: &[DefectCombinationSpec] = &[DefectCombinationSpec {
    slug: "stylish_holes_ripped",
    required: &["stylish_holes", "ripped"],
    description: "Effets troués déchirés pour un style plus affirmé, voir photos",
}];

fn find_spec(slug: &str) -> Option<&'static DefectSpec> {
    DEFECT_CATALOG.iter().find(|spec| spec.slug == slug)
}

/// Expose the list of known defect slugs.
pub fn known_defect_slugs() -> Vec<&'static str> {
    DEFECT_CATALOG.iter().map(|spec| spec.slug).collect()
}

/// True when the slug is registered in the catalog.
pub fn is_known_slug(slug: &str) -> bool {
    find_spec(slug).is_some()
}

/// Return the standardized descriptions for the provided slugs.
///
/// Slugs are deduplicated preserving first occurrence. When every required
/// slug of a combination is present, the combined phrase replaces the
/// individual ones, ordered by the smallest original index among its slugs;
/// remaining individual slugs follow in their original order. Unknown slugs
/// are silently skipped so rendering stays resilient to outdated instructions
/// while validation happens upstream.
pub fn get_defect_descriptions<S: AsRef<str>>(slugs: &[S]) -> Vec<String> {
    let mut deduped: Vec<&str> = Vec::new();
    for slug in slugs {
        let slug = slug.as_ref();
        if !deduped.contains(&slug) {
            deduped.push(slug);
        }
    }

    let mut consumed: Vec<&str> = Vec::new();
    let mut combined: Vec<(usize, &'static str)> = Vec::new();
    for combination in DEFECT_COMBINATIONS {
        let all_present = combination
            .required
            .iter()
            .all(|required| deduped.contains(required));
        if !all_present {
            continue;
        }
        let first_index = combination
            .required
            .iter()
            .filter_map(|required| deduped.iter().position(|slug| slug == required))
            .min()
            .unwrap_or(usize::MAX);
        combined.push((first_index, combination.description));
        consumed.extend(combination.required.iter().copied());
    }
    combined.sort_by_key(|(index, _)| *index);

    let mut descriptions: Vec<String> = combined
        .into_iter()
        .map(|(_, description)| description.to_string())
        .collect();
    for slug in &deduped {
        if consumed.contains(slug) {
            continue;
        }
        if let Some(spec) = find_spec(slug) {
            descriptions.push(spec.description.to_string());
        }
    }
    descriptions
}

/// Infer catalog slugs from a free-form defect wording via synonym containment.
pub fn infer_defect_tags(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    DEFECT_CATALOG
        .iter()
        .filter(|spec| {
            spec.synonyms
                .iter()
                .any(|synonym| contains_normalized(text, synonym))
        })
        .map(|spec| spec.slug.to_string())
        .collect()
}
