//! Renderer for the Levi's women's jeans template.

use super::{
    composition_sentence, condition_line, fabric_label_missing, finalize_hashtags, hashtag_slug,
    join_paragraphs, join_title, label_status_notice, RenderedListing,
    COMPOSITION_MISSING_SENTENCE,
};
use crate::fields::ListingFields;
use crate::sizing::normalize_sizes;
use crate::text::{
    ensure_percent, normalize_for_comparison, normalize_size_hashtag, translate_color_to_french,
    FitTerms,
};

pub(super) fn render(fields: &ListingFields) -> RenderedListing {
    let has_elastane = fields.has_elastane();
    let fit = crate::text::normalize_fit_terms(&fields.fit_leg);
    let rise = fields.resolved_rise_class();
    let color = translate_color_to_french(&fields.color_main).unwrap_or_default();

    // Labeled sizes only count when the size label was actually readable;
    // a waist measurement is independent evidence.
    let label_fr = if fields.size_label_visible {
        fields.fr_size.trim()
    } else {
        ""
    };
    let label_us = if fields.size_label_visible {
        fields.us_w.trim()
    } else {
        ""
    };
    let waist = fields
        .waist_measurement_cm
        .or(fields.waist_flat_measurement_cm);
    let sizes = normalize_sizes(
        (!label_us.is_empty()).then_some(label_us),
        (!label_fr.is_empty()).then_some(label_fr),
        has_elastane,
        true,
        waist,
    );
    let us_l = if sizes.us_size.is_some() && fields.size_label_visible {
        fields.us_l.trim()
    } else {
        ""
    };

    let y2k = is_y2k(fields, &fit, &color);

    // Title
    let mut tokens: Vec<String> = vec!["Jean Levi’s".to_string(), fields.model.clone()];
    if let Some(fr) = &sizes.fr_size {
        tokens.push(format!("FR{}", fr));
    }
    if let Some(us) = &sizes.us_size {
        tokens.push(format!("W{}", us));
    }
    if !us_l.is_empty() {
        tokens.push(format!("L{}", us_l));
    }
    tokens.push(fit.title.clone());
    if fields.has_cotton() {
        tokens.push(format!("{} coton", ensure_percent(&fields.cotton_pct)));
    }
    tokens.push(fields.gender.clone());
    tokens.push(color.clone());
    let title = join_title(tokens, &fields.sku);

    // Paragraph 1: intro, size and fit.
    let mut intro = "Jean Levi’s".to_string();
    if !fields.model.is_empty() {
        intro.push_str(&format!(" modèle {}", fields.model));
    }
    if !fields.gender.trim().is_empty() {
        intro.push_str(&format!(" pour {}", fields.gender.trim()));
    }
    intro.push('.');

    let size_part = match (&sizes.us_size, &sizes.fr_size) {
        (Some(us), Some(fr)) => format!("Taille {} US (équivalent {} FR)", us, fr),
        (None, Some(fr)) => format!("Taille {} FR", fr),
        _ => "Taille non précisée".to_string(),
    };
    let mut fit_part = if fit.description.is_empty() {
        "coupe non précisée".to_string()
    } else {
        format!("coupe {}", fit.description)
    };
    if !rise.is_empty() {
        fit_part.push_str(&format!(" à taille {}", rise));
    }
    let size_sentence = format!(
        "{}, {}, pour une silhouette ajustée et confortable.",
        size_part, fit_part
    );

    let mut paragraph_one = vec![intro, size_sentence];
    if let Some(note) = &sizes.note {
        paragraph_one.push(format!("{}.", note));
    }

    // Paragraph 2: color, composition, closure.
    let mut paragraph_two = Vec::new();
    if !color.is_empty() {
        paragraph_two.push(format!(
            "Coloris {} légèrement délavé, très polyvalent et facile à assortir.",
            color
        ));
    }
    if !fabric_label_missing(fields) {
        match composition_sentence(fields) {
            Some(sentence) => {
                paragraph_two.push(sentence);
                if has_elastane {
                    paragraph_two.push(
                        "L'élasthanne apporte une touche de stretch et plus de confort."
                            .to_string(),
                    );
                }
            }
            None => paragraph_two.push(COMPOSITION_MISSING_SENTENCE.to_string()),
        }
    } else {
        paragraph_two.push(COMPOSITION_MISSING_SENTENCE.to_string());
    }
    paragraph_two.push("Fermeture zippée + bouton gravé Levi’s.".to_string());

    // Paragraph 3: condition, label status, reminders.
    let mut paragraph_three = vec![condition_line(fields)];
    if let Some(notice) = label_status_notice(fields) {
        paragraph_three.push(notice.to_string());
    }
    paragraph_three.push("📏 Mesures précises visibles en photo.".to_string());
    paragraph_three.push("📦 Envoi rapide et soigné".to_string());

    // Paragraph 4: cross-sell.
    let size_tag = sizes
        .fr_size
        .clone()
        .unwrap_or_else(|| normalize_size_hashtag(&fields.fr_size, "M").to_lowercase());
    let mut paragraph_four = Vec::new();
    if y2k {
        paragraph_four.push(
            "Esprit Y2K dans l'air du temps, parfait pour un look rétro assumé.".to_string(),
        );
    }
    paragraph_four.push(format!(
        "✨ Retrouvez tous mes articles Levi’s à votre taille ici 👉 #durin31fr{}",
        size_tag
    ));
    paragraph_four.push(
        "💡 Pensez à faire un lot pour profiter d’une réduction supplémentaire et économiser des frais d’envoi !"
            .to_string(),
    );

    // Paragraph 5: hashtags.
    let mut tags = vec!["#levis".to_string(), "#jeanlevis".to_string()];
    if !fields.gender.trim().is_empty() {
        tags.push(format!("#levis{}", hashtag_slug(&fields.gender)));
    }
    if !fit.hashtag.is_empty() {
        tags.push(format!("#{}jean", fit.hashtag));
    }
    tags.push("#jeandenim".to_string());
    if !rise.is_empty() {
        tags.push(format!("#taille{}", hashtag_slug(&rise)));
    }
    if !color.is_empty() {
        tags.push(format!("#jean{}", hashtag_slug(&color)));
    }
    if y2k {
        tags.push("#y2k".to_string());
    }
    tags.push("#vintedfr".to_string());
    tags.push(format!("#durin31fr{}", size_tag));
    let hashtags = finalize_hashtags(tags);

    let description = join_paragraphs(vec![
        paragraph_one,
        paragraph_two,
        paragraph_three,
        paragraph_four,
        vec![hashtags],
    ]);

    let price_estimate = estimate_price(
        &fields.model,
        sizes.fr_size.as_deref(),
        &fields.defects,
        &color,
    );

    RenderedListing {
        title,
        description,
        price_estimate: Some(price_estimate),
    }
}

// ---------------------------------------------------------------------------
// Y2K styling heuristic
// ---------------------------------------------------------------------------

const LIGHT_WASH_KEYWORDS: &[&str] = &["clair", "delave", "light", "stone", "bleach"];
const FLARED_KEYWORDS: &[&str] = &["bootcut", "evase", "flare", "wide", "baggy", "large"];
const LOGO_KEYWORDS: &[&str] = &["logo", "patch", "brode", "embroider"];
const BRIGHT_COLOR_KEYWORDS: &[&str] =
    &["rose", "violet", "rouge", "jaune", "orange", "turquoise", "fuchsia", "pink", "purple"];
const SPARKLE_KEYWORDS: &[&str] = &["paillette", "strass", "metallise", "brillant", "glitter"];

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

/// Marketing-only heuristic: low rise, stretch skinny, or at least three of
/// the era's visual markers. Never feeds back into the structured data.
fn is_y2k(fields: &ListingFields, fit: &FitTerms, color: &str) -> bool {
    if normalize_for_comparison(&fields.resolved_rise_class()).contains("basse") {
        return true;
    }
    if fields.has_elastane() && fit.hashtag == "slim" {
        return true;
    }

    let color_normalized = normalize_for_comparison(&format!("{} {}", fields.color_main, color));
    let details = normalize_for_comparison(&format!(
        "{} {} {}",
        fields.special_logo, fields.feature_notes, fields.defects
    ));
    let fit_normalized = normalize_for_comparison(&fields.fit_leg);

    let mut signals = 0;
    if contains_any(&color_normalized, LIGHT_WASH_KEYWORDS) {
        signals += 1;
    }
    if contains_any(&fit_normalized, FLARED_KEYWORDS) {
        signals += 1;
    }
    if !fields.special_logo.trim().is_empty() || contains_any(&details, LOGO_KEYWORDS) {
        signals += 1;
    }
    if contains_any(&color_normalized, BRIGHT_COLOR_KEYWORDS) {
        signals += 1;
    }
    if contains_any(&details, SPARKLE_KEYWORDS) {
        signals += 1;
    }
    signals >= 3
}

// ---------------------------------------------------------------------------
// Price estimation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StainSeverity {
    None,
    Small,
    Large,
}

const LARGE_STAIN_KEYWORDS: &[&str] = &[
    "grosse tache",
    "grosses taches",
    "grosse tâche",
    "grosses tâches",
    "tache blanche",
    "tâche blanche",
    "taches blanches",
    "tâches blanches",
];

const SMALL_STAIN_KEYWORDS: &[&str] = &[
    "petite tache",
    "petites taches",
    "petite tâche",
    "petites tâches",
    "tache visible",
    "tâche visible",
    "taches visibles",
    "tâches visibles",
    "micro tache",
    "micro tâche",
    "micro taches",
    "micro tâches",
    "tache",
    "taches",
    "taché",
    "tachée",
];

fn detect_stain_severity(defects: &str) -> StainSeverity {
    let normalized = defects.to_lowercase();
    if normalized.is_empty() {
        return StainSeverity::None;
    }
    if LARGE_STAIN_KEYWORDS.iter().any(|kw| normalized.contains(kw)) {
        return StainSeverity::Large;
    }
    if SMALL_STAIN_KEYWORDS.iter().any(|kw| normalized.contains(kw)) {
        return StainSeverity::Small;
    }
    StainSeverity::None
}

fn parse_fr_size_value(fr_size: Option<&str>) -> Option<i64> {
    crate::sizing::extract_int(fr_size)
}

/// Fixed decision table pricing a Levi's jean from model tier, displayed FR
/// size, stain severity and whiteness.
fn estimate_price(model: &str, fr_size_display: Option<&str>, defects: &str, color: &str) -> String {
    let fr_size_value = parse_fr_size_value(fr_size_display);
    let stain = detect_stain_severity(defects);
    let is_premium = model.to_lowercase().contains("premium");
    let is_white = color.to_lowercase().contains("blanc");

    let price: i64 = if is_premium {
        if stain == StainSeverity::Large || (is_white && stain != StainSeverity::None) {
            14
        } else if fr_size_value == Some(46) && stain != StainSeverity::None {
            21
        } else {
            let base = if stain == StainSeverity::None { 20 } else { 19 };
            if fr_size_value == Some(46) && stain == StainSeverity::None {
                base + 3
            } else {
                base
            }
        }
    } else if stain != StainSeverity::None {
        let mut price = if is_white { 12 } else { 17 };
        if let Some(fr) = fr_size_value {
            if fr >= 50 {
                price = 22;
            } else if fr == 48 {
                price = 20;
            } else if fr == 46 {
                price = 19;
            }
        }
        price
    } else if let Some(fr) = fr_size_value {
        if fr >= 50 {
            24
        } else if fr == 48 {
            22
        } else if fr == 46 {
            20
        } else {
            19
        }
    } else {
        19
    };

    let severity_label = match stain {
        StainSeverity::None => "aucun défaut notable",
        StainSeverity::Small => "défauts légers",
        StainSeverity::Large => "défauts marqués",
    };
    let size_label = match fr_size_display {
        Some(display) => format!("taille FR {}", display),
        None => "taille non précisée".to_string(),
    };
    let premium_label = if is_premium { "modèle premium" } else { "modèle standard" };

    let mut criteria = vec![premium_label.to_string(), size_label, severity_label.to_string()];
    if is_white {
        criteria.push("couleur blanche".to_string());
    }

    format!(
        "Estimation de prix indicative (critères : {}) : {}€",
        criteria.join(", "),
        price
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn denim_fields(overrides: serde_json::Value) -> ListingFields {
        let mut payload = json!({
            "model": "501",
            "fr_size": "38",
            "us_w": "28",
            "us_l": "30",
            "fit_leg": "bootcut",
            "rise_class": "haute",
            "cotton_pct": "99",
            "polyester_pct": "0",
            "viscose_pct": "0",
            "polyamide_pct": "",
            "acrylic_pct": "",
            "elastane_pct": "1",
            "gender": "Femme",
            "color_main": "Bleu",
            "defects": "aucun défaut",
            "sku": "JLF6",
            "size_label_visible": true,
            "fabric_label_visible": true,
        });
        if let Some(object) = overrides.as_object() {
            for (key, value) in object {
                payload[key] = value.clone();
            }
        }
        ListingFields::from_value(&payload, super::super::TEMPLATE_DENIM).unwrap()
    }

    #[test]
    fn test_render_injects_normalized_fit_terms() {
        let fields = denim_fields(json!({
            "fit_leg": "bootcut / evase",
            "defects": "très légères traces d'usure",
            "defect_tags": ["faded_crotch"],
            "size_label_visible": false,
            "fabric_label_visible": false,
        }));
        let rendered = render(&fields);

        assert!(rendered.title.contains("Bootcut/Évasé"));
        assert!(rendered.description.contains("bootcut/évasé"));
        assert!(!rendered.title.to_lowercase().contains("haute"));
        assert!(rendered.description.to_lowercase().contains("taille haute"));
        assert!(!rendered.description.contains("Mesure FR"));
        assert!(!rendered.title.contains(" W"));
        assert!(!rendered.title.contains(" L30"));
        assert!(rendered
            .description
            .contains("Composition non visible sur les photos (étiquette absente ou illisible)."));
        assert!(rendered
            .description
            .contains("Très bon état : entrejambe légèrement délavée (voir photos)"));
        assert!(rendered
            .description
            .contains("Étiquettes taille et composition non visibles sur les photos."));
    }

    #[test]
    fn test_render_translates_main_color() {
        let fields = denim_fields(json!({"color_main": "black"}));
        let rendered = render(&fields);
        assert!(rendered.title.contains("noir"));
        assert!(rendered.description.contains("Coloris noir"));
        assert!(rendered.description.contains("#jeannoir"));
    }

    #[test]
    fn test_render_composition_lists_fibers_by_share() {
        let fields = denim_fields(json!({
            "model": "724",
            "fr_size": "40",
            "us_w": "30",
            "us_l": "32",
            "fit_leg": "straight",
            "rise_class": "moyenne",
            "cotton_pct": "60",
            "polyester_pct": "10",
            "viscose_pct": "30",
            "elastane_pct": "0",
            "sku": "JLF15",
        }));
        let rendered = render(&fields);
        assert!(!rendered.title.contains("30% viscose"));
        assert!(rendered.title.contains("60% coton"));
        assert!(rendered
            .description
            .contains("Composition : 60% coton, 30% viscose et 10% polyester."));
    }

    #[test]
    fn test_render_combines_related_defects() {
        let fields = denim_fields(json!({
            "defects": "traces stylées",
            "defect_tags": ["stylish_holes", "ripped"],
        }));
        let rendered = render(&fields);
        assert!(rendered
            .description
            .contains("Très bon état : effets troués déchirés pour un style plus affirmé (voir photos)"));
        assert!(!rendered
            .description
            .contains("effets troués pour un style plus affirmé"));
    }

    #[test]
    fn test_render_mentions_missing_labels_individually() {
        let size_hidden = denim_fields(json!({
            "size_label_visible": false,
            "fabric_label_visible": true,
        }));
        let rendered = render(&size_hidden);
        assert!(rendered
            .description
            .contains("Étiquette taille non visible sur les photos."));
        assert!(!rendered
            .description
            .contains("Étiquette composition non visible sur les photos."));

        let fabric_hidden = denim_fields(json!({
            "size_label_visible": true,
            "fabric_label_visible": false,
        }));
        let rendered = render(&fabric_hidden);
        assert!(rendered
            .description
            .contains("Étiquette composition non visible sur les photos."));
        assert!(!rendered
            .description
            .contains("Étiquette taille non visible sur les photos."));
    }

    #[test]
    fn test_exactly_one_label_notice_for_any_falsy_combination() {
        let notices = [
            "Étiquette taille non visible sur les photos.",
            "Étiquette composition non visible sur les photos.",
            "Étiquettes taille et composition non visibles sur les photos.",
        ];
        for size_visible in [true, false] {
            for fabric_visible in [true, false] {
                for fabric_cut in [true, false] {
                    let fields = denim_fields(json!({
                        "size_label_visible": size_visible,
                        "fabric_label_visible": fabric_visible,
                        "fabric_label_cut": fabric_cut,
                    }));
                    let rendered = render(&fields);
                    let count: usize = notices
                        .iter()
                        .map(|notice| rendered.description.matches(notice).count())
                        .sum();
                    let any_missing = !size_visible || !fabric_visible || fabric_cut;
                    let expected = usize::from(any_missing);
                    assert_eq!(
                        count, expected,
                        "size_visible={size_visible} fabric_visible={fabric_visible} fabric_cut={fabric_cut}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_render_uses_waist_measurement_when_label_hidden() {
        let fields = denim_fields(json!({
            "fr_size": "",
            "us_w": "",
            "us_l": "",
            "fit_leg": "straight",
            "rise_class": "moyenne",
            "waist_measurement_cm": "74",
            "sku": "",
            "size_label_visible": false,
            "fabric_label_visible": false,
        }));
        let rendered = render(&fields);
        assert!(rendered.title.contains("FR40"));
        assert!(rendered.description.contains("Taille 40 FR"));
        assert!(rendered.description.contains("74 cm"));
        assert!(rendered
            .description
            .contains("Taille estimée à partir d'un tour de taille mesuré"));
        assert!(rendered.title.ends_with("- SKU/nc"));
    }

    #[test]
    fn test_render_avoids_defaulting_missing_fields() {
        let fields = denim_fields(json!({
            "model": "",
            "fr_size": "",
            "us_w": "",
            "us_l": "",
            "fit_leg": "",
            "rise_class": "",
            "cotton_pct": "",
            "polyester_pct": "",
            "viscose_pct": "",
            "elastane_pct": "",
            "gender": "",
            "color_main": "",
            "defects": "",
            "sku": "",
            "size_label_visible": false,
            "fabric_label_visible": false,
        }));
        let rendered = render(&fields);
        assert!(!rendered.title.to_lowercase().contains("femme"));
        assert!(!rendered.description.to_lowercase().contains("femme"));
        assert!(!rendered.description.to_lowercase().contains("bleu"));
        assert!(rendered.description.to_lowercase().contains("taille non précisée"));
        assert!(rendered.description.to_lowercase().contains("coupe non précisée"));
        assert!(!rendered.title.contains("  "));
    }

    #[test]
    fn test_render_omits_model_when_missing() {
        let fields = denim_fields(json!({"model": ""}));
        let rendered = render(&fields);
        assert!(!rendered.title.contains("  "));
        let first_sentence = rendered
            .description
            .split("\n\n")
            .next()
            .unwrap()
            .split('\n')
            .next()
            .unwrap();
        assert_eq!(first_sentence, "Jean Levi’s pour Femme.");
    }

    #[test]
    fn test_condition_paragraph_is_third() {
        let fields = denim_fields(json!({"defects": "Très bon état"}));
        let rendered = render(&fields);
        let third = rendered
            .description
            .split("\n\n")
            .nth(2)
            .unwrap()
            .split('\n')
            .next()
            .unwrap();
        assert_eq!(third, "Très bon état");
    }

    #[test]
    fn test_price_table_standard_sizes() {
        let price = estimate_price("501", Some("38"), "", "bleu");
        assert!(price.contains("19€"));
        assert!(price.contains("modèle standard"));
        assert!(price.contains("taille FR 38"));

        assert!(estimate_price("501", Some("46"), "", "bleu").contains("20€"));
        assert!(estimate_price("501", Some("48"), "", "bleu").contains("22€"));
        assert!(estimate_price("501", Some("52"), "", "bleu").contains("24€"));
        assert!(estimate_price("501", None, "", "bleu").contains("19€"));
    }

    #[test]
    fn test_price_table_standard_with_stains() {
        assert!(estimate_price("501", Some("38"), "petite tache", "bleu").contains("17€"));
        assert!(estimate_price("501", Some("38"), "petite tache", "blanc").contains("12€"));
        assert!(estimate_price("501", Some("46"), "petite tache", "bleu").contains("19€"));
        assert!(estimate_price("501", Some("50"), "grosse tache", "bleu").contains("22€"));
    }

    #[test]
    fn test_price_table_premium_branches() {
        assert!(estimate_price("501 Premium", Some("38"), "", "bleu").contains("20€"));
        assert!(estimate_price("501 Premium", Some("46"), "", "bleu").contains("23€"));
        assert!(estimate_price("501 Premium", Some("46"), "petite tache", "bleu").contains("21€"));
        assert!(estimate_price("501 Premium", Some("38"), "grosse tache", "bleu").contains("14€"));
        assert!(estimate_price("501 Premium", Some("38"), "petite tache", "blanc").contains("14€"));
    }

    #[test]
    fn test_y2k_detection() {
        // Low rise alone is enough.
        let fields = denim_fields(json!({"rise_class": "basse"}));
        assert!(is_y2k(&fields, &crate::text::normalize_fit_terms("straight"), "bleu"));

        // Stretch skinny counts.
        let fields = denim_fields(json!({"fit_leg": "skinny", "elastane_pct": "2"}));
        assert!(is_y2k(&fields, &crate::text::normalize_fit_terms("skinny"), "bleu"));

        // Three visual markers together.
        let fields = denim_fields(json!({
            "fit_leg": "flare",
            "color_main": "rose clair",
            "special_logo": "patch papillon",
        }));
        assert!(is_y2k(&fields, &crate::text::normalize_fit_terms("flare"), "rose clair"));

        // A plain straight blue jean is not Y2K.
        let fields = denim_fields(json!({"fit_leg": "straight"}));
        assert!(!is_y2k(&fields, &crate::text::normalize_fit_terms("straight"), "bleu"));
    }
}
