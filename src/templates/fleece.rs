//! Renderer for the outdoor fleece template (The North Face / Columbia).

use super::{
    composition_sentence, condition_line, fabric_label_missing, finalize_hashtags, hashtag_slug,
    join_paragraphs, join_title, label_status_notice, RenderedListing,
    COMPOSITION_MISSING_SENTENCE,
};
use crate::fields::ListingFields;
use crate::sizing::estimate_fr_top_size;
use crate::text::{
    extract_primary_size_label, normalize_apparel_size, normalize_for_comparison,
    normalize_size_hashtag, translate_color_to_french,
};

/// Natural fibers that contradict the synthetic-fleece presumption when they
/// show up in the defect wording.
const POLYESTER_CONTRADICTION_KEYWORDS: &[&str] = &[
    "coton", "cotton", "laine", "wool", "cachemire", "cashmere", "soie", "silk", "lin", "linen",
    "chanvre", "hemp", "viscose", "rayonne", "modal", "polyamide", "nylon", "acrylique", "acrylic",
    "elasthanne", "elastane", "spandex", "lycra",
];

fn defects_contradict_polyester(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let normalized = normalize_for_comparison(text);
    POLYESTER_CONTRADICTION_KEYWORDS
        .iter()
        .any(|kw| normalized.contains(kw))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FleeceBrand {
    TheNorthFace,
    Columbia,
    Other,
}

impl FleeceBrand {
    fn display(self, raw_brand: &str) -> String {
        match self {
            FleeceBrand::TheNorthFace => "The North Face".to_string(),
            FleeceBrand::Columbia => "Columbia".to_string(),
            FleeceBrand::Other => {
                let raw = raw_brand.trim();
                if raw.is_empty() {
                    String::new()
                } else {
                    raw.to_string()
                }
            }
        }
    }
}

/// Resolve the brand: SKU prefix first, then keyword match over the textual
/// fields, then the raw brand wording.
fn resolve_brand(fields: &ListingFields) -> FleeceBrand {
    let sku = fields.sku.trim().to_uppercase();
    if sku.starts_with("PTNF") {
        return FleeceBrand::TheNorthFace;
    }
    if sku.starts_with("PC") {
        return FleeceBrand::Columbia;
    }

    let haystack = normalize_for_comparison(&format!(
        "{} {} {} {}",
        fields.brand, fields.model, fields.special_logo, fields.feature_notes
    ));
    if haystack.contains("north face") || haystack.contains("tnf") {
        return FleeceBrand::TheNorthFace;
    }
    if haystack.contains("columbia") {
        return FleeceBrand::Columbia;
    }
    FleeceBrand::Other
}

pub(super) fn render(fields: &ListingFields) -> RenderedListing {
    let brand = resolve_brand(fields);
    let brand_display = brand.display(&fields.brand);
    let color = translate_color_to_french(&fields.color_main).unwrap_or_default();

    let label_size = if fields.size_label_visible {
        extract_primary_size_label(&fields.fr_size)
            .map(|label| normalize_apparel_size(&label))
            .unwrap_or_default()
    } else {
        String::new()
    };
    let estimate = if label_size.is_empty() {
        estimate_fr_top_size(fields.bust_flat_measurement_cm, fields.length_measurement_cm)
    } else {
        Default::default()
    };

    // A fleece with no readable fabric label is presumed fully synthetic,
    // unless the defect wording names a natural fiber.
    let assume_polyester =
        fabric_label_missing(fields) && !defects_contradict_polyester(&fields.defects);

    // Title
    let mut tokens: Vec<String> = vec!["Polaire".to_string(), brand_display.clone()];
    if !fields.zip_style.trim().is_empty() {
        tokens.push(fields.zip_style.trim().to_string());
    }
    if !label_size.is_empty() {
        tokens.push(format!("Taille {}", label_size));
    } else if let Some(estimated) = &estimate.estimated_size {
        tokens.push(estimated.clone());
    }
    tokens.push(color.clone());
    tokens.push(fields.gender.clone());
    let title = join_title(tokens, &fields.sku);

    // Paragraph 1: intro and size.
    let mut intro = "Polaire".to_string();
    if !brand_display.is_empty() {
        intro.push_str(&format!(" {}", brand_display));
    }
    if !fields.gender.trim().is_empty() {
        intro.push_str(&format!(" pour {}", fields.gender.trim()));
    }
    intro.push('.');

    let mut paragraph_one = vec![intro];
    if !label_size.is_empty() {
        paragraph_one.push(format!("Taille {} indiquée sur l'étiquette.", label_size));
    } else if let Some(estimated) = &estimate.estimated_size {
        paragraph_one.push(format!("Taille estimée {}.", estimated));
    } else {
        paragraph_one.push("Taille non précisée.".to_string());
    }
    if let Some(note) = &estimate.note {
        paragraph_one.push(format!("{}.", note));
    }
    if let Some(length) = &estimate.length_descriptor {
        paragraph_one.push(length.clone());
    }

    // Paragraph 2: warmth, closure, color, composition, technical details.
    let mut paragraph_two = vec![
        "Matière polaire chaude et légère, idéale en seconde couche comme en mi-saison."
            .to_string(),
    ];
    if !fields.zip_style.trim().is_empty() {
        paragraph_two.push(format!("Fermeture {}.", fields.zip_style.trim()));
    }
    if !color.is_empty() {
        paragraph_two.push(format!(
            "Coloris {}, facile à assortir en randonnée comme en ville.",
            color
        ));
    }
    if assume_polyester {
        paragraph_two.push("Composition : 100% polyester (polaire).".to_string());
    } else if !fabric_label_missing(fields) {
        match composition_sentence(fields) {
            Some(sentence) => paragraph_two.push(sentence),
            None => paragraph_two.push(COMPOSITION_MISSING_SENTENCE.to_string()),
        }
    } else {
        paragraph_two.push(COMPOSITION_MISSING_SENTENCE.to_string());
    }
    if !fields.technical_features.trim().is_empty() {
        paragraph_two.push(format!(
            "Détails techniques : {}.",
            fields.technical_features.trim()
        ));
    }
    if !fields.feature_notes.trim().is_empty() {
        paragraph_two.push(format!("À noter : {}.", fields.feature_notes.trim()));
    }

    // Paragraph 3: condition, label status, reminders. The polyester
    // presumption replaces the composition part of the notice.
    let mut paragraph_three = vec![condition_line(fields)];
    if assume_polyester {
        if !fields.size_label_visible {
            paragraph_three.push("Étiquette taille non visible sur les photos.".to_string());
        }
    } else if let Some(notice) = label_status_notice(fields) {
        paragraph_three.push(notice.to_string());
    }
    paragraph_three.push("📏 Mesures à plat visibles en photo.".to_string());
    paragraph_three.push("📦 Envoi rapide et soigné".to_string());

    // Paragraph 4: cross-sell.
    let size_source = if !label_size.is_empty() {
        label_size.clone()
    } else {
        estimate.estimated_size.clone().unwrap_or_default()
    };
    let size_tag = normalize_size_hashtag(&size_source, "M").to_lowercase();
    let paragraph_four = vec![
        format!(
            "✨ Retrouvez toutes mes polaires outdoor ici 👉 #durin31polaire{}",
            size_tag
        ),
        "💡 Pensez à faire un lot pour profiter d’une réduction supplémentaire et économiser des frais d’envoi !"
            .to_string(),
    ];

    // Paragraph 5: hashtags.
    let mut tags: Vec<String> = Vec::new();
    match brand {
        FleeceBrand::TheNorthFace => {
            tags.push("#thenorthface".to_string());
            tags.push("#tnf".to_string());
        }
        FleeceBrand::Columbia => tags.push("#columbia".to_string()),
        FleeceBrand::Other => {
            if !brand_display.is_empty() {
                tags.push(format!("#{}", hashtag_slug(&brand_display)));
            }
        }
    }
    tags.push("#polaire".to_string());
    tags.push("#outdoor".to_string());
    tags.push("#vintage90s".to_string());
    if !color.is_empty() {
        tags.push(format!("#polaire{}", hashtag_slug(&color)));
    }
    if !fields.gender.trim().is_empty() {
        tags.push(format!("#polaire{}", hashtag_slug(&fields.gender)));
    }
    tags.push("#vintedfr".to_string());
    tags.push(format!("#durin31polaire{}", size_tag));
    let hashtags = finalize_hashtags(tags);

    let description = join_paragraphs(vec![
        paragraph_one,
        paragraph_two,
        paragraph_three,
        paragraph_four,
        vec![hashtags],
    ]);

    RenderedListing {
        title,
        description,
        price_estimate: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fleece_fields(overrides: serde_json::Value) -> ListingFields {
        let mut payload = json!({
            "model": "",
            "fr_size": "L",
            "us_w": "",
            "us_l": "",
            "fit_leg": "",
            "rise_class": "",
            "cotton_pct": "",
            "polyester_pct": "100",
            "elastane_pct": "",
            "gender": "Homme",
            "color_main": "navy",
            "defects": "",
            "sku": "PTNF4",
            "zip_style": "zip intégral",
            "size_label_visible": true,
            "fabric_label_visible": true,
        });
        if let Some(object) = overrides.as_object() {
            for (key, value) in object {
                payload[key] = value.clone();
            }
        }
        ListingFields::from_value(&payload, super::super::TEMPLATE_FLEECE).unwrap()
    }

    #[test]
    fn test_brand_resolved_from_sku_prefix() {
        let tnf = fleece_fields(json!({}));
        assert_eq!(resolve_brand(&tnf), FleeceBrand::TheNorthFace);
        let rendered = render(&tnf);
        assert!(rendered.title.starts_with("Polaire The North Face"));
        assert!(rendered.description.contains("#thenorthface"));

        let columbia = fleece_fields(json!({"sku": "PC12"}));
        assert_eq!(resolve_brand(&columbia), FleeceBrand::Columbia);
        let rendered = render(&columbia);
        assert!(rendered.title.starts_with("Polaire Columbia"));
    }

    #[test]
    fn test_brand_falls_back_to_keywords_then_raw_field() {
        let keyword = fleece_fields(json!({"sku": "", "feature_notes": "logo TNF brodé"}));
        assert_eq!(resolve_brand(&keyword), FleeceBrand::TheNorthFace);

        let raw = fleece_fields(json!({"sku": "", "brand": "Quechua"}));
        assert_eq!(resolve_brand(&raw), FleeceBrand::Other);
        let rendered = render(&raw);
        assert!(rendered.title.starts_with("Polaire Quechua"));

        let generic = fleece_fields(json!({"sku": ""}));
        let rendered = render(&generic);
        assert!(rendered.title.starts_with("Polaire zip intégral"));
    }

    #[test]
    fn test_missing_fabric_label_presumes_polyester() {
        let fields = fleece_fields(json!({
            "polyester_pct": "",
            "fabric_label_visible": false,
        }));
        let rendered = render(&fields);
        assert!(rendered
            .description
            .contains("Composition : 100% polyester (polaire)."));
        assert!(!rendered.description.contains(COMPOSITION_MISSING_SENTENCE));
        assert!(!rendered
            .description
            .contains("Étiquette composition non visible"));
    }

    #[test]
    fn test_natural_fiber_mention_blocks_the_presumption() {
        let fields = fleece_fields(json!({
            "polyester_pct": "",
            "fabric_label_visible": false,
            "defects": "étiquette coupée, doublure coton usée",
        }));
        let rendered = render(&fields);
        assert!(!rendered.description.contains("100% polyester"));
        assert!(rendered.description.contains(COMPOSITION_MISSING_SENTENCE));
        assert!(rendered
            .description
            .contains("Étiquette composition non visible sur les photos."));
    }

    #[test]
    fn test_cut_label_also_triggers_presumption() {
        let fields = fleece_fields(json!({
            "fabric_label_cut": true,
        }));
        let rendered = render(&fields);
        assert!(rendered
            .description
            .contains("Composition : 100% polyester (polaire)."));
    }

    #[test]
    fn test_size_notice_survives_polyester_presumption() {
        let fields = fleece_fields(json!({
            "fr_size": "",
            "polyester_pct": "",
            "size_label_visible": false,
            "fabric_label_visible": false,
        }));
        let rendered = render(&fields);
        assert!(rendered
            .description
            .contains("Étiquette taille non visible sur les photos."));
        assert!(rendered.description.contains("100% polyester"));
    }

    #[test]
    fn test_technical_features_are_listed() {
        let fields = fleece_fields(json!({
            "technical_features": "poches zippées, cordon de serrage",
        }));
        let rendered = render(&fields);
        assert!(rendered
            .description
            .contains("Détails techniques : poches zippées, cordon de serrage."));
    }
}
