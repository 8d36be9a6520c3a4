//! Renderer for the Tommy Hilfiger knitwear template.

use super::{
    composition_sentence, condition_line, fabric_label_missing, finalize_hashtags, hashtag_slug,
    join_paragraphs, join_title, label_status_notice, RenderedListing,
    COMPOSITION_MISSING_SENTENCE,
};
use crate::fields::{parse_pct, ListingFields};
use crate::sizing::estimate_fr_top_size;
use crate::text::{
    extract_primary_size_label, normalize_apparel_size, normalize_for_comparison,
    normalize_size_hashtag, split_neckline_from_pattern, translate_color_to_french,
};

/// Marketing bundle attached to a recognized knit pattern. First match wins.
struct PatternRule {
    keywords: &'static [&'static str],
    marketing: &'static str,
    style: &'static str,
    hashtags: &'static [&'static str],
}

const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        keywords: &["torsad", "cable"],
        marketing: "Maille torsadée au charme artisanal, parfaite pour les journées fraîches.",
        style: "Un esprit aran intemporel qui structure la silhouette.",
        hashtags: &["#pulltorsade", "#mailletorsadee"],
    },
    PatternRule {
        keywords: &["jacquard", "norveg", "fair isle"],
        marketing: "Motif jacquard travaillé qui réchauffe instantanément une tenue d'hiver.",
        style: "Un esprit montagne rétro très recherché.",
        hashtags: &["#jacquard", "#pullnorvegien"],
    },
    PatternRule {
        keywords: &["marini", "raye", "stripe"],
        marketing: "Rayures marinières indémodables, l'esprit bord de mer toute l'année.",
        style: "Un basique chic à porter du printemps à l'automne.",
        hashtags: &["#mariniere", "#pullraye"],
    },
    PatternRule {
        keywords: &["losange", "argyle"],
        marketing: "Motif à losanges preppy, clin d'œil aux campus américains.",
        style: "Un esprit college vintage facile à styliser.",
        hashtags: &["#argyle", "#pulllosanges"],
    },
    PatternRule {
        keywords: &["chine"],
        marketing: "Maille chinée aux nuances subtiles, douce à l'œil comme au toucher.",
        style: "Un casual chic qui se marie avec tout.",
        hashtags: &["#pullchine"],
    },
    PatternRule {
        keywords: &["uni", "plain"],
        marketing: "Maille unie facile à porter, le basique qui dure.",
        style: "Un essentiel du vestiaire à superposer sans réfléchir.",
        hashtags: &["#pulluni"],
    },
];

fn match_pattern_rule(pattern: &str) -> Option<&'static PatternRule> {
    let normalized = normalize_for_comparison(pattern);
    if normalized.trim().is_empty() {
        return None;
    }
    PATTERN_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| normalized.contains(kw)))
}

/// Garment wording driven by the sub-type flags.
fn garment_nouns(fields: &ListingFields) -> (&'static str, &'static str) {
    if fields.is_dress {
        ("Robe pull", "robe pull")
    } else if fields.is_cardigan {
        ("Gilet", "gilet")
    } else {
        ("Pull", "pull")
    }
}

/// Single highlight sentence for the fiber mix, in priority order:
/// pure cotton, cashmere+wool, cashmere, wool, then cotton tiers.
fn material_highlight(fields: &ListingFields) -> Option<String> {
    if fabric_label_missing(fields) {
        return None;
    }
    let cotton = parse_pct(&fields.cotton_pct).unwrap_or(0.0);
    let wool = parse_pct(&fields.wool_pct).unwrap_or(0.0);
    let cashmere = parse_pct(&fields.cashmere_pct).unwrap_or(0.0);

    let sentence = if cotton >= 100.0 {
        "100% coton, doux, respirant et facile d'entretien."
    } else if cashmere > 0.0 && wool > 0.0 {
        "Laine et cachemire réunies pour une chaleur haut de gamme."
    } else if cashmere > 0.0 {
        "La touche de cachemire apporte une douceur rare."
    } else if wool > 0.0 {
        "La laine apporte chaleur et tenue au fil des saisons."
    } else if cotton >= 80.0 {
        "Coton largement majoritaire, douceur et confort au quotidien."
    } else if cotton >= 50.0 {
        "Base coton confortable, agréable à même la peau."
    } else if cotton > 0.0 {
        "Maille souple et agréable à porter."
    } else {
        return Some("Maille agréable à porter au quotidien.".to_string());
    };
    Some(sentence.to_string())
}

pub(super) fn render(fields: &ListingFields) -> RenderedListing {
    let (noun_title, noun_lower) = garment_nouns(fields);
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

    // Neckline: the dedicated field wins, else it is split out of the pattern
    // wording.
    let (residual_pattern, extracted_neckline) = split_neckline_from_pattern(&fields.knit_pattern);
    let neckline = if fields.neckline_style.trim().is_empty() {
        extracted_neckline
    } else {
        fields.neckline_style.trim().to_string()
    };
    let pattern_rule = match_pattern_rule(&residual_pattern);

    // Title
    let mut tokens: Vec<String> = vec![noun_title.to_string(), "Tommy Hilfiger".to_string()];
    if !label_size.is_empty() {
        tokens.push(format!("Taille {}", label_size));
    } else if let Some(estimated) = &estimate.estimated_size {
        tokens.push(estimated.clone());
    }
    if !neckline.is_empty() {
        tokens.push(neckline.clone());
    }
    tokens.push(color.clone());
    tokens.push(fields.gender.clone());
    let title = join_title(tokens, &fields.sku);

    // Paragraph 1: intro and size.
    let mut intro = format!("{} Tommy Hilfiger", noun_title);
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

    // Paragraph 2: pattern, color, composition.
    let mut paragraph_two = Vec::new();
    match pattern_rule {
        Some(rule) => {
            paragraph_two.push(rule.marketing.to_string());
            paragraph_two.push(rule.style.to_string());
        }
        None => {
            let residual = residual_pattern.trim();
            if !residual.is_empty() {
                paragraph_two.push(format!("Motif {}.", residual));
            }
        }
    }
    if !neckline.is_empty() {
        paragraph_two.push(format!("Encolure : {}.", neckline));
    }
    if !fields.zip_style.trim().is_empty() {
        paragraph_two.push(format!("Fermeture {}.", fields.zip_style.trim()));
    }
    if !color.is_empty() {
        paragraph_two.push(format!(
            "Coloris {}, facile à associer à toutes vos tenues.",
            color
        ));
    }
    if !fabric_label_missing(fields) {
        match composition_sentence(fields) {
            Some(sentence) => {
                paragraph_two.push(sentence);
                if let Some(highlight) = material_highlight(fields) {
                    paragraph_two.push(highlight);
                }
            }
            None => paragraph_two.push(COMPOSITION_MISSING_SENTENCE.to_string()),
        }
    } else {
        paragraph_two.push(COMPOSITION_MISSING_SENTENCE.to_string());
    }
    if !fields.special_logo.trim().is_empty() {
        paragraph_two.push(format!(
            "Logo {} emblématique de la marque.",
            fields.special_logo.trim()
        ));
    }
    if !fields.made_in.trim().is_empty() {
        paragraph_two.push(format!(
            "{}, gage d'une fabrication soignée.",
            fields.made_in.trim()
        ));
    }

    // Paragraph 3: condition, label status, reminders.
    let mut paragraph_three = vec![condition_line(fields)];
    if let Some(notice) = label_status_notice(fields) {
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
            "✨ Retrouvez tous mes pulls Tommy Hilfiger à votre taille ici 👉 #durin31pull{}",
            size_tag
        ),
        "💡 Pensez à faire un lot pour profiter d’une réduction supplémentaire et économiser des frais d’envoi !"
            .to_string(),
    ];

    // Paragraph 5: hashtags.
    let mut tags = vec![
        "#tommyhilfiger".to_string(),
        "#tommy".to_string(),
        format!("#{}tommy", hashtag_slug(noun_lower)),
    ];
    if let Some(rule) = pattern_rule {
        tags.extend(rule.hashtags.iter().map(|t| t.to_string()));
    }
    if !color.is_empty() {
        tags.push(format!("#{}{}", hashtag_slug(noun_lower), hashtag_slug(&color)));
    }
    if !fields.gender.trim().is_empty() {
        tags.push(format!("#tommy{}", hashtag_slug(&fields.gender)));
    }
    tags.push("#vintedfr".to_string());
    tags.push(format!("#durin31pull{}", size_tag));
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
