//! Extraction prompts sent to the vision model, one per template.
//!
//! The field names listed here are a wire contract with
//! [`crate::fields::ListingFields::from_value`]: renaming a field means
//! changing both sides together.

use crate::defects::DEFECT_CATALOG;

/// Enumerate the known defect slugs with their synonyms, so the model answers
/// with catalog slugs instead of free-form wordings.
fn defect_slug_section() -> String {
    let mut lines = vec![
        "Tags de défauts autorisés pour 'defect_tags' (liste séparée par des virgules) :".to_string(),
    ];
    for spec in DEFECT_CATALOG {
        lines.push(format!("- {} (synonymes : {})", spec.slug, spec.synonyms.join(", ")));
    }
    lines.push("N'utilise jamais d'autre tag que ceux listés ci-dessus.".to_string());
    lines.join("\n")
}

const COMMON_RULES: &str = r#"Règles générales :
- Réponds EXCLUSIVEMENT avec un JSON valide contenant une clé 'fields'.
- Les valeurs doivent être au format chaîne, sauf les booléens de visibilité.
- Laisse une chaîne vide quand une information n'est pas lisible sur les photos.
- 'size_label_visible' et 'fabric_label_visible' indiquent si les étiquettes sont réellement lisibles ; 'fabric_label_cut' vaut true quand l'étiquette de composition a été coupée.
- N'invente jamais de matière ni de pourcentage : recopie uniquement l'étiquette de composition.
- Les mesures sont en centimètres, mesurées à plat quand précisé."#;

pub(super) fn denim_prompt() -> String {
    format!(
        r#"Analyse les photos de ce jean Levi's et renvoie les caractéristiques dans un JSON de la forme :
{{
  "fields": {{
    "model": "modèle Levi's (ex: 501)",
    "fr_size": "taille française visible sur l'étiquette (ex: 38)",
    "us_w": "largeur US W (ex: 28)",
    "us_l": "longueur US L (ex: 30)",
    "fit_leg": "coupe en anglais (bootcut, straight, slim, skinny...)",
    "rise_class": "hauteur de taille (basse, moyenne, haute)",
    "rise_measurement_cm": "hauteur de taille mesurée en cm si visible",
    "waist_measurement_cm": "tour de taille mesuré en cm (ou largeur à plat)",
    "cotton_pct": "pourcentage de coton (ex: 99)",
    "polyester_pct": "pourcentage de polyester (0 si absent)",
    "elastane_pct": "pourcentage d'élasthanne (0 si absent)",
    "viscose_pct": "pourcentage de viscose (0 si absent)",
    "polyamide_pct": "pourcentage de polyamide",
    "nylon_pct": "pourcentage de nylon",
    "acrylic_pct": "pourcentage d'acrylique",
    "wool_pct": "pourcentage de laine",
    "cashmere_pct": "pourcentage de cachemire",
    "gender": "genre ciblé (Femme, Homme, Mixte)",
    "color_main": "couleur principale",
    "special_logo": "logo ou patch particulier si présent",
    "feature_notes": "détails notables (délavage, broderie, paillettes...)",
    "defects": "défauts ou taches identifiés",
    "defect_tags": "tags de défauts connus, séparés par des virgules",
    "sku": "référence interne (ex: JLF6 pour femme, JLH6 pour homme)",
    "size_label_visible": true,
    "fabric_label_visible": true,
    "fabric_label_cut": false
  }}
}}

{common}

{defects}

Précisions jean :
- Indique la coupe en anglais dans 'fit_leg' (ex: bootcut, straight, slim).
- Le SKU commence par JLF (femme) ou JLH (homme), suivi de chiffres.
- 'waist_measurement_cm' : si un mètre ruban est visible, relève le tour de taille ; une valeur inférieure à 60 cm sera traitée comme une largeur mesurée à plat."#,
        common = COMMON_RULES,
        defects = defect_slug_section()
    )
}

pub(super) fn knitwear_prompt() -> String {
    format!(
        r#"Analyse les photos de ce pull Tommy Hilfiger et renvoie les caractéristiques dans un JSON de la forme :
{{
  "fields": {{
    "model": "référence modèle si lisible",
    "fr_size": "taille étiquette (ex: M, FR 40 (L))",
    "us_w": "",
    "us_l": "",
    "fit_leg": "",
    "rise_class": "",
    "bust_flat_measurement_cm": "largeur de poitrine mesurée à plat en cm",
    "length_measurement_cm": "longueur épaule-ourlet en cm",
    "cotton_pct": "pourcentage de coton",
    "wool_pct": "pourcentage de laine",
    "cashmere_pct": "pourcentage de cachemire",
    "polyester_pct": "pourcentage de polyester",
    "polyamide_pct": "pourcentage de polyamide",
    "nylon_pct": "pourcentage de nylon",
    "acrylic_pct": "pourcentage d'acrylique",
    "viscose_pct": "pourcentage de viscose",
    "elastane_pct": "pourcentage d'élasthanne",
    "knit_pattern": "motif de la maille (torsadé, jacquard, rayé, uni...)",
    "neckline_style": "type de col (col V, col rond, col roulé...)",
    "zip_style": "type de fermeture si zippé",
    "is_cardigan": false,
    "is_dress": false,
    "special_logo": "logo ou drapeau brodé si présent",
    "made_in": "mention d'origine (ex: Made in Italy, Made in Europe)",
    "gender": "genre ciblé (Femme, Homme, Mixte)",
    "color_main": "couleur principale",
    "feature_notes": "détails notables",
    "defects": "défauts identifiés (bouloches, taches...)",
    "defect_tags": "tags de défauts connus, séparés par des virgules",
    "sku": "référence interne PTF suivie de chiffres (ex: PTF7)",
    "size_label_visible": true,
    "fabric_label_visible": true,
    "fabric_label_cut": false
  }}
}}

{common}

{defects}

Précisions pull :
- Le SKU commence toujours par PTF suivi de chiffres ; il est écrit sur l'étiquette interne.
- 'is_cardigan' vaut true pour un gilet ouvert, 'is_dress' pour une robe pull : ces champs changent le nom du produit dans le titre.
- N'invente jamais de matière : si l'étiquette de composition est absente ou coupée, laisse les pourcentages vides et positionne les booléens en conséquence.
- Relève la mention d'origine exacte (Made in Italy, Made in Europe...) si elle est lisible."#,
        common = COMMON_RULES,
        defects = defect_slug_section()
    )
}

pub(super) fn fleece_prompt() -> String {
    format!(
        r#"Analyse les photos de cette polaire outdoor (The North Face, Columbia...) et renvoie les caractéristiques dans un JSON de la forme :
{{
  "fields": {{
    "model": "référence modèle si lisible",
    "brand": "marque lue sur le vêtement",
    "fr_size": "taille étiquette (ex: L)",
    "us_w": "",
    "us_l": "",
    "fit_leg": "",
    "rise_class": "",
    "bust_flat_measurement_cm": "largeur de poitrine mesurée à plat en cm",
    "length_measurement_cm": "longueur épaule-ourlet en cm",
    "cotton_pct": "pourcentage de coton",
    "polyester_pct": "pourcentage de polyester",
    "elastane_pct": "pourcentage d'élasthanne",
    "polyamide_pct": "pourcentage de polyamide",
    "nylon_pct": "pourcentage de nylon",
    "acrylic_pct": "pourcentage d'acrylique",
    "viscose_pct": "pourcentage de viscose",
    "wool_pct": "pourcentage de laine",
    "cashmere_pct": "pourcentage de cachemire",
    "zip_style": "zip intégral, demi-zip...",
    "technical_features": "détails techniques (poches zippées, cordon de serrage...)",
    "special_logo": "logo brodé si présent",
    "gender": "genre ciblé (Femme, Homme, Mixte)",
    "color_main": "couleur principale",
    "feature_notes": "détails notables",
    "defects": "défauts identifiés",
    "defect_tags": "tags de défauts connus, séparés par des virgules",
    "sku": "référence interne PTNF ou PC suivie de chiffres (ex: PTNF4, PC12)",
    "size_label_visible": true,
    "fabric_label_visible": true,
    "fabric_label_cut": false
  }}
}}

{common}

{defects}

Précisions polaire :
- Le SKU commence par PTNF (The North Face) ou PC (Columbia), suivi de chiffres.
- Recopie la marque exacte dans 'brand' même si elle n'est ni The North Face ni Columbia."#,
        common = COMMON_RULES,
        defects = defect_slug_section()
    )
}

/// Follow-up prompt used when the knitwear SKU came back empty.
pub(super) fn knitwear_sku_recovery_prompt() -> String {
    r#"Analyse ces photos et renvoie UNIQUEMENT la référence interne écrite sur l'étiquette du pull.
Elle commence par PTF suivie de 1 à 3 chiffres (ex: PTF52).
Réponds avec la référence seule, sans autre texte. Si aucune référence n'est lisible, réponds avec une chaîne vide."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denim_prompt_lists_the_wire_fields() {
        let prompt = denim_prompt();
        for field in [
            "waist_measurement_cm",
            "viscose_pct",
            "nylon_pct",
            "acrylic_pct",
            "polyamide_pct",
            "defect_tags",
            "fabric_label_cut",
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("faded_crotch"));
        assert!(prompt.contains("entrejambe délavé"));
        assert!(prompt.contains("stylish_holes"));
        assert!(prompt.contains("effet troué"));
        assert!(prompt.contains("tour de taille"));
    }

    #[test]
    fn test_knitwear_prompt_mentions_its_specific_fields() {
        let prompt = knitwear_prompt();
        for field in ["wool_pct", "cashmere_pct", "knit_pattern", "made_in", "is_cardigan"] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("PTF"));
        assert!(prompt.contains("Made in Europe"));
        assert!(prompt.contains("N'invente jamais de matière"));
        assert!(prompt.to_lowercase().contains("dans le titre"));
    }

    #[test]
    fn test_fleece_prompt_mentions_both_sku_prefixes() {
        let prompt = fleece_prompt();
        assert!(prompt.contains("PTNF"));
        assert!(prompt.contains("PC"));
        assert!(prompt.contains("technical_features"));
        assert!(prompt.contains("brand"));
    }

    #[test]
    fn test_sku_recovery_prompt_is_minimal() {
        let prompt = knitwear_sku_recovery_prompt();
        assert!(prompt.contains("Analyse ces photos"));
        assert!(prompt.contains("PTF"));
    }
}
