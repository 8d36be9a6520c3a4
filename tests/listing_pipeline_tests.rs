//! End-to-end pipeline tests running against the fake provider.

use serde_json::json;
use vinted_listing_core::{
    generate_listing, FakeProvider, GenerateError, GenerateOptions, TemplateError, TEMPLATE_DENIM,
    TEMPLATE_KNITWEAR,
};

fn denim_fields_json() -> serde_json::Value {
    json!({
        "fields": {
            "model": "501",
            "fr_size": "38",
            "us_w": "28",
            "us_l": "30",
            "fit_leg": "slim",
            "rise_class": "moyenne",
            "rise_measurement_cm": "",
            "waist_measurement_cm": "",
            "cotton_pct": "99",
            "polyester_pct": "0",
            "viscose_pct": "0",
            "polyamide_pct": "",
            "acrylic_pct": "",
            "elastane_pct": "1",
            "gender": "Femme",
            "color_main": "black",
            "defects": "",
            "defect_tags": [],
            "sku": "JLF6",
            "size_label_visible": true,
            "fabric_label_visible": true,
        }
    })
}

fn knitwear_fields_json(sku: &str) -> serde_json::Value {
    json!({
        "fields": {
            "model": "",
            "fr_size": "M",
            "us_w": "",
            "us_l": "",
            "fit_leg": "",
            "rise_class": "",
            "cotton_pct": "80",
            "wool_pct": "20",
            "polyester_pct": "0",
            "elastane_pct": "",
            "gender": "Femme",
            "color_main": "Marine",
            "defects": "",
            "knit_pattern": "torsadé",
            "sku": sku,
            "size_label_visible": true,
            "fabric_label_visible": true,
        }
    })
}

#[tokio::test]
async fn test_denim_end_to_end_scenario() {
    let response = format!("```json\n{}\n```", denim_fields_json());
    let provider = FakeProvider::new().with_response("jean Levi's", &response);

    let result = generate_listing(
        &provider,
        &[],
        "",
        &GenerateOptions {
            template: Some(TEMPLATE_DENIM),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap();

    assert!(result.title.contains("Skinny"));
    assert!(result.title.contains("38"));
    assert!(result.title.contains("noir"));
    assert!(result.title.ends_with("- JLF6"));
    assert!(result.description.contains("skinny"));
    assert!(result.description.contains("Coloris noir"));
    assert!(!result.sku_missing);

    let price = result.price_estimate.expect("denim always has a price estimate");
    assert!(price.contains("19€"));
    assert!(price.contains("modèle standard"));
}

#[tokio::test]
async fn test_comment_override_clears_stale_us_labels() {
    let response = denim_fields_json().to_string();
    let provider = FakeProvider::new().with_response("jean Levi's", &response);

    let result = generate_listing(
        &provider,
        &[],
        "Taille FR40, vérifier la couleur bleu",
        &GenerateOptions {
            template: Some(TEMPLATE_DENIM),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap();

    assert!(result.title.contains("FR40"));
    assert!(!result.title.contains("W28"));
    assert!(result.description.contains("40 FR"));
    let price = result.price_estimate.unwrap();
    assert!(price.contains("FR 40"));
}

#[tokio::test]
async fn test_invalid_denim_sku_is_sanitized_once() {
    let mut payload = denim_fields_json();
    payload["fields"]["sku"] = json!("PTF9");
    let provider = FakeProvider::new().with_response("jean Levi's", &payload.to_string());

    let result = generate_listing(
        &provider,
        &[],
        "",
        &GenerateOptions {
            template: Some(TEMPLATE_DENIM),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap();

    assert!(result.sku_missing);
    assert!(result.title.ends_with("- SKU/nc"));
}

#[tokio::test]
async fn test_manual_sku_beats_extracted_sku() {
    let provider =
        FakeProvider::new().with_response("jean Levi's", &denim_fields_json().to_string());

    let result = generate_listing(
        &provider,
        &[],
        "",
        &GenerateOptions {
            template: Some(TEMPLATE_DENIM),
            manual_sku: Some("JLF42"),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap();

    assert!(result.title.ends_with("- JLF42"));
    assert!(!result.sku_missing);
}

#[tokio::test]
async fn test_knitwear_sku_recovery_success() {
    let provider = FakeProvider::new()
        .with_queued_response(&knitwear_fields_json("").to_string())
        .with_queued_response("PTF52");

    let result = generate_listing(
        &provider,
        &["image-one".to_string()],
        "",
        &GenerateOptions {
            template: Some(TEMPLATE_KNITWEAR),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap();

    assert!(!result.sku_missing);
    assert!(result.title.ends_with("- PTF52"));
}

#[tokio::test]
async fn test_knitwear_sku_recovery_failure_flags_missing() {
    let provider = FakeProvider::new()
        .with_queued_response(&knitwear_fields_json("").to_string())
        .with_queued_response("");

    let result = generate_listing(
        &provider,
        &["image-one".to_string()],
        "",
        &GenerateOptions {
            template: Some(TEMPLATE_KNITWEAR),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap();

    assert!(result.sku_missing);
    assert!(result.title.ends_with("- SKU/nc"));
}

#[tokio::test]
async fn test_knitwear_with_sku_skips_recovery_call() {
    // A single queued response: a second call would fall through to the
    // missing-default error.
    let provider =
        FakeProvider::new().with_queued_response(&knitwear_fields_json("PTF7").to_string());

    let result = generate_listing(
        &provider,
        &[],
        "",
        &GenerateOptions {
            template: Some(TEMPLATE_KNITWEAR),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap();

    assert!(result.title.ends_with("- PTF7"));
}

#[tokio::test]
async fn test_empty_model_output_is_an_error() {
    let provider = FakeProvider::new().with_default_response("   ");
    let err = generate_listing(
        &provider,
        &[],
        "",
        &GenerateOptions {
            template: Some(TEMPLATE_DENIM),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, GenerateError::EmptyModelOutput));
}

#[tokio::test]
async fn test_json_parse_error_carries_a_snippet() {
    let provider = FakeProvider::new().with_default_response("je ne sais pas");
    let err = generate_listing(
        &provider,
        &[],
        "",
        &GenerateOptions {
            template: Some(TEMPLATE_DENIM),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap_err();
    match err {
        GenerateError::JsonParse { snippet } => assert!(snippet.contains("je ne sais pas")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_auto_template_selection_from_comment() {
    let provider =
        FakeProvider::new().with_response("jean Levi's", &denim_fields_json().to_string());

    let result = generate_listing(
        &provider,
        &[],
        "Jean Levi's 501 taille 38",
        &GenerateOptions::default(),
    )
    .await
    .unwrap();

    assert!(result.title.starts_with("Jean Levi’s"));
}

#[tokio::test]
async fn test_ambiguous_classification_is_surfaced() {
    let provider = FakeProvider::new().with_default_response("{}");
    let err = generate_listing(&provider, &[], "", &GenerateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Template(TemplateError::AmbiguousClassification)
    ));
}

#[tokio::test]
async fn test_unknown_template_is_surfaced() {
    let provider = FakeProvider::new().with_default_response("{}");
    let err = generate_listing(
        &provider,
        &[],
        "",
        &GenerateOptions {
            template: Some("template-chaussures"),
            ..GenerateOptions::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Template(TemplateError::UnknownTemplate(_))
    ));
}
