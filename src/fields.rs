//! Structured representation of the fields extracted for a listing.
//!
//! The vision model answers with a JSON object; [`ListingFields::from_value`]
//! is the single validation gate between that untyped payload and the
//! renderers. Values are trimmed strings (empty means unknown), measurements
//! are parsed floats, visibility flags accept the bool/int/string spellings
//! models actually produce.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::defects::{infer_defect_tags, is_known_slug};
use crate::error::FieldsError;
use crate::templates::{TEMPLATE_FLEECE, TEMPLATE_KNITWEAR};
use crate::text::normalize_model_code;

/// Keys every payload must carry, whatever the template.
const REQUIRED_KEYS: &[&str] = &[
    "model",
    "fr_size",
    "us_w",
    "us_l",
    "fit_leg",
    "rise_class",
    "cotton_pct",
    "elastane_pct",
    "gender",
    "color_main",
    "defects",
    "sku",
];

/// Structured data extracted from the model response.
///
/// Instances are never mutated in place: the override resolver and the size
/// cleanup step clone and rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFields {
    pub model: String,
    pub sku: String,
    pub brand: String,

    pub fr_size: String,
    pub us_w: String,
    pub us_l: String,
    pub waist_measurement_cm: Option<f64>,
    pub waist_flat_measurement_cm: Option<f64>,
    pub rise_measurement_cm: Option<f64>,
    pub bust_flat_measurement_cm: Option<f64>,
    pub length_measurement_cm: Option<f64>,

    pub cotton_pct: String,
    pub polyester_pct: String,
    pub elastane_pct: String,
    pub polyamide_pct: String,
    pub viscose_pct: String,
    pub wool_pct: String,
    pub cashmere_pct: String,
    pub nylon_pct: String,
    pub acrylic_pct: String,

    pub fit_leg: String,
    pub rise_class: String,
    pub gender: String,
    pub color_main: String,
    pub defects: String,
    pub defect_tags: Vec<String>,
    pub knit_pattern: String,
    pub zip_style: String,
    pub neckline_style: String,
    pub special_logo: String,
    pub feature_notes: String,
    pub technical_features: String,
    pub made_in: String,

    pub is_cardigan: bool,
    pub is_dress: bool,

    pub size_label_visible: bool,
    pub fabric_label_visible: bool,
    pub fabric_label_cut: bool,
}

impl ListingFields {
    /// Validate a raw `fields` JSON object into a typed value.
    ///
    /// Missing required keys, non-string/number values, unknown defect slugs
    /// and malformed SKUs all fail here so the renderers never see garbage.
    pub fn from_value(raw: &Value, template_name: &str) -> Result<Self, FieldsError> {
        let object = raw
            .as_object()
            .ok_or_else(|| FieldsError::MissingFields("fields".to_string()))?;

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .filter(|key| !object.contains_key(**key))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(FieldsError::MissingFields(missing.join(", ")));
        }

        let text = |key: &str| -> Result<String, FieldsError> {
            coerce_text(object.get(key), key)
        };
        let measurement = |key: &str| -> Result<Option<f64>, FieldsError> {
            Ok(parse_measurement(&text(key)?))
        };
        let flag = |key: &str, default: bool| -> Result<bool, FieldsError> {
            parse_flag(object.get(key), key, default)
        };

        let defects = text("defects")?;
        let defect_tags = parse_defect_tags(object.get("defect_tags"))?;

        let mut fields = ListingFields {
            model: normalize_model_code(&text("model")?).unwrap_or_default(),
            sku: text("sku")?,
            brand: text("brand")?,
            fr_size: text("fr_size")?,
            us_w: text("us_w")?,
            us_l: text("us_l")?,
            waist_measurement_cm: measurement("waist_measurement_cm")?,
            waist_flat_measurement_cm: measurement("waist_flat_measurement_cm")?,
            rise_measurement_cm: measurement("rise_measurement_cm")?,
            bust_flat_measurement_cm: measurement("bust_flat_measurement_cm")?,
            length_measurement_cm: measurement("length_measurement_cm")?,
            cotton_pct: text("cotton_pct")?,
            polyester_pct: text("polyester_pct")?,
            elastane_pct: text("elastane_pct")?,
            polyamide_pct: text("polyamide_pct")?,
            viscose_pct: text("viscose_pct")?,
            wool_pct: text("wool_pct")?,
            cashmere_pct: text("cashmere_pct")?,
            nylon_pct: text("nylon_pct")?,
            acrylic_pct: text("acrylic_pct")?,
            fit_leg: text("fit_leg")?,
            rise_class: text("rise_class")?,
            gender: text("gender")?,
            color_main: text("color_main")?,
            defects,
            defect_tags,
            knit_pattern: text("knit_pattern")?,
            zip_style: text("zip_style")?,
            neckline_style: text("neckline_style")?,
            special_logo: text("special_logo")?,
            feature_notes: text("feature_notes")?,
            technical_features: text("technical_features")?,
            made_in: text("made_in")?,
            is_cardigan: flag("is_cardigan", false)?,
            is_dress: flag("is_dress", false)?,
            // Absent visibility flags mean the model was not asked about the
            // labels, in which case they are presumed readable.
            size_label_visible: flag("size_label_visible", true)?,
            fabric_label_visible: flag("fabric_label_visible", true)?,
            fabric_label_cut: flag("fabric_label_cut", false)?,
        };

        validate_sku(&fields.sku, &fields.gender, template_name)?;
        if fields.defect_tags.is_empty() {
            fields.defect_tags = infer_defect_tags(&fields.defects);
        }

        Ok(fields)
    }

    /// SKU absent from tag or photos.
    pub fn sku_missing(&self) -> bool {
        self.sku.trim().is_empty()
    }

    fn fiber_present(&self, pct: &str) -> bool {
        if !self.fabric_label_visible {
            return false;
        }
        parse_pct(pct).map(|v| v > 0.0).unwrap_or(false)
    }

    pub fn has_cotton(&self) -> bool {
        self.fiber_present(&self.cotton_pct)
    }

    pub fn has_polyester(&self) -> bool {
        self.fiber_present(&self.polyester_pct)
    }

    pub fn has_elastane(&self) -> bool {
        self.fiber_present(&self.elastane_pct)
    }

    pub fn has_polyamide(&self) -> bool {
        self.fiber_present(&self.polyamide_pct)
    }

    pub fn has_viscose(&self) -> bool {
        self.fiber_present(&self.viscose_pct)
    }

    pub fn has_wool(&self) -> bool {
        self.fiber_present(&self.wool_pct)
    }

    pub fn has_cashmere(&self) -> bool {
        self.fiber_present(&self.cashmere_pct)
    }

    pub fn has_nylon(&self) -> bool {
        self.fiber_present(&self.nylon_pct)
    }

    pub fn has_acrylic(&self) -> bool {
        self.fiber_present(&self.acrylic_pct)
    }

    /// Rise class, resolved from the measured rise when the label wording is
    /// absent.
    pub fn resolved_rise_class(&self) -> String {
        let explicit = self.rise_class.trim();
        if !explicit.is_empty() {
            return explicit.to_string();
        }
        let Some(measurement) = self.rise_measurement_cm.filter(|v| *v > 0.0) else {
            return String::new();
        };
        let class = if measurement < 20.0 {
            "basse"
        } else if measurement < 26.0 {
            "moyenne"
        } else if measurement < 33.0 {
            "haute"
        } else {
            "très haute"
        };
        class.to_string()
    }
}

/// Numeric percentage behind a `"99"` / `"99%"` wording, if parseable.
pub(crate) fn parse_pct(value: &str) -> Option<f64> {
    let trimmed = value.trim().trim_end_matches('%').trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse().ok()
}

fn coerce_text(value: Option<&Value>, key: &str) -> Result<String, FieldsError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(FieldsError::UnexpectedType {
            field: key.to_string(),
        }),
    }
}

/// Parse a measurement wording; comma decimals are accepted, anything
/// unreadable degrades to "unknown".
fn parse_measurement(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .trim_end_matches("cm")
        .trim()
        .replace(',', ".")
        .parse()
        .ok()
}

fn parse_flag(value: Option<&Value>, key: &str, default: bool) -> Result<bool, FieldsError> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_f64().map(|v| v != 0.0).unwrap_or(default)),
        Some(Value::String(s)) => {
            let normalized = s.trim().to_lowercase();
            match normalized.as_str() {
                "" => Ok(default),
                "true" | "vrai" | "1" | "oui" | "yes" => Ok(true),
                "false" | "faux" | "0" | "non" | "no" => Ok(false),
                _ => Err(FieldsError::UnexpectedType {
                    field: key.to_string(),
                }),
            }
        }
        Some(_) => Err(FieldsError::UnexpectedType {
            field: key.to_string(),
        }),
    }
}

fn parse_defect_tags(value: Option<&Value>) -> Result<Vec<String>, FieldsError> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: &str| -> Result<(), FieldsError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Ok(());
        }
        if !is_known_slug(tag) {
            return Err(FieldsError::UnknownDefectTag(tag.to_string()));
        }
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
        Ok(())
    };

    match value {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) => {
            for part in s.split(',') {
                push(part)?;
            }
        }
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(s) => push(s)?,
                    _ => {
                        return Err(FieldsError::UnexpectedType {
                            field: "defect_tags".to_string(),
                        })
                    }
                }
            }
        }
        Some(_) => {
            return Err(FieldsError::UnexpectedType {
                field: "defect_tags".to_string(),
            })
        }
    }
    Ok(tags)
}

static SKU_DENIM_FEMME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^JLF\d{1,3}$").unwrap());
static SKU_DENIM_HOMME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^JLH\d{1,3}$").unwrap());
static SKU_KNITWEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^PTF\d{1,3}$").unwrap());
static SKU_FLEECE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(PTNF|PC)\d{1,3}$").unwrap());

/// Check the SKU against the template- and gender-specific format.
///
/// An empty SKU is accepted here; the pipeline reports it through the
/// `sku_missing` flag instead.
pub(crate) fn validate_sku(sku: &str, gender: &str, template_name: &str) -> Result<(), FieldsError> {
    let sku = sku.trim();
    if sku.is_empty() {
        return Ok(());
    }

    let (pattern, expected): (&Regex, &str) = match template_name {
        TEMPLATE_KNITWEAR => (&SKU_KNITWEAR, "PTF suivi de 1 à 3 chiffres"),
        TEMPLATE_FLEECE => (&SKU_FLEECE, "PTNF ou PC suivi de 1 à 3 chiffres"),
        // Anything else validates like the denim template, the default.
        _ => {
            if gender.trim().eq_ignore_ascii_case("homme") {
                (&SKU_DENIM_HOMME, "JLH suivi de 1 à 3 chiffres")
            } else {
                (&SKU_DENIM_FEMME, "JLF suivi de 1 à 3 chiffres")
            }
        }
    };

    if pattern.is_match(sku) {
        Ok(())
    } else {
        Err(FieldsError::InvalidSku {
            sku: sku.to_string(),
            reason: format!("format attendu {}", expected),
        })
    }
}
