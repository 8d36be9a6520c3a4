//! Size conversion rules between US, FR and direct garment measurements.
//!
//! FR bottoms sizes track the US waist label at a +10 offset; a measured waist
//! can confirm, replace or stand in for the labels. All thresholds here are
//! exact business rules, not approximations.

use std::sync::LazyLock;

use regex::Regex;

const CM_PER_INCH: f64 = 2.54;

/// FR offset over a US waist label.
const FR_US_OFFSET: i64 = 10;

/// Below this many centimeters a waist measurement is assumed to be a flat
/// (half) width and doubled into a circumference.
const FLAT_WAIST_THRESHOLD_CM: f64 = 60.0;

/// A measurement-based FR size beyond this distance from a labeled size means
/// the labels are wrong and the measurement wins.
const MEASUREMENT_OVERRIDE_GAP: i64 = 4;

const ELASTANE_NOTE: &str =
    "Mesure FR étendue par la présence d'élasthane dans la composition";

/// Result of the size normalization rules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedSizes {
    pub fr_size: Option<String>,
    pub us_size: Option<String>,
    pub note: Option<String>,
}

/// FR estimate derived from a waist measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct WaistEstimate {
    pub fr: i64,
    pub us: i64,
    pub circumference_cm: f64,
    /// True when the input was read as a flat width and doubled.
    pub doubled: bool,
}

impl WaistEstimate {
    fn note(&self, original_cm: f64) -> String {
        let rounded = original_cm.round() as i64;
        if self.doubled {
            format!(
                "Taille estimée à partir de la largeur de taille mesurée à plat (~{} cm)",
                rounded
            )
        } else {
            format!(
                "Taille estimée à partir d'un tour de taille mesuré (~{} cm)",
                rounded
            )
        }
    }
}

static FIRST_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// First digit run of a size label, as an integer.
pub(crate) fn extract_int(value: Option<&str>) -> Option<i64> {
    let value = value?;
    FIRST_INT.find(value)?.as_str().parse().ok()
}

/// Convert a waist measurement in centimeters into an FR/US size pair.
///
/// Measurements under 60 cm are read as flat widths and doubled. The US size
/// is the rounded inch value of the circumference; FR adds 10 to the unrounded
/// inch value before rounding. With `ensure_even_fr`, an odd FR moves to
/// whichever neighbor sits closer to the unrounded value, upward on a tie.
pub fn compute_fr_from_waist_measurement(
    measurement_cm: f64,
    ensure_even_fr: bool,
) -> Option<WaistEstimate> {
    if measurement_cm <= 0.0 {
        return None;
    }

    let doubled = measurement_cm < FLAT_WAIST_THRESHOLD_CM;
    let circumference_cm = if doubled {
        measurement_cm * 2.0
    } else {
        measurement_cm
    };

    let inches = circumference_cm / CM_PER_INCH;
    let us = inches.round() as i64;
    if us <= 0 {
        return None;
    }

    let fr_float = inches + FR_US_OFFSET as f64;
    let mut fr = fr_float.round() as i64;
    if ensure_even_fr && fr % 2 != 0 {
        let lower = fr - 1;
        let upper = fr + 1;
        fr = if lower <= 0 {
            upper
        } else {
            let lower_gap = (fr_float - lower as f64).abs();
            let upper_gap = (upper as f64 - fr_float).abs();
            // Tie breaks toward the larger size.
            if lower_gap < upper_gap {
                lower
            } else {
                upper
            }
        };
    }

    if fr <= 0 {
        return None;
    }
    Some(WaistEstimate {
        fr,
        us,
        circumference_cm,
        doubled,
    })
}

/// Thin wrapper returning just the measurement-derived FR size as a string.
pub fn fr_size_from_waist_measurement(measurement_cm: f64, ensure_even_fr: bool) -> Option<String> {
    compute_fr_from_waist_measurement(measurement_cm, ensure_even_fr).map(|e| e.fr.to_string())
}

/// Round an odd computed FR to an even neighbor.
///
/// When a measurement-based FR sits within the override gap of the candidate,
/// rounding leans toward the measurement's side (up on an exact tie);
/// otherwise always up.
fn adjust_even(candidate: i64, ensure_even_fr: bool, measurement: Option<&WaistEstimate>) -> i64 {
    if !ensure_even_fr || candidate % 2 == 0 {
        return candidate;
    }
    if let Some(estimate) = measurement {
        if (estimate.fr - candidate).abs() <= MEASUREMENT_OVERRIDE_GAP {
            return if estimate.fr < candidate {
                candidate - 1
            } else {
                candidate + 1
            };
        }
    }
    candidate + 1
}

/// Apply the business rules converting US W and FR labels into displayed sizes.
///
/// - A measurement-based FR farther than 4 from either label wins outright.
/// - With both labels, `delta = FR - US` outside [8, 12] means only FR is
///   trusted; above 12 with elastane present a dedicated note is attached.
///   Inside the range the FR shown is recomputed as `US + 10`.
/// - A lone US label maps to `US + 10`; a lone FR label is trusted verbatim.
/// - With no label at all, the measurement estimate is the fallback.
pub fn normalize_sizes(
    us_w: Option<&str>,
    fr_size: Option<&str>,
    has_elastane: bool,
    ensure_even_fr: bool,
    waist_measurement_cm: Option<f64>,
) -> NormalizedSizes {
    let us_value = extract_int(us_w);
    let fr_value = extract_int(fr_size);
    let measurement = waist_measurement_cm
        .and_then(|cm| compute_fr_from_waist_measurement(cm, ensure_even_fr).map(|e| (e, cm)));

    if let Some((estimate, original_cm)) = &measurement {
        let far_from_fr = fr_value
            .map(|fr| (estimate.fr - fr).abs() > MEASUREMENT_OVERRIDE_GAP)
            .unwrap_or(false);
        let far_from_us = us_value
            .map(|us| (estimate.fr - (us + FR_US_OFFSET)).abs() > MEASUREMENT_OVERRIDE_GAP)
            .unwrap_or(false);
        if far_from_fr || far_from_us {
            return NormalizedSizes {
                fr_size: Some(estimate.fr.to_string()),
                us_size: None,
                note: Some(estimate.note(*original_cm)),
            };
        }
    }
    let estimate = measurement.as_ref().map(|(estimate, _)| estimate);

    if let (Some(us), Some(fr)) = (us_value, fr_value) {
        let delta = fr - us;
        if !(8..=12).contains(&delta) {
            let note = if has_elastane && delta > 12 {
                Some(ELASTANE_NOTE.to_string())
            } else {
                None
            };
            return NormalizedSizes {
                fr_size: Some(fr.to_string()),
                us_size: None,
                note,
            };
        }
        let computed_fr = adjust_even(us + FR_US_OFFSET, ensure_even_fr, estimate);
        return NormalizedSizes {
            fr_size: Some(computed_fr.to_string()),
            us_size: Some(us.to_string()),
            note: None,
        };
    }

    if let Some(us) = us_value {
        let computed_fr = adjust_even(us + FR_US_OFFSET, ensure_even_fr, estimate);
        return NormalizedSizes {
            fr_size: Some(computed_fr.to_string()),
            us_size: Some(us.to_string()),
            note: None,
        };
    }

    if let Some(fr) = fr_value {
        return NormalizedSizes {
            fr_size: Some(fr.to_string()),
            us_size: None,
            note: None,
        };
    }

    if let Some((estimate, original_cm)) = &measurement {
        return NormalizedSizes {
            fr_size: Some(estimate.fr.to_string()),
            us_size: None,
            note: Some(estimate.note(*original_cm)),
        };
    }

    NormalizedSizes::default()
}

/// Bust circumference brackets for apparel tops, ascending upper bounds.
const TOP_SIZE_BRACKETS: &[(f64, &str, i64)] = &[
    (84.0, "XS", 34),
    (88.0, "S", 36),
    (92.0, "M", 38),
    (98.0, "L", 40),
    (104.0, "XL", 42),
    (112.0, "XXL", 44),
];

const TOP_CIRCUMFERENCE_MIN: f64 = 70.0;
const TOP_CIRCUMFERENCE_MAX: f64 = 130.0;

/// Estimated top size derived from flat measurements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopSizeEstimate {
    /// `"FR 38 (M)"`-style label, absent when no estimate could be made.
    pub estimated_size: Option<String>,
    pub note: Option<String>,
    pub length_descriptor: Option<String>,
}

/// Estimate an apparel top size (XS-XXL) from a flat bust measurement.
///
/// Values already in the 70-130 cm range are read as full circumferences,
/// anything else as a flat width to double. Circumferences outside the range
/// yield a note and no size.
pub fn estimate_fr_top_size(
    bust_flat_cm: Option<f64>,
    length_cm: Option<f64>,
) -> TopSizeEstimate {
    let length_descriptor = length_cm.filter(|v| *v > 0.0).map(|v| {
        format!("Longueur épaule-ourlet ~{}cm.", v.round() as i64)
    });

    let Some(raw) = bust_flat_cm.filter(|v| *v > 0.0) else {
        return TopSizeEstimate {
            estimated_size: None,
            note: None,
            length_descriptor,
        };
    };

    let doubled = !(TOP_CIRCUMFERENCE_MIN..=TOP_CIRCUMFERENCE_MAX).contains(&raw);
    let circumference = if doubled { raw * 2.0 } else { raw };
    let rounded = circumference.round() as i64;

    if !(TOP_CIRCUMFERENCE_MIN..=TOP_CIRCUMFERENCE_MAX).contains(&circumference) {
        let note = if doubled {
            format!(
                "Tour de poitrine estimé à ~{} cm (largeur à plat doublée), hors de la plage d'estimation.",
                rounded
            )
        } else {
            format!(
                "Tour de poitrine de ~{} cm hors de la plage d'estimation.",
                rounded
            )
        };
        return TopSizeEstimate {
            estimated_size: None,
            note: Some(note),
            length_descriptor,
        };
    }

    let note = if doubled {
        format!(
            "Taille estimée à partir d'une largeur de poitrine mesurée à plat (~{} cm, soit ~{} cm de tour de poitrine)",
            raw.round() as i64,
            rounded
        )
    } else {
        format!(
            "Taille estimée à partir d'un tour de poitrine de ~{} cm",
            rounded
        )
    };

    for (upper_bound, label, fr) in TOP_SIZE_BRACKETS {
        if circumference <= *upper_bound {
            return TopSizeEstimate {
                estimated_size: Some(format!("FR {} ({})", fr, label)),
                note: Some(note),
                length_descriptor,
            };
        }
    }

    TopSizeEstimate {
        estimated_size: None,
        note: Some(format!(
            "Tour de poitrine de ~{} cm hors grille d'estimation.",
            rounded
        )),
        length_descriptor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fr_alone_when_delta_out_of_range() {
        let sizes = normalize_sizes(Some("28"), Some("44"), true, false, None);
        assert_eq!(sizes.fr_size.as_deref(), Some("44"));
        assert_eq!(sizes.us_size, None);
        assert_eq!(sizes.note.as_deref(), Some(ELASTANE_NOTE));

        // Same gap without elastane: no note.
        let sizes = normalize_sizes(Some("28"), Some("44"), false, false, None);
        assert_eq!(sizes.note, None);
    }

    #[test]
    fn test_both_labels_in_range_recomputes_fr() {
        let sizes = normalize_sizes(Some("28"), Some("38"), false, false, None);
        assert_eq!(sizes.fr_size.as_deref(), Some("38"));
        assert_eq!(sizes.us_size.as_deref(), Some("28"));
        assert_eq!(sizes.note, None);
    }

    #[test]
    fn test_lone_us_rounds_odd_fr_up_when_requested() {
        let sizes = normalize_sizes(Some("31"), None, false, true, None);
        assert_eq!(sizes.fr_size.as_deref(), Some("42"));
        assert_eq!(sizes.us_size.as_deref(), Some("31"));
        assert_eq!(sizes.note, None);
    }

    #[test]
    fn test_lone_fr_is_trusted_verbatim() {
        let sizes = normalize_sizes(None, Some("37"), false, true, None);
        assert_eq!(sizes.fr_size.as_deref(), Some("37"));
        assert_eq!(sizes.us_size, None);
    }

    #[test]
    fn test_measurement_fallback_without_labels() {
        let sizes = normalize_sizes(None, None, false, true, Some(74.0));
        assert_eq!(sizes.fr_size.as_deref(), Some("40"));
        assert_eq!(sizes.us_size, None);
        let note = sizes.note.unwrap();
        assert!(note.contains("74 cm"));
        assert!(note.starts_with("Taille estimée à partir d'un tour de taille mesuré"));
    }

    #[test]
    fn test_flat_measurement_is_doubled_and_overrides_distant_label() {
        // 30 cm flat -> 60 cm circumference -> FR 34; the US label would give
        // FR 41, more than 4 apart, so the measurement wins outright.
        let sizes = normalize_sizes(Some("31"), None, false, true, Some(30.0));
        assert_eq!(sizes.fr_size.as_deref(), Some("34"));
        assert_eq!(sizes.us_size, None);
        let note = sizes.note.unwrap();
        assert!(note.contains("30 cm"));
        assert!(note.contains("à plat"));
    }

    #[test]
    fn test_measurement_within_gap_keeps_labels() {
        // 74 cm -> FR 40; US 29 -> FR 39, within the gap, labels survive.
        let sizes = normalize_sizes(Some("29"), None, false, true, Some(74.0));
        assert_eq!(sizes.us_size.as_deref(), Some("29"));
        // Odd candidate 39 rounds toward the measurement side (40).
        assert_eq!(sizes.fr_size.as_deref(), Some("40"));
    }

    #[test]
    fn test_adjust_even_rounds_down_when_measurement_sits_below() {
        // 70 cm -> FR 38 (27.56 in + 10 = 37.56 -> 38). US 29 -> 39, odd;
        // the measurement FR 38 sits below, so the candidate rounds down.
        let sizes = normalize_sizes(Some("29"), None, false, true, Some(70.0));
        assert_eq!(sizes.fr_size.as_deref(), Some("38"));
    }

    #[test]
    fn test_compute_fr_rejects_non_positive() {
        assert!(compute_fr_from_waist_measurement(0.0, true).is_none());
        assert!(compute_fr_from_waist_measurement(-5.0, true).is_none());
    }

    #[test]
    fn test_fr_size_from_waist_measurement_wrapper() {
        assert_eq!(fr_size_from_waist_measurement(74.0, true).as_deref(), Some("40"));
        assert_eq!(fr_size_from_waist_measurement(0.0, true), None);
    }

    #[test]
    fn test_estimate_top_size_from_flat_width() {
        let estimate = estimate_fr_top_size(Some(45.0), Some(62.4));
        assert_eq!(estimate.estimated_size.as_deref(), Some("FR 38 (M)"));
        let note = estimate.note.unwrap();
        assert!(note.contains("à plat"));
        assert!(note.contains("45 cm"));
        assert_eq!(
            estimate.length_descriptor.as_deref(),
            Some("Longueur épaule-ourlet ~62cm.")
        );
    }

    #[test]
    fn test_estimate_top_size_accepts_full_circumference() {
        let estimate = estimate_fr_top_size(Some(86.0), None);
        assert_eq!(estimate.estimated_size.as_deref(), Some("FR 36 (S)"));
        assert!(estimate.note.unwrap().contains("86 cm"));
        assert_eq!(estimate.length_descriptor, None);
    }

    #[test]
    fn test_estimate_top_size_rejects_out_of_range() {
        let estimate = estimate_fr_top_size(Some(30.0), None);
        assert_eq!(estimate.estimated_size, None);
        assert!(estimate.note.unwrap().contains("hors de la plage"));

        let estimate = estimate_fr_top_size(Some(140.0), None);
        assert_eq!(estimate.estimated_size, None);
        assert!(estimate.note.is_some());
    }

    #[test]
    fn test_estimate_top_size_without_measurement() {
        let estimate = estimate_fr_top_size(None, Some(60.0));
        assert_eq!(estimate.estimated_size, None);
        assert_eq!(estimate.note, None);
        assert!(estimate.length_descriptor.is_some());
    }
}
