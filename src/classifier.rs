//! Keyword heuristic picking a listing template when the caller asks for
//! automatic selection.
//!
//! Scoring is deliberately crude: case-insensitive substring counts over the
//! user comment and over each image's encoded payload. A tie, including 0-0,
//! is an error — the seller picks manually rather than trusting a coin flip.

use crate::error::TemplateError;
use crate::templates::{TEMPLATE_DENIM, TEMPLATE_KNITWEAR};

const DENIM_KEYWORDS: &[&str] = &[
    "levis", "levi's", "levi’s", "501", "505", "jean", "denim", "rivets",
];

const KNITWEAR_KEYWORDS: &[&str] = &[
    "tommy", "hilfiger", "pull", "sweater", "mariniere", "tricot", "knit",
];

const DENIM_IMAGE_TOKENS: &[&str] = &["levis", "denim", "redtab", "rivets"];

const KNITWEAR_IMAGE_TOKENS: &[&str] = &["tommy", "hilfiger", "flag", "knit"];

fn score_text(content: &str, keywords: &[&str]) -> usize {
    let normalized = content.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| !keyword.is_empty() && normalized.contains(*keyword))
        .count()
}

fn score_images(encoded_images: &[String], tokens: &[&str]) -> usize {
    encoded_images
        .iter()
        .filter(|image| !image.is_empty())
        .map(|image| score_text(image, tokens))
        .sum()
}

/// Return the template name inferred from the images and the user comment.
pub fn infer_template(encoded_images: &[String], user_comment: &str) -> Result<&'static str, TemplateError> {
    let comment = user_comment.trim();
    let denim_score =
        score_text(comment, DENIM_KEYWORDS) + score_images(encoded_images, DENIM_IMAGE_TOKENS);
    let knitwear_score = score_text(comment, KNITWEAR_KEYWORDS)
        + score_images(encoded_images, KNITWEAR_IMAGE_TOKENS);

    tracing::debug!(denim_score, knitwear_score, "scores de classification");

    if denim_score > knitwear_score {
        Ok(TEMPLATE_DENIM)
    } else if knitwear_score > denim_score {
        Ok(TEMPLATE_KNITWEAR)
    } else {
        Err(TemplateError::AmbiguousClassification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denim_comment_selects_denim_template() {
        let name = infer_template(&[], "Jean Levi's 501").unwrap();
        assert_eq!(name, TEMPLATE_DENIM);
    }

    #[test]
    fn test_knitwear_comment_selects_knitwear_template() {
        let name = infer_template(&[], "Pull Tommy Hilfiger tricot").unwrap();
        assert_eq!(name, TEMPLATE_KNITWEAR);
    }

    #[test]
    fn test_image_payload_tokens_count() {
        let images = vec!["....levis....denim....".to_string()];
        let name = infer_template(&images, "").unwrap();
        assert_eq!(name, TEMPLATE_DENIM);
    }

    #[test]
    fn test_tied_scores_raise_ambiguous_error() {
        let err = infer_template(&[], "").unwrap_err();
        assert!(matches!(err, TemplateError::AmbiguousClassification));

        // One keyword on each side is still a tie.
        let err = infer_template(&[], "pull en denim").unwrap_err();
        assert!(matches!(err, TemplateError::AmbiguousClassification));
    }
}
