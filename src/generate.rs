//! End-to-end listing generation: model call, validation, overrides, render.

use serde_json::Value;

use crate::classifier::infer_template;
use crate::error::{FieldsError, GenerateError};
use crate::fields::{validate_sku, ListingFields};
use crate::llm::{CompletionRequest, LlmProvider};
use crate::overrides::{resolve_overrides, UserOverrides};
use crate::templates::{get_template, knitwear_sku_recovery_prompt, TEMPLATE_DENIM, TEMPLATE_KNITWEAR};

const SYSTEM_PROMPT: &str = "Tu es un assistant vendeur Vinted. Analyse les photos fournies, \
identifie les caractéristiques importantes (taille, couleur, défauts) et renvoie les champs \
structurés demandés.";

const MAX_COMPLETION_TOKENS: u32 = 900;
const MAX_RECOVERY_TOKENS: u32 = 30;

/// Caller knobs for a generation request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions<'a> {
    /// Template name; `None` asks the classifier.
    pub template: Option<&'a str>,
    pub fr_size_override: Option<&'a str>,
    pub us_size_override: Option<&'a str>,
    pub manual_sku: Option<&'a str>,
}

/// Final output handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingResult {
    pub title: String,
    pub description: String,
    pub price_estimate: Option<String>,
    /// No SKU could be read or recovered; the caller decides what to do.
    pub sku_missing: bool,
}

/// Generate a listing from product photos and an optional seller comment.
pub async fn generate_listing(
    provider: &dyn LlmProvider,
    images: &[String],
    comment: &str,
    options: &GenerateOptions<'_>,
) -> Result<ListingResult, GenerateError> {
    let template_name = match options.template {
        Some(name) => name,
        None => infer_template(images, comment)?,
    };
    let template = get_template(template_name)?;
    tracing::info!(template = template_name, "génération d'annonce");

    let mut prompt = template.prompt();
    let comment = comment.trim();
    if !comment.is_empty() {
        prompt.push_str(&format!(
            "\n\nCommentaires utilisateur (tailles/défauts) : {}",
            comment
        ));
    }

    let raw = provider
        .complete(CompletionRequest {
            system: Some(SYSTEM_PROMPT),
            prompt: &prompt,
            images,
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: 0.2,
        })
        .await?;
    if raw.trim().is_empty() {
        return Err(GenerateError::EmptyModelOutput);
    }

    let payload = parse_json_payload(&raw)?;
    let fields_value = payload
        .get("fields")
        .ok_or_else(|| GenerateError::json_parse(&raw))?;

    let mut fields = parse_fields(fields_value, template_name)?;

    if template_name == TEMPLATE_KNITWEAR && fields.sku_missing() && options.manual_sku.is_none() {
        fields.sku = recover_knitwear_sku(provider, images).await;
    }

    let fields = resolve_overrides(
        &fields,
        &UserOverrides {
            comment,
            manual_sku: options.manual_sku,
            fr_size: options.fr_size_override,
            us_size: options.us_size_override,
        },
    );

    let rendered = template.render(&fields);
    let sku_missing = fields.sku_missing();
    if sku_missing {
        tracing::warn!("annonce générée sans SKU lisible");
    }

    Ok(ListingResult {
        title: rendered.title,
        description: rendered.description,
        price_estimate: rendered.price_estimate,
        sku_missing,
    })
}

/// Validate the raw fields, with the single sanctioned recovery: a denim
/// payload whose SKU fails validation is retried once with the SKU blanked.
fn parse_fields(fields_value: &Value, template_name: &str) -> Result<ListingFields, GenerateError> {
    match ListingFields::from_value(fields_value, template_name) {
        Ok(fields) => Ok(fields),
        Err(FieldsError::InvalidSku { sku, .. }) if template_name == TEMPLATE_DENIM => {
            tracing::warn!(sku = %sku, "SKU invalide, nouvelle validation sans SKU");
            let mut sanitized = fields_value.clone();
            sanitized["sku"] = Value::String(String::new());
            Ok(ListingFields::from_value(&sanitized, template_name)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// One follow-up call asking only for the PTF code; best effort, an empty SKU
/// simply stays empty.
async fn recover_knitwear_sku(provider: &dyn LlmProvider, images: &[String]) -> String {
    let prompt = knitwear_sku_recovery_prompt();
    let reply = provider
        .complete(CompletionRequest {
            system: None,
            prompt: &prompt,
            images,
            max_tokens: MAX_RECOVERY_TOKENS,
            temperature: 0.0,
        })
        .await;

    match reply {
        Ok(text) => {
            let candidate = text.trim().trim_matches(['"', '`', '\'']).trim().to_string();
            if !candidate.is_empty()
                && validate_sku(&candidate, "", TEMPLATE_KNITWEAR).is_ok()
            {
                tracing::info!(sku = %candidate, "SKU récupéré via appel dédié");
                candidate
            } else {
                tracing::warn!(reply = %candidate, "récupération de SKU sans résultat exploitable");
                String::new()
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "échec de l'appel de récupération du SKU");
            String::new()
        }
    }
}

/// Strip Markdown code fencing and parse the first JSON object of the text.
fn parse_json_payload(raw: &str) -> Result<Value, GenerateError> {
    let unfenced = strip_code_fences(raw);
    let start = unfenced.find('{');
    let end = unfenced.rfind('}');
    let candidate = match (start, end) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => return Err(GenerateError::json_parse(raw)),
    };
    serde_json::from_str(candidate).map_err(|_| GenerateError::json_parse(raw))
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_json_payload_ignores_surrounding_prose() {
        let raw = "Voici le résultat :\n{\"fields\": {\"model\": \"501\"}}\nmerci";
        let payload = parse_json_payload(raw).unwrap();
        assert_eq!(payload["fields"]["model"], "501");
    }

    #[test]
    fn test_parse_json_payload_reports_snippet() {
        let err = parse_json_payload("pas de json ici").unwrap_err();
        match err {
            GenerateError::JsonParse { snippet } => assert!(snippet.contains("pas de json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
