use thiserror::Error;

use crate::llm::LlmError;

/// Errors raised while validating the raw model payload into [`crate::ListingFields`].
#[derive(Error, Debug)]
pub enum FieldsError {
    #[error("Champs manquants dans la réponse JSON: {0}")]
    MissingFields(String),

    #[error("Type de valeur inattendu pour le champ '{field}'")]
    UnexpectedType { field: String },

    #[error("Tag de défaut inconnu: {0}")]
    UnknownDefectTag(String),

    #[error("SKU invalide '{sku}': {reason}")]
    InvalidSku { sku: String, reason: String },
}

/// Errors raised by the template registry and classifier.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template inconnu: {0}")]
    UnknownTemplate(String),

    #[error("Classification automatique incertaine : sélectionnez manuellement un modèle.")]
    AmbiguousClassification,
}

/// Errors raised by the end-to-end listing generation pipeline.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Le modèle n'a renvoyé aucun texte exploitable")]
    EmptyModelOutput,

    #[error("Réponse JSON invalide: {snippet}")]
    JsonParse { snippet: String },

    #[error(transparent)]
    Fields(#[from] FieldsError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl GenerateError {
    /// Build a parse error carrying a truncated snippet of the offending text.
    pub(crate) fn json_parse(raw: &str) -> Self {
        const MAX_SNIPPET: usize = 200;
        let snippet: String = raw.chars().take(MAX_SNIPPET).collect();
        GenerateError::JsonParse { snippet }
    }
}
