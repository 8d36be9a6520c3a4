pub mod classifier;
pub mod defects;
pub mod error;
pub mod fields;
pub mod generate;
pub mod llm;
pub mod overrides;
pub mod replies;
pub mod sizing;
pub mod templates;
pub mod text;

pub use classifier::infer_template;
pub use defects::{get_defect_descriptions, known_defect_slugs};
pub use error::{FieldsError, GenerateError, TemplateError};
pub use fields::ListingFields;
pub use generate::{generate_listing, GenerateOptions, ListingResult};
pub use llm::{
    provider_from_env, CompletionRequest, FakeProvider, GeminiProvider, LlmError, LlmProvider,
    OpenAiProvider,
};
pub use overrides::{resolve_overrides, UserOverrides};
pub use replies::{build_reply_prompt, generate_reply, ReplyError, ReplyPayload};
pub use sizing::{estimate_fr_top_size, fr_size_from_waist_measurement, normalize_sizes, NormalizedSizes};
pub use templates::{
    available_templates, get_prompt, get_template, render_template, ListingTemplate,
    RenderedListing, DEFAULT_TEMPLATE, TEMPLATE_DENIM, TEMPLATE_FLEECE, TEMPLATE_KNITWEAR,
};
