//! Customer-reply generation: a single-pass prompt over a static scenario
//! table, with no structured extraction.

use thiserror::Error;

use crate::llm::{CompletionRequest, LlmProvider};

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("Scénario inconnu: {0}")]
    UnknownScenario(String),

    #[error("Aucune réponse textuelle n'a été renvoyée par le modèle. Merci de réessayer.")]
    EmptyReply,

    #[error(transparent)]
    Llm(#[from] crate::llm::LlmError),
}

/// Article wording injected into the reply prompt.
#[derive(Debug, Clone, Copy)]
pub struct ArticleType {
    pub id: &'static str,
    pub label: &'static str,
}

pub const ARTICLE_TYPES: &[ArticleType] = &[
    ArticleType { id: "jean_levis", label: "Jean Levi's" },
    ArticleType { id: "pull_tommy", label: "Pull Tommy Hilfiger" },
    ArticleType { id: "polaire_tnf", label: "Polaire The North Face" },
    ArticleType { id: "polaire_columbia", label: "Polaire Columbia" },
    ArticleType { id: "autre", label: "Autre article" },
];

/// A predefined reply scenario with its writing rules.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub id: &'static str,
    pub label: &'static str,
    pub rules: &'static [&'static str],
    pub examples: &'static [&'static str],
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "remercier_achat",
        label: "Remercier pour un achat",
        rules: &[
            "Remercier clairement pour l'achat.",
            "Mentionner la préparation rapide et l'envoi du suivi.",
            "Glisser une invitation légère à visiter le dressing.",
            "Ton chaleureux mais concis (2–3 phrases).",
        ],
        examples: &[],
    },
    Scenario {
        id: "remercier_avis",
        label: "Remercier pour un avis",
        rules: &[
            "Remercier pour l'avis laissé.",
            "Souligner que le feedback aide à améliorer le service.",
            "Rester bref et positif (1–2 phrases).",
        ],
        examples: &[],
    },
    Scenario {
        id: "remercier_favori",
        label: "Remercier pour l'ajout en favori",
        rules: &[
            "Remercier pour l'ajout en favori.",
            "Mentionner que l'article est disponible pour le moment.",
            "Inviter discrètement à finaliser ou poser une question.",
        ],
        examples: &[],
    },
    Scenario {
        id: "inciter_achat",
        label: "Inciter à l'achat",
        rules: &[
            "Mettre en avant la disponibilité actuelle et l'envoi rapide.",
            "Créer un léger sentiment d'urgence sans être agressif.",
            "Conclure par une invitation à passer commande et à regarder le dressing.",
        ],
        examples: &[],
    },
    Scenario {
        id: "inciter_lot",
        label: "Inciter à faire un lot",
        rules: &[
            "Proposer de regrouper plusieurs articles pour un envoi unique.",
            "Suggérer un avantage tarifaire ou frais de port optimisé.",
            "Ton convivial et orienté solution, en invitant à explorer le dressing.",
        ],
        examples: &[],
    },
    Scenario {
        id: "negocier_plus_haut",
        label: "Négocier un prix plus haut",
        rules: &[
            "Remercier pour l'intérêt ou l'offre.",
            "Expliquer que la proposition est trop basse au regard de la qualité.",
            "Proposer un montant révisé (contre-offre) clair et valoriser l'article.",
            "Utiliser exactement la contre-offre fournie (montant inchangé).",
            "Mentionner l'envoi rapide et encourager à valider ou regarder le dressing.",
        ],
        examples: &[],
    },
    Scenario {
        id: "negocier_reservation",
        label: "Négocier une demande de réservation",
        rules: &[
            "Remercier pour l'intérêt et la demande de réservation.",
            "Expliquer que la plateforme ne permet pas de réserver en amont.",
            "Proposer une alternative (achat direct, lot ou délai court) sans mentionner de prix.",
            "Ton courtois, ferme mais encourageant, en invitant à valider rapidement.",
        ],
        examples: &[
            "Bonjour,\nMerci pour votre message ! Malheureusement Vinted ne permet pas de réserver ces produits à l'avance, mais vous pouvez le valider dès maintenant.\nSi malgré tout ce jean vous intéresse et qu'il est toujours disponible jeudi, il sera toujours là pour vous.",
        ],
    },
    Scenario {
        id: "negocier_prix_ferme",
        label: "Prix ferme (pas de négociation)",
        rules: &[
            "Remercier pour l'intérêt.",
            "Indiquer que le prix est ferme en justifiant brièvement (état, modèle).",
            "Reprendre exactement le prix ferme saisi (sans le modifier).",
            "Rester courtois et concis, en rappelant l'envoi rapide et le dressing.",
        ],
        examples: &[],
    },
    Scenario {
        id: "informer_preparation",
        label: "Préparation du colis (paiement validé)",
        rules: &[
            "Confirmer la validation du paiement et la préparation en cours.",
            "Partager le délai ou la promesse d'envoi.",
            "Ton rassurant, 2 phrases max, avec un clin d'œil convivial.",
        ],
        examples: &[],
    },
    Scenario {
        id: "informer_envoi",
        label: "Envoi du colis",
        rules: &[
            "Indiquer que le colis vient d'être déposé ou scanné.",
            "Préciser que le suivi est partagé/à jour.",
            "Rester bref et pro, en gardant un ton chaleureux.",
        ],
        examples: &[],
    },
    Scenario {
        id: "informer_livraison",
        label: "Livraison du colis",
        rules: &[
            "Informer que le colis est indiqué livré ou disponible en point relais.",
            "Inviter à confirmer la bonne réception ou à signaler un souci.",
            "Proposer de laisser un avis si tout est conforme.",
        ],
        examples: &[],
    },
];

const STYLE_RULES: &[&str] = &[
    "Réponds en français avec un ton courtois, professionnel, fun, avenant et convivial.",
    "Inclure au moins deux émojis ou smileys répartis dans la réponse.",
    "Rédiger entre 1 et 4 phrases maximum, sans puces ni listes.",
    "Ne rien promettre d'irréaliste ; tu peux mentionner un envoi rapide si pertinent.",
];

const REPLY_SYSTEM_PROMPT: &str = "Tu es un vendeur professionnel Vinted (Durin31). Tu réponds en \
français avec un ton courtois, professionnel, fun, avenant et convivial. Ta réponse doit contenir \
au moins deux émojis, rester concise (1 à 4 phrases), sans puces ni numéros, et orientée client. \
Tu ne promets rien que tu ne puisses tenir.";

/// Inputs for a customer reply.
#[derive(Debug, Clone, Default)]
pub struct ReplyPayload {
    pub client_name: String,
    pub article_type: String,
    pub scenario_id: String,
    pub client_message: String,
    pub offre_client: Option<f64>,
    pub contre_offre: Option<f64>,
    pub prix_ferme: Option<f64>,
}

fn article_label(article_type: &str) -> &str {
    ARTICLE_TYPES
        .iter()
        .find(|article| article.id == article_type)
        .map(|article| article.label)
        .unwrap_or(if article_type.is_empty() {
            "Article"
        } else {
            article_type
        })
}

fn find_scenario(id: &str) -> Result<&'static Scenario, ReplyError> {
    SCENARIOS
        .iter()
        .find(|scenario| scenario.id == id)
        .ok_or_else(|| ReplyError::UnknownScenario(id.to_string()))
}

/// Build the single-pass reply prompt for a scenario.
pub fn build_reply_prompt(payload: &ReplyPayload) -> Result<String, ReplyError> {
    let scenario = find_scenario(&payload.scenario_id)?;
    let article = article_label(&payload.article_type);

    let mut context = vec![
        format!("Client: {}", payload.client_name),
        format!("Scénario: {}", scenario.label),
        format!("Article: {}", article),
    ];
    if !payload.client_message.trim().is_empty() {
        context.push(format!("Message client: {}", payload.client_message.trim()));
    }

    let mut price_details = Vec::new();
    if let Some(offer) = payload.offre_client {
        price_details.push(format!("Offre client: {}€", offer));
    }
    if let Some(counter) = payload.contre_offre {
        price_details.push(format!("Votre proposition: {}€", counter));
    }
    if let Some(firm) = payload.prix_ferme {
        price_details.push(format!("Prix ferme: {}€", firm));
    }
    if !price_details.is_empty() {
        context.push(price_details.join(" / "));
    }

    let mut rules: Vec<String> = scenario.rules.iter().map(|r| r.to_string()).collect();
    rules.push("Varier l'accroche et la conclusion pour éviter les formules toutes faites.".to_string());
    rules.push(format!(
        "Citer l'article ({}) pour ancrer la réponse et éviter les messages génériques.",
        article
    ));
    rules.push(
        "Ne pas répéter deux fois la même formule (remerciements ou invitation) dans le message."
            .to_string(),
    );
    if !price_details.is_empty() {
        rules.push(
            "Expliquer en une phrase pourquoi le prix proposé est cohérent (qualité, état, demande)."
                .to_string(),
        );
    }
    if !payload.client_message.trim().is_empty() {
        rules.push(
            "Réagir brièvement au message du client pour montrer que sa demande a été comprise."
                .to_string(),
        );
    }
    rules.extend(STYLE_RULES.iter().map(|r| r.to_string()));

    let mut prompt = format!(
        "Contexte client et article:\n{}\n\nRègles spécifiques:\n- {}",
        context.join("\n"),
        rules.join("\n- ")
    );
    if !scenario.examples.is_empty() {
        prompt.push_str(&format!(
            "\n\nExemples de réponse:\n- {}",
            scenario.examples.join("\n- ")
        ));
    }
    prompt.push_str("\n\nRédige la réponse finale en suivant le ton Durin31.");
    Ok(prompt)
}

/// Generate a customer reply through the provider.
pub async fn generate_reply(
    provider: &dyn LlmProvider,
    payload: &ReplyPayload,
) -> Result<String, ReplyError> {
    let prompt = build_reply_prompt(payload)?;
    tracing::debug!(scenario = %payload.scenario_id, "génération d'une réponse client");

    let reply = provider
        .complete(CompletionRequest {
            system: Some(REPLY_SYSTEM_PROMPT),
            prompt: &prompt,
            images: &[],
            max_tokens: 260,
            temperature: 0.5,
        })
        .await?;

    let reply = reply.trim().to_string();
    if reply.is_empty() {
        return Err(ReplyError::EmptyReply);
    }
    Ok(reply)
}
