//! Deterministic step-by-step dialogue used when the model is switched off

use inmo_agent_core::{BotReply, ConversationScope, LeadData, Operation, Property, Session, Step};

use crate::lead_service::LeadService;
use crate::property_search::{PropertySearch, SearchCriteria};
use crate::session_service::{ensure_lead_data, get_lead_id, set_lead_id};
use crate::AgentError;

/// Listings shown per guided search
pub const GUIDED_RESULT_LIMIT: usize = 3;

/// Reply plus whether the session must be discarded afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct GuidedTurn {
    pub reply: BotReply,
    pub reset: bool,
}

impl GuidedTurn {
    fn reply(reply: BotReply) -> Self {
        Self { reply, reset: false }
    }

    fn messages<const N: usize>(messages: [&str; N]) -> Self {
        Self::reply(BotReply::new(messages.iter().map(|m| m.to_string()).collect()))
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn parse_operation(text: &str) -> Option<Operation> {
    let t = normalize(text);
    if t.contains("alquiler") || t.contains("alquilar") || t == "alquilo" {
        Some(Operation::Alquiler)
    } else if t.contains("venta") || t.contains("comprar") || t == "compro" {
        Some(Operation::Venta)
    } else {
        None
    }
}

/// Digits only: `1.200`, `1,200` and `usd 1200` all read as 1200
pub fn parse_budget(text: &str) -> Option<f64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    let n: f64 = digits.parse().ok()?;
    (n.is_finite() && n > 0.0).then_some(n)
}

fn is_affirmative(t: &str) -> bool {
    t.starts_with('s') || t.contains("si") || t.contains("sí")
}

fn listing(index: usize, property: &Property) -> String {
    let mut line = format!(
        "**{}. {}**\nZona: {}\nPrecio: {}",
        index + 1,
        property.titulo,
        property.zona,
        property.precio
    );
    if !property.link.is_empty() {
        line.push_str(&format!("\nLink: {}", property.link));
    }
    line
}

fn handoff_summary(data: &LeadData, last_results: &[String]) -> String {
    let operacion = data.operacion.map(|o| o.as_str()).unwrap_or("N/A");
    let zona = data.zona.as_deref().unwrap_or("N/A");
    let budget = data
        .presupuesto_max
        .map(|b| b.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let options = if last_results.is_empty() {
        "N/A".to_string()
    } else {
        last_results.join(", ")
    };
    format!(
        "Operación: {} | Zona: {} | Presupuesto máx: {} | Opciones: {}",
        operacion, zona, budget, options
    )
}

pub struct GuidedDialogue {
    search: PropertySearch,
    leads: LeadService,
}

impl GuidedDialogue {
    pub fn new(search: PropertySearch, leads: LeadService) -> Self {
        Self { search, leads }
    }

    pub async fn handle(
        &self,
        text: &str,
        session: &mut Session,
        scope: &ConversationScope,
    ) -> Result<GuidedTurn, AgentError> {
        let t = normalize(text);

        let turn = match session.step {
            Step::Start => {
                session.step = Step::AskOperation;
                GuidedTurn::messages([
                    "Hola 👋 Soy Inmo24x7, el asistente virtual de la inmobiliaria.",
                    "¿Buscás **comprar** o **alquilar**?",
                ])
            }
            Step::AskOperation => match parse_operation(&t) {
                Some(op) => {
                    ensure_lead_data(session).operacion = Some(op);
                    session.step = Step::AskZone;
                    GuidedTurn::messages([
                        "Genial. ¿En qué **zona/barrio** estás buscando? (Ej: Palermo, Caballito)",
                    ])
                }
                None => GuidedTurn::messages([
                    "¿Me confirmás si es **compra (venta)** o **alquiler**?",
                ]),
            },
            Step::AskZone => {
                let zona = text.trim();
                if zona.chars().count() < 2 {
                    GuidedTurn::messages(["Decime una zona/barrio (por ejemplo: Palermo)."])
                } else {
                    ensure_lead_data(session).zona = Some(zona.to_string());
                    session.step = Step::AskBudget;
                    GuidedTurn::messages([
                        "Perfecto. ¿Cuál es tu **presupuesto máximo**? (solo número, ej: 1200 o 120000)",
                    ])
                }
            }
            Step::AskBudget => match parse_budget(&t) {
                Some(budget) => self.show_results(budget, session, scope).await?,
                None => GuidedTurn::messages([
                    "No llegué a leer el número 😅 ¿Cuál es tu **presupuesto máximo**? Ej: 1200",
                ]),
            },
            Step::ShowResults => {
                if is_affirmative(&t) {
                    self.hand_off(session, scope).await
                } else if t.starts_with('n') {
                    session.step = Step::AskZone;
                    GuidedTurn::messages([
                        "Ok 👍 ¿Querés probar con **otra zona** o con **otro presupuesto**? (escribime cuál)",
                    ])
                } else {
                    GuidedTurn::messages([
                        "Decime **sí** para coordinar visita o **no** para ajustar búsqueda.",
                    ])
                }
            }
            Step::Handoff => GuidedTurn {
                reply: BotReply::new(vec![
                    "Gracias 🙌 Un asesor te va a escribir a la brevedad.".to_string(),
                    "Si querés empezar otra búsqueda, escribí cualquier cosa o /reset.".to_string(),
                ]),
                reset: true,
            },
        };

        tracing::debug!(step = ?session.step, reset = turn.reset, "Guided turn");
        Ok(turn)
    }

    async fn show_results(
        &self,
        budget: f64,
        session: &mut Session,
        scope: &ConversationScope,
    ) -> Result<GuidedTurn, AgentError> {
        let data = ensure_lead_data(session);
        data.presupuesto_max = Some(budget);
        let (Some(operacion), Some(zona)) = (data.operacion, data.zona.clone()) else {
            // Operation or zone lost; ask again from the top
            session.step = Step::AskOperation;
            return Ok(GuidedTurn::messages(["¿Buscás **comprar** o **alquilar**?"]));
        };

        let outcome = self
            .search
            .search(&SearchCriteria {
                tenant_id: scope.tenant_id.clone(),
                operacion,
                zona: zona.clone(),
                presupuesto_max: budget,
                limit: GUIDED_RESULT_LIMIT,
            })
            .await?;

        session.step = Step::ShowResults;
        session.last_results = outcome.results.iter().map(|p| p.id.clone()).collect();

        if outcome.results.is_empty() {
            return Ok(GuidedTurn::reply(BotReply::new(vec![
                format!(
                    "Con **{}**, zona **{}** y presupuesto **{}**, no encontré opciones disponibles ahora.",
                    operacion, zona, budget
                ),
                "¿Querés que probemos con otra zona o ajustamos el presupuesto?".to_string(),
            ])));
        }

        let header = if outcome.properties_within_budget == 0 {
            format!(
                "Ninguna entra en tu presupuesto de **{}**, pero estas son las opciones más cercanas 👇",
                budget
            )
        } else {
            "Encontré estas opciones disponibles 👇".to_string()
        };

        let mut messages = vec![header];
        messages.extend(outcome.results.iter().enumerate().map(|(i, p)| listing(i, p)));
        messages.push(
            "¿Querés que te ponga en contacto con un asesor para coordinar visita? (sí/no)"
                .to_string(),
        );
        Ok(GuidedTurn::reply(BotReply::new(messages)))
    }

    async fn hand_off(&self, session: &mut Session, scope: &ConversationScope) -> GuidedTurn {
        session.step = Step::Handoff;
        let data = ensure_lead_data(session).clone();
        let summary = handoff_summary(&data, &session.last_results);

        // Lead persistence never blocks the handoff reply
        match self
            .leads
            .load_or_create_lead(scope, &data, get_lead_id(session))
            .await
        {
            Ok(Some(id)) => {
                set_lead_id(session, id);
                if let Err(e) = self
                    .leads
                    .update_lead_data(id, &scope.tenant_id, &LeadData::default(), Some(&summary))
                    .await
                {
                    tracing::warn!(lead_id = id, error = %e, "Failed to store handoff summary");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to create lead on handoff"),
        }

        GuidedTurn::reply(
            BotReply::new(vec![
                "Perfecto ✅ Te paso con un asesor humano para coordinar la visita.".to_string(),
                "¿Me compartís tu **nombre** y un **teléfono** de contacto?".to_string(),
            ])
            .with_handoff(summary),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inmo_agent_core::SourceType;
    use inmo_agent_persistence::{InMemoryLeadStore, InMemoryPropertyCatalog, LeadStore};
    use std::sync::Arc;

    #[test]
    fn test_parse_operation() {
        assert_eq!(parse_operation("Quiero ALQUILAR"), Some(Operation::Alquiler));
        assert_eq!(parse_operation(" alquilo "), Some(Operation::Alquiler));
        assert_eq!(parse_operation("busco comprar"), Some(Operation::Venta));
        assert_eq!(parse_operation("compro"), Some(Operation::Venta));
        assert_eq!(parse_operation("hola"), None);
    }

    #[test]
    fn test_parse_budget() {
        assert_eq!(parse_budget("1.200"), Some(1200.0));
        assert_eq!(parse_budget("usd 1,200"), Some(1200.0));
        assert_eq!(parse_budget("120000"), Some(120_000.0));
        assert_eq!(parse_budget("0"), None);
        assert_eq!(parse_budget("mucho"), None);
    }

    #[tokio::test]
    async fn test_full_guided_flow() {
        let catalog = InMemoryPropertyCatalog::new();
        catalog.load(
            "t1",
            vec![
                Property::new("A", Operation::Alquiler, "Palermo", 900.0, "PH Palermo")
                    .with_link("https://example.com/a"),
                Property::new("B", Operation::Alquiler, "Palermo", 1100.0, "Depto Palermo"),
            ],
        );
        let leads = Arc::new(InMemoryLeadStore::new());
        let dialogue = GuidedDialogue::new(
            PropertySearch::new(Arc::new(catalog)),
            LeadService::new(leads.clone()),
        );
        let scope = ConversationScope::new("v1", "t1", SourceType::WebChat);
        let mut session = Session::default();

        let turn = dialogue.handle("hola", &mut session, &scope).await.unwrap();
        assert_eq!(turn.reply.messages.len(), 2);
        assert_eq!(session.step, Step::AskOperation);

        dialogue.handle("no sé", &mut session, &scope).await.unwrap();
        assert_eq!(session.step, Step::AskOperation);

        dialogue.handle("quiero alquilar", &mut session, &scope).await.unwrap();
        dialogue.handle("Palermo", &mut session, &scope).await.unwrap();
        assert_eq!(session.step, Step::AskBudget);

        let turn = dialogue.handle("1.000", &mut session, &scope).await.unwrap();
        assert_eq!(session.step, Step::ShowResults);
        assert_eq!(session.last_results, vec!["A", "B"]);
        assert_eq!(turn.reply.messages[0], "Encontré estas opciones disponibles 👇");
        assert_eq!(
            turn.reply.messages[1],
            "**1. PH Palermo**\nZona: Palermo\nPrecio: 900\nLink: https://example.com/a"
        );

        let turn = dialogue.handle("sí", &mut session, &scope).await.unwrap();
        assert_eq!(session.step, Step::Handoff);
        assert_eq!(
            turn.reply.handoff.unwrap().summary,
            "Operación: alquiler | Zona: Palermo | Presupuesto máx: 1000 | Opciones: A, B"
        );
        let lead = leads.get(1, "t1").await.unwrap().unwrap();
        assert!(lead.is_handed_off());

        let turn = dialogue.handle("Ana 1122", &mut session, &scope).await.unwrap();
        assert!(turn.reset);
    }

    #[tokio::test]
    async fn test_no_results_and_over_budget_header() {
        let catalog = InMemoryPropertyCatalog::new();
        catalog.load(
            "t1",
            vec![Property::new("C", Operation::Venta, "Belgrano", 500_000.0, "Depto")],
        );
        let dialogue = GuidedDialogue::new(
            PropertySearch::new(Arc::new(catalog)),
            LeadService::new(Arc::new(InMemoryLeadStore::new())),
        );
        let scope = ConversationScope::new("v1", "t1", SourceType::WebChat);

        let mut session = Session {
            step: Step::AskBudget,
            data: Some(LeadData {
                operacion: Some(Operation::Venta),
                zona: Some("Caballito".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let turn = dialogue.handle("100000", &mut session, &scope).await.unwrap();
        assert!(turn.reply.messages[0].contains("no encontré opciones"));

        session.step = Step::AskBudget;
        ensure_lead_data(&mut session).zona = Some("Belgrano".into());
        let turn = dialogue.handle("100000", &mut session, &scope).await.unwrap();
        assert!(turn.reply.messages[0].starts_with("Ninguna entra en tu presupuesto"));

        dialogue.handle("no", &mut session, &scope).await.unwrap();
        assert_eq!(session.step, Step::AskZone);
    }
}
