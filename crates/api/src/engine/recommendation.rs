//! Ranks catalog templates against a support ticket.

use chrono::{Local, Timelike};
use replydesk_core::error::CoreError;
use replydesk_core::recommendation::{
    rank, reason, score, ticket_words, Candidate, TicketContext, TicketSnapshot,
};
use replydesk_db::models::template::{Template, TemplateFilter};
use replydesk_events::{Notifier, PlatformEvent, RecommendationSummary, TemplateEvent};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::{EffectivenessTracker, TemplateCatalog};

/// Templates scored between cancellation checks that also yield.
const SCAN_CHUNK: usize = 64;

/// One ranked suggestion. Computed per request, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub template: Template,
    pub score: f64,
    pub reason: String,
}

/// Read-mostly scorer over the catalog and usage statistics.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: TemplateCatalog,
    tracker: EffectivenessTracker,
    notifier: Notifier,
}

impl RecommendationEngine {
    pub fn new(catalog: TemplateCatalog, tracker: EffectivenessTracker, notifier: Notifier) -> Self {
        Self {
            catalog,
            tracker,
            notifier,
        }
    }

    /// Best templates for `ticket`, at most five, best first.
    ///
    /// Cancelling `cancel` abandons the scan and returns
    /// [`CoreError::Cancelled`]; no partial ranking is published or returned.
    pub async fn recommend(
        &self,
        ticket: &TicketSnapshot,
        cancel: &CancellationToken,
    ) -> Result<Vec<Recommendation>, CoreError> {
        self.recommend_at_hour(ticket, Local::now().hour(), cancel)
            .await
    }

    /// [`recommend`](Self::recommend) with an explicit local clock hour.
    pub async fn recommend_at_hour(
        &self,
        ticket: &TicketSnapshot,
        local_hour: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Recommendation>, CoreError> {
        let ctx = TicketContext::from_ticket(ticket, local_hour);
        let everything = TemplateFilter::default();

        let loaded = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Cancelled),
            loaded = async {
                tokio::try_join!(
                    self.catalog.list(&everything),
                    self.tracker.all_stats(),
                )
            } => loaded,
        };
        let (templates, stats) = loaded?;

        let words = ticket_words(ticket);
        let mut scored = Vec::with_capacity(templates.len());
        for (i, template) in templates.into_iter().enumerate() {
            if i % SCAN_CHUNK == 0 {
                tokio::task::yield_now().await;
                if cancel.is_cancelled() {
                    return Err(CoreError::Cancelled);
                }
            }
            let usage_count = stats.get(&template.id).map_or(0, |s| s.usage_count);
            let candidate = Candidate {
                category: &template.category,
                tags: &template.tags,
                usage_count,
            };
            let s = score(&candidate, &ctx, &words);
            let why = reason(&candidate, &ctx, &s);
            scored.push(((template, why), s.value));
        }
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let recommendations: Vec<Recommendation> = rank(scored)
            .into_iter()
            .map(|((template, reason), score)| Recommendation {
                template,
                score,
                reason,
            })
            .collect();

        tracing::debug!(
            ticket_id = %ticket.id,
            count = recommendations.len(),
            "Recommendations computed"
        );
        self.notifier
            .notify(PlatformEvent::new(TemplateEvent::Recommendations {
                ticket_id: ticket.id.clone(),
                time_of_day: ctx.time_of_day,
                recommendations: recommendations
                    .iter()
                    .map(|r| RecommendationSummary {
                        template_id: r.template.id,
                        score: r.score,
                        reason: r.reason.clone(),
                    })
                    .collect(),
            }))
            .await;

        Ok(recommendations)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
