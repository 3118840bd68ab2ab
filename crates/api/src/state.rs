use std::sync::Arc;

use replydesk_db::DbPool;
use replydesk_events::{EventBus, NotificationPort, Notifier};

use crate::config::ServerConfig;
use crate::engine::{
    EffectivenessTracker, KeyedLocks, RecommendationEngine, SharingRegistry, TemplateCatalog,
};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Record store handle.
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    /// In-process event bus; audit persistence subscribes to it.
    pub event_bus: Arc<EventBus>,
    pub catalog: TemplateCatalog,
    pub sharing: SharingRegistry,
    pub tracker: EffectivenessTracker,
    pub recommender: RecommendationEngine,
}

impl AppState {
    /// Wire the template services over `pool`, publishing through `port`.
    pub fn new(
        pool: DbPool,
        config: Arc<ServerConfig>,
        event_bus: Arc<EventBus>,
        port: Arc<dyn NotificationPort>,
    ) -> Self {
        let locks = Arc::new(KeyedLocks::new());
        let notifier = Notifier::new(port, config.publish_timeout());

        let catalog = TemplateCatalog::new(pool.clone(), Arc::clone(&locks));
        let sharing = SharingRegistry::new(pool.clone(), Arc::clone(&locks), notifier.clone());
        let tracker = EffectivenessTracker::new(pool.clone(), locks, notifier.clone());
        let recommender = RecommendationEngine::new(catalog.clone(), tracker.clone(), notifier);

        Self {
            pool,
            config,
            event_bus,
            catalog,
            sharing,
            tracker,
            recommender,
        }
    }
}
