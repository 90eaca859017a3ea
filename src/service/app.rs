//! Application state: every service wired from one configuration

use crate::config::{validate_config, AppConfig};
use crate::delivery::Delivery;
use crate::metrics::MetricsCollector;
use crate::ranking::RankedUserStore;
use crate::service::leaderboard::LeaderboardService;
use crate::service::rank::RankService;
use crate::service::reply::{CardCollaborators, ReplySender};
use crate::service::stats::StatsService;
use crate::stats::StatsSessions;
use crate::storage::{SqliteStatsSource, StatsSource};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Shared handles for every trigger handler
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub metrics: Arc<MetricsCollector>,
    pub store: RankedUserStore,
    pub leaderboard: LeaderboardService,
    pub ranks: RankService,
    pub stats: StatsService,
}

impl AppState {
    /// Wire services around an explicit source and delivery
    pub fn new(
        config: AppConfig,
        source: Arc<dyn StatsSource>,
        delivery: Arc<dyn Delivery>,
        cards: Option<CardCollaborators>,
    ) -> Result<Self> {
        validate_config(&config)?;

        let metrics = Arc::new(MetricsCollector::new()?);
        let store = RankedUserStore::new(source.clone(), metrics.clone())
            .with_fetch_limit(config.leaderboard.fetch_limit);
        let replies = ReplySender::new(delivery, cards, metrics.clone());

        let leaderboard =
            LeaderboardService::new(store.clone(), replies.clone(), config.leaderboard.per_page);
        let ranks = RankService::new(store.clone(), replies.clone());
        let stats = StatsService::new(source, Arc::new(StatsSessions::new()), replies);

        Ok(Self {
            config,
            metrics,
            store,
            leaderboard,
            ranks,
            stats,
        })
    }

    /// Wire services around the SQLite database named in `config`
    pub fn with_sqlite(config: AppConfig, delivery: Arc<dyn Delivery>) -> Result<Self> {
        let source = SqliteStatsSource::new(
            &config.database.path,
            config.database_timeout(),
            config.database.storage_quota_mb,
        );
        info!("Reading stats from {}", source.path().display());
        Self::new(config, Arc::new(source), delivery, None)
    }
}
