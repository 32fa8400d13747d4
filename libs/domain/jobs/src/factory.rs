// [libs/domain/jobs/src/factory.rs]
//! `JobFactory`: produces batches of `Job`s, claiming leases from the store
//! where the stage has a persisted backlog (stages 2 and 3); stage 1 has no
//! backlog to claim since the ladder is external state, so its variant
//! simply emits the configured set of first-page jobs once.
//!
//! The set of factories is closed (one per pipeline stage), so this is a
//! tagged enum dispatched by `match` rather than a trait object — the same
//! shape used for `JobKind` itself.
//!
//! Grounded on `execution/query_job.py::BaseJobFactory`/`refill_queue` for
//! the `produce() -> Vec<Job>` contract, and on `query_match.py::JobFactory`
//! for the "claim batch, wrap each claimed id in a job" shape.

use chrono::Duration;

use collector_domain_models::{Platform, Region, Route};
use collector_infra_db::{DbError, LeaseStore};

use crate::job::{lookback_cutoff, Job, JobKind};

/// Stage 1: emits one job per `(queue, tier, division)` combination at
/// `page = 1`; exhausted after its single call (pagination from there on is
/// driven entirely by `Job::next`, not by re-claiming from this variant).
pub struct LadderJobFactory {
    platform: Platform,
    combos: Vec<(String, String, String)>,
    produced: bool,
}

impl LadderJobFactory {
    pub fn new(platform: Platform, queues: &[&str], tiers: &[&str], divisions: &[&str]) -> Self {
        let mut combos = Vec::new();
        for queue in queues {
            for tier in tiers {
                for division in divisions {
                    combos.push((queue.to_string(), tier.to_string(), division.to_string()));
                }
            }
        }
        Self { platform, combos, produced: false }
    }

    fn produce(&mut self) -> Vec<Job> {
        if self.produced {
            return Vec::new();
        }
        self.produced = true;

        let route = Route::from(self.platform);
        self.combos
            .iter()
            .map(|(queue, tier, division)| {
                Job::new(
                    route,
                    JobKind::EnumerateLadder {
                        queue: queue.clone(),
                        tier: tier.clone(),
                        division: division.clone(),
                        page: 1,
                    },
                )
            })
            .collect()
    }
}

/// Stage 2: claims a batch of `users` rows whose match-id listing is stale
/// and whose lease has expired, and wraps each `puuid` in a job.
///
/// `users.platform_name` is the claim key (the ladder is per-platform), but
/// the `ListMatchIds` endpoint is region-routed, so one factory covers every
/// platform that aggregates into its `region` and claims from each in turn
/// until `batch_size` is reached. This lets stage 2 run one queue/worker
/// pool per region (matching `WORKERS_PER_REGION`) instead of per platform,
/// at the cost of favoring earlier platforms in the list when a single
/// `produce()` call is batch-size-limited across several of them; row-level
/// fairness within each platform is unaffected since `claim_users` still
/// orders by `lease_until`.
pub struct MatchIdsJobFactory {
    store: LeaseStore,
    region: Region,
    platforms: Vec<Platform>,
    batch_size: u32,
    lease_duration: Duration,
    matches_per_page: u32,
}

impl MatchIdsJobFactory {
    pub fn new(store: LeaseStore, region: Region, platforms: Vec<Platform>, batch_size: u32, lease_duration: Duration, matches_per_page: u32) -> Self {
        Self {
            store,
            region,
            platforms,
            batch_size,
            lease_duration,
            matches_per_page,
        }
    }

    async fn produce(&mut self) -> Result<Vec<Job>, DbError> {
        let mut claimed_puuids = Vec::new();
        for platform in &self.platforms {
            if claimed_puuids.len() as u32 >= self.batch_size {
                break;
            }
            let remaining = self.batch_size - claimed_puuids.len() as u32;
            let mut batch = self
                .store
                .claim_users(platform.name(), remaining, lookback_cutoff(), self.lease_duration)
                .await?;
            claimed_puuids.append(&mut batch);
        }

        let route = Route::from(self.region);
        Ok(claimed_puuids
            .into_iter()
            .map(|puuid| {
                Job::new(
                    route,
                    JobKind::ListMatchIds {
                        puuid,
                        start: 0,
                        count: self.matches_per_page,
                    },
                )
            })
            .collect())
    }
}

/// Stage 3: claims a batch of unqueried `match_ids` rows for a region and
/// wraps each one in a fetch job.
pub struct MatchJobFactory {
    store: LeaseStore,
    region: Region,
    batch_size: u32,
    lease_duration: Duration,
}

impl MatchJobFactory {
    pub fn new(store: LeaseStore, region: Region, batch_size: u32, lease_duration: Duration) -> Self {
        Self {
            store,
            region,
            batch_size,
            lease_duration,
        }
    }

    async fn produce(&mut self) -> Result<Vec<Job>, DbError> {
        let claimed = self.store.claim_match_ids(self.region.name(), self.batch_size, self.lease_duration).await?;

        let route = Route::from(self.region);
        Ok(claimed.into_iter().map(|match_id| Job::new(route, JobKind::FetchMatch { match_id })).collect())
    }
}

/// Tagged union of the three stage factories. `collector-core-pipeline`
/// spawns one refiller per configured route, each owning one variant.
pub enum JobFactory {
    Ladder(LadderJobFactory),
    MatchIds(MatchIdsJobFactory),
    Match(MatchJobFactory),
}

impl JobFactory {
    pub async fn produce(&mut self) -> Result<Vec<Job>, DbError> {
        match self {
            JobFactory::Ladder(f) => Ok(f.produce()),
            JobFactory::MatchIds(f) => f.produce().await,
            JobFactory::Match(f) => f.produce().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_factory_emits_one_job_per_combo_then_nothing() {
        let mut factory = LadderJobFactory::new(Platform::Kr, &["RANKED_SOLO_5x5"], &["DIAMOND", "EMERALD"], &["I", "II"]);
        let first = factory.produce();
        assert_eq!(first.len(), 4);
        assert!(factory.produce().is_empty(), "a second call should yield nothing");
    }

    #[tokio::test]
    async fn match_ids_factory_aggregates_claims_across_every_platform_in_the_region() {
        use collector_infra_db::DbClient;

        let client = DbClient::connect(":memory:", None).await.unwrap();
        let store = LeaseStore::new(client);
        store.insert_users("na1", &["a".to_string(), "b".to_string()]).await.unwrap();
        store.insert_users("br1", &["c".to_string()]).await.unwrap();

        let mut factory = MatchIdsJobFactory::new(
            store,
            Region::Americas,
            vec![Platform::Na1, Platform::Br1, Platform::La1],
            10,
            Duration::minutes(30),
            100,
        );

        let jobs = factory.produce().await.unwrap();
        assert_eq!(jobs.len(), 3, "should claim from every platform in the region");
        assert!(jobs.iter().all(|j| matches!(j.route, Route::Region(Region::Americas))));
    }

    #[tokio::test]
    async fn match_ids_factory_stops_claiming_once_batch_size_is_reached() {
        use collector_infra_db::DbClient;

        let client = DbClient::connect(":memory:", None).await.unwrap();
        let store = LeaseStore::new(client);
        store.insert_users("na1", &["a".to_string(), "b".to_string()]).await.unwrap();
        store.insert_users("br1", &["c".to_string()]).await.unwrap();

        let mut factory = MatchIdsJobFactory::new(
            store,
            Region::Americas,
            vec![Platform::Na1, Platform::Br1],
            2,
            Duration::minutes(30),
            100,
        );

        let jobs = factory.produce().await.unwrap();
        assert_eq!(jobs.len(), 2, "should stop at batch_size without touching br1");
    }
}
