//! Removal of Tvheadend channels left with the placeholder name
//!
//! Tvheadend names channels it created on its own `{name-not-set}`. Those,
//! and only those, are deleted; no other heuristic applies.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::AppResult;
use crate::tvheadend::{SENTINEL_CHANNEL_NAME, TunerClient};

pub struct SentinelCleanup {
    tuner: Arc<dyn TunerClient>,
}

impl SentinelCleanup {
    pub fn new(tuner: Arc<dyn TunerClient>) -> Self {
        Self { tuner }
    }

    /// Delete every sentinel-named channel, returning how many were deleted.
    ///
    /// A failed delete is logged and the walk continues.
    pub async fn run(&self) -> AppResult<usize> {
        let channels = self.tuner.list_all_channels().await?;
        let mut deleted = 0;

        for channel in channels
            .iter()
            .filter(|channel| channel.name == SENTINEL_CHANNEL_NAME)
        {
            match self.tuner.delete_channels(&channel.uuid).await {
                Ok(()) => {
                    debug!("Deleted unnamed Tvheadend channel {}", channel.uuid);
                    deleted += 1;
                }
                Err(e) => warn!("Failed to delete unnamed channel {}: {}", channel.uuid, e),
            }
        }

        if deleted > 0 {
            info!("Removed {} unnamed Tvheadend channels", deleted);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TunerError;
    use crate::tvheadend::{MockTunerClient, TunerChannel};
    use mockall::predicate::eq;
    use rstest::rstest;
    use tracing_test::traced_test;

    fn channel(uuid: &str, name: &str) -> TunerChannel {
        TunerChannel {
            uuid: uuid.to_string(),
            name: name.to_string(),
        }
    }

    fn ten_channels() -> Vec<TunerChannel> {
        vec![
            channel("c0", "News"),
            channel("c1", SENTINEL_CHANNEL_NAME),
            channel("c2", "Sports"),
            channel("c3", "{name-not-set} "),
            channel("c4", SENTINEL_CHANNEL_NAME),
            channel("c5", ""),
            channel("c6", "{NAME-NOT-SET}"),
            channel("c7", "name-not-set"),
            channel("c8", SENTINEL_CHANNEL_NAME),
            channel("c9", "Movies {name-not-set}"),
        ]
    }

    #[tokio::test]
    async fn test_only_exact_sentinel_names_are_deleted() {
        let mut tuner = MockTunerClient::new();
        tuner
            .expect_list_all_channels()
            .times(1)
            .returning(|| Ok(ten_channels()));
        for uuid in ["c1", "c4", "c8"] {
            tuner
                .expect_delete_channels()
                .with(eq(uuid))
                .times(1)
                .returning(|_| Ok(()));
        }

        let cleanup = SentinelCleanup::new(Arc::new(tuner));
        assert_eq!(cleanup.run().await.unwrap(), 3);
    }

    #[rstest]
    #[case::none(vec![channel("a", "News"), channel("b", "Sports")], 0)]
    #[case::all(vec![channel("a", SENTINEL_CHANNEL_NAME), channel("b", SENTINEL_CHANNEL_NAME)], 2)]
    #[case::empty(vec![], 0)]
    #[tokio::test]
    async fn test_deleted_count(#[case] channels: Vec<TunerChannel>, #[case] expected: usize) {
        let mut tuner = MockTunerClient::new();
        tuner
            .expect_list_all_channels()
            .returning(move || Ok(channels.clone()));
        tuner
            .expect_delete_channels()
            .times(expected)
            .returning(|_| Ok(()));

        let cleanup = SentinelCleanup::new(Arc::new(tuner));
        assert_eq!(cleanup.run().await.unwrap(), expected);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_delete_does_not_stop_the_walk() {
        let mut tuner = MockTunerClient::new();
        tuner.expect_list_all_channels().returning(|| {
            Ok(vec![
                channel("a", SENTINEL_CHANNEL_NAME),
                channel("b", SENTINEL_CHANNEL_NAME),
            ])
        });
        tuner
            .expect_delete_channels()
            .with(eq("a"))
            .returning(|_| {
                Err(TunerError::Timeout {
                    operation: "delete_channels",
                })
            });
        tuner
            .expect_delete_channels()
            .with(eq("b"))
            .times(1)
            .returning(|_| Ok(()));

        let cleanup = SentinelCleanup::new(Arc::new(tuner));
        assert_eq!(cleanup.run().await.unwrap(), 1);
        assert!(logs_contain("Failed to delete unnamed channel a"));
    }

    #[tokio::test]
    async fn test_listing_failure_is_returned() {
        let mut tuner = MockTunerClient::new();
        tuner.expect_list_all_channels().returning(|| {
            Err(TunerError::Status {
                operation: "list_all_channels",
                status: 500,
                body: String::new(),
            })
        });
        tuner.expect_delete_channels().never();

        let cleanup = SentinelCleanup::new(Arc::new(tuner));
        assert!(cleanup.run().await.is_err());
    }
}
