use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::warn;

use crate::domain::player::{PlayerSlot, ResolvedPlayer};
use crate::errors::LookupError;
use crate::pipeline::UserDirectory;

/// Resolves every slot concurrently; a failed lookup becomes a placeholder name.
#[derive(Clone)]
pub struct UsernameResolver {
    directory: Arc<dyn UserDirectory>,
    lookup_timeout: Duration,
}

impl UsernameResolver {
    pub fn new(directory: Arc<dyn UserDirectory>, lookup_timeout: Duration) -> Self {
        Self { directory, lookup_timeout }
    }

    pub async fn resolve(&self, slots: &[PlayerSlot], correlation_id: &str) -> Vec<ResolvedPlayer> {
        let lookups = slots.iter().map(|slot| async move {
            let lookup = self.directory.display_name(&slot.user_id);
            let result = tokio::time::timeout(self.lookup_timeout, lookup)
                .await
                .unwrap_or(Err(LookupError::Timeout));

            match result {
                Ok(display_name) => ResolvedPlayer::resolved(slot.user_id.clone(), display_name),
                Err(error) => {
                    warn!(
                        event_name = "pipeline.lookup_failed",
                        correlation_id,
                        user_id = %slot.user_id,
                        error = %error,
                        "username lookup failed; using placeholder"
                    );
                    ResolvedPlayer::placeholder(slot.user_id.clone())
                }
            }
        });

        join_all(lookups).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::UsernameResolver;
    use crate::domain::player::{PlayerSlot, UserId};
    use crate::errors::LookupError;
    use crate::pipeline::UserDirectory;

    struct ScriptedDirectory {
        replies: HashMap<String, (u64, Result<String, LookupError>)>,
    }

    #[async_trait]
    impl UserDirectory for ScriptedDirectory {
        async fn display_name(&self, user_id: &UserId) -> Result<String, LookupError> {
            let (delay_ms, reply) = self
                .replies
                .get(user_id.as_str())
                .cloned()
                .unwrap_or((0, Err(LookupError::Status { status: 404 })));
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            reply
        }
    }

    fn slots(ids: &[&str]) -> Vec<PlayerSlot> {
        ids.iter().map(|id| PlayerSlot { user_id: UserId::from(*id) }).collect()
    }

    #[tokio::test]
    async fn preserves_input_order_when_lookups_finish_out_of_order() {
        let directory = ScriptedDirectory {
            replies: HashMap::from([
                ("1".to_owned(), (30, Ok("alice".to_owned()))),
                ("2".to_owned(), (15, Ok("bob".to_owned()))),
                ("3".to_owned(), (0, Ok("carol".to_owned()))),
            ]),
        };
        let resolver = UsernameResolver::new(Arc::new(directory), Duration::from_secs(1));

        let players = resolver.resolve(&slots(&["1", "2", "3"]), "corr").await;
        let names = players.iter().map(|p| p.display_name.as_str()).collect::<Vec<_>>();

        assert_eq!(names, ["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn failures_become_placeholders_without_failing_the_batch() {
        let directory = ScriptedDirectory {
            replies: HashMap::from([
                ("1".to_owned(), (0, Ok("alice".to_owned()))),
                ("2".to_owned(), (0, Err(LookupError::Transport("reset".to_owned())))),
                ("4".to_owned(), (0, Err(LookupError::Decode("no username".to_owned())))),
            ]),
        };
        let resolver = UsernameResolver::new(Arc::new(directory), Duration::from_secs(1));

        let players = resolver.resolve(&slots(&["1", "2", "3", "4"]), "corr").await;
        let names = players.iter().map(|p| p.display_name.as_str()).collect::<Vec<_>>();

        assert_eq!(names, ["alice", "UnknownUser(2)", "UnknownUser(3)", "UnknownUser(4)"]);
        assert_eq!(players[1].user_id.as_str(), "2");
    }

    #[tokio::test]
    async fn slow_lookups_time_out_into_placeholders() {
        let directory = ScriptedDirectory {
            replies: HashMap::from([
                ("1".to_owned(), (5_000, Ok("sleepy".to_owned()))),
                ("2".to_owned(), (0, Ok("quick".to_owned()))),
            ]),
        };
        let resolver = UsernameResolver::new(Arc::new(directory), Duration::from_millis(20));

        let players = resolver.resolve(&slots(&["1", "2"]), "corr").await;

        assert_eq!(players[0].display_name, "UnknownUser(1)");
        assert_eq!(players[1].display_name, "quick");
    }
}
