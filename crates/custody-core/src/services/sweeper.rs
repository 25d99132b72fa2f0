//! Periodic purge of expired sessions

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::repositories::UserRepository;
use crate::services::authenticator::SessionAuthenticator;
use crate::services::token_strategy::TokenStrategy;

/// Purges expired sessions every `every` until `shutdown` flips to true.
/// The first pass runs immediately.
///
/// Validation never relies on this having run.
pub fn spawn_session_sweeper<U, T>(
    auth: Arc<SessionAuthenticator<U, T>>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    U: UserRepository + ?Sized + 'static,
    T: TokenStrategy + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Session sweeper started (every {:?})", every);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match auth.purge_expired().await {
                        Ok(0) => debug!("No expired sessions"),
                        Ok(count) => info!("Purged {} expired sessions", count),
                        Err(e) => error!("Session sweep failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Session sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockSessionRepository, MockUserRepository};
    use crate::services::token_strategy::StoredSessions;
    use crate::DomainError;

    #[tokio::test]
    async fn test_sweeper_purges_and_stops() {
        let mut sessions = MockSessionRepository::new();
        sessions.expect_delete_expired().times(1..).returning(|_| Ok(2));
        let auth = Arc::new(SessionAuthenticator::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(StoredSessions::new(Arc::new(sessions))),
        ));

        let (tx, rx) = watch::channel(false);
        let handle = spawn_session_sweeper(auth, Duration::from_secs(3600), rx);

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweeper_survives_storage_errors() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_delete_expired()
            .returning(|_| Err(DomainError::StorageUnavailable("down".into())));
        let auth = Arc::new(SessionAuthenticator::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(StoredSessions::new(Arc::new(sessions))),
        ));

        let (tx, rx) = watch::channel(false);
        let handle = spawn_session_sweeper(auth, Duration::from_millis(10), rx);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        drop(tx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
