use std::time::Duration;

use crate::commands::{refresh, EngineCtx};
use crate::state::AppState;

/// Due-date countdown labels go stale without any data change; a re-derive
/// once a minute keeps them fresh and sweeps the expired undo slot.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns the fire-and-forget periodic refresh loop on the current tokio
/// runtime. The first tick fires immediately; missed ticks are skipped.
pub fn start_refresh<C>(ctx: C, state: AppState) -> tokio::task::JoinHandle<()>
where
    C: EngineCtx + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REFRESH_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            refresh(&ctx, &state);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use crate::view::ViewPayload;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingCtx {
        renders: Arc<AtomicUsize>,
    }

    impl EngineCtx for CountingCtx {
        fn get_item(&self, _key: &str) -> Option<String> {
            None
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn render(&self, _payload: ViewPayload) {
            self.renders.fetch_add(1, Ordering::SeqCst);
        }

        fn notify(&self, _message: &str) {}

        fn now_ms(&self) -> i64 {
            1_700_000_000_000
        }
    }

    #[test]
    fn refresh_loop_renders_on_its_first_tick() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let renders = Arc::new(AtomicUsize::new(0));
        rt.block_on(async {
            let ctx = CountingCtx {
                renders: Arc::clone(&renders),
            };
            let handle = start_refresh(ctx, AppState::new(Vec::new()));
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.abort();
        });
        assert!(renders.load(Ordering::SeqCst) >= 1);
    }
}
