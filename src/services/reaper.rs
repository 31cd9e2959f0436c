//! Возврат в продажу билетов с истёкшей бронью.
//!
//! Билет переходит в HELD, когда покупатель начинает оформление, и
//! получает срок брони. Если оформление брошено, бронь никто не снимет,
//! поэтому раз в период выполняется сверка: все HELD билеты с истёкшим
//! сроком переводятся обратно в AVAILABLE. Повторный прогон по уже
//! освобождённым билетам ничего не находит, так что пропущенный цикл или
//! перезапуск процесса безопасны.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::CacheService;
use crate::error::StoreError;
use crate::store::TicketStore;

/// Итог одного цикла сверки.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    /// Билеты, найденные выборкой просроченных броней.
    pub ticket_ids: Vec<i64>,
    /// События, которым принадлежат найденные билеты.
    pub event_ids: BTreeSet<i64>,
    /// Сколько билетов реально вернулось в продажу.
    pub released: u64,
}

impl ReleaseReport {
    pub fn is_empty(&self) -> bool {
        self.ticket_ids.is_empty()
    }
}

pub struct HoldReaper<S> {
    store: Arc<S>,
}

impl<S: TicketStore> HoldReaper<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Один цикл: выборка просроченных броней и одно пакетное обновление по их id.
    ///
    /// Ошибка хранилища прерывает только этот цикл, следующий повторит попытку.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<ReleaseReport, StoreError> {
        let expired = self.store.find_expired_holds(now).await?;

        if expired.is_empty() {
            debug!("🎫 No expired holds to release");
            return Ok(ReleaseReport::default());
        }

        let ticket_ids: Vec<i64> = expired.iter().map(|ticket| ticket.id).collect();
        let event_ids: BTreeSet<i64> = expired.iter().map(|ticket| ticket.event_id).collect();

        let released = self.store.release_holds(&ticket_ids, now).await?;

        let skipped = ticket_ids.len() as u64 - released.min(ticket_ids.len() as u64);
        if skipped > 0 {
            warn!("🎫 {} holds changed state before release and were left as is", skipped);
        }
        info!("🎫 Released {} expired holds: {:?}", released, ticket_ids);

        Ok(ReleaseReport {
            ticket_ids,
            event_ids,
            released,
        })
    }

    /// Сколько просроченных броней ждёт освобождения прямо сейчас.
    pub async fn pending(&self, now: DateTime<Utc>) -> Result<i64, StoreError> {
        self.store.count_expired_holds(now).await
    }
}

/// Фоновая задача, запускающая сверку с фиксированным периодом.
pub struct ReaperTask<S> {
    reaper: HoldReaper<S>,
    period: Duration,
    cache: Option<CacheService>,
}

impl<S: TicketStore + 'static> ReaperTask<S> {
    pub fn new(store: Arc<S>, period: Duration) -> Self {
        Self {
            reaper: HoldReaper::new(store),
            period,
            cache: None,
        }
    }

    /// После освобождения броней кеш мест затронутых событий сбрасывается.
    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Запускает цикл. Сигнал в `shutdown` останавливает его, но начатая
    /// сверка успевает закончиться.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("🧹 Hold reaper started, period {:?}", self.period);

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                _ = shutdown.changed() => break,
            }
        }

        info!("🧹 Hold reaper stopped");
    }

    async fn tick(&self) {
        let report = match self.reaper.run_cycle(Utc::now()).await {
            Ok(report) => report,
            Err(e) => {
                error!("🎫 Hold release cycle failed: {}", e);
                return;
            }
        };

        if report.released == 0 {
            return;
        }

        if let Some(cache) = &self.cache {
            for event_id in &report.event_ids {
                cache.invalidate_seats(*event_id).await;
            }
        }
    }
}
