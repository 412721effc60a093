//! Overdue sweep scheduler
//!
//! Fires once per day at the configured hour (business timezone) and runs
//! the circulation overdue sweep: active borrows past their due date flip
//! to overdue and accrued fines are refreshed.

use chrono::NaiveTime;
use chrono_tz::Tz;
use tokio_util::sync::CancellationToken;

use super::CirculationService;

pub struct OverdueScheduler {
    service: CirculationService,
    shutdown: CancellationToken,
    sweep_time: NaiveTime,
    timezone: Tz,
}

impl OverdueScheduler {
    pub fn new(
        service: CirculationService,
        shutdown: CancellationToken,
        sweep_hour: u32,
        timezone: Tz,
    ) -> Self {
        let sweep_time = NaiveTime::from_hms_opt(sweep_hour % 24, 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            service,
            shutdown,
            sweep_time,
            timezone,
        }
    }

    /// Main loop: sweep at startup, then once per day at the sweep time.
    pub async fn run(self) {
        tracing::info!("Overdue sweep scheduler started");

        // Catch up immediately: the server may have been down across due dates
        self.sweep().await;

        loop {
            let sleep_duration = Self::duration_until_next_sweep(self.sweep_time, self.timezone);

            tracing::info!(
                "Next overdue sweep in {} minutes (at {})",
                sleep_duration.as_secs() / 60,
                self.sweep_time.format("%H:%M")
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.sweep().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Overdue sweep scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    async fn sweep(&self) {
        match self.service.sweep_overdue().await {
            Ok(0) => tracing::debug!("Overdue sweep: nothing past due"),
            Ok(n) => tracing::info!("Overdue sweep: {} borrow(s) marked overdue", n),
            Err(e) => tracing::error!("Overdue sweep failed: {}", e),
        }
    }

    /// Duration until the next occurrence of `sweep_time` in `tz`.
    fn duration_until_next_sweep(sweep_time: NaiveTime, tz: Tz) -> std::time::Duration {
        let now = chrono::Utc::now().with_timezone(&tz);
        let today = now.date_naive();

        let target_date = if now.time() >= sweep_time {
            // Today's sweep already ran, wait for tomorrow
            today + chrono::Duration::days(1)
        } else {
            today
        };

        let target_datetime = target_date
            .and_time(sweep_time)
            .and_local_timezone(tz)
            .single()
            .unwrap_or_else(|| {
                // DST edge case: fallback to +1 min
                (target_date.and_time(sweep_time) + chrono::Duration::minutes(1))
                    .and_local_timezone(tz)
                    .latest()
                    .unwrap_or_else(|| {
                        tracing::error!("Cannot resolve local time for overdue sweep, using fallback");
                        now + chrono::Duration::hours(1)
                    })
            });

        let duration = target_datetime.signed_duration_since(now);
        if duration.num_seconds() <= 0 {
            // Safety: should not happen, fall back to a minute
            std::time::Duration::from_secs(60)
        } else {
            duration
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(60))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_until_next_sweep_is_within_a_day() {
        let d = OverdueScheduler::duration_until_next_sweep(
            NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
            chrono_tz::UTC,
        );
        assert!(d.as_secs() > 0);
        assert!(d.as_secs() <= 24 * 60 * 60);
    }
}
