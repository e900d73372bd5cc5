use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::Config;

/// Calendar gate for the weekly summary: open during one designated hour of
/// one designated weekday, evaluated in the configured timezone. Nothing is
/// persisted, so a missed window is not caught up.
#[derive(Debug, Clone, Copy)]
pub struct SummarySchedule {
    pub weekday: Weekday,
    pub hour: u32,
    pub tz: Tz,
}

impl SummarySchedule {
    pub fn new(cfg: &Config) -> Self {
        Self {
            weekday: cfg.summary_weekday,
            hour: cfg.summary_hour,
            tz: cfg.timezone,
        }
    }

    pub fn is_due(&self, utc_now: DateTime<Utc>) -> bool {
        let local = utc_now.with_timezone(&self.tz);
        local.weekday() == self.weekday && local.hour() == self.hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;
    use chrono::TimeZone;

    fn ist_to_utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        // IST is UTC+05:30 all year
        chrono_tz::Asia::Kolkata
            .with_ymd_and_hms(2024, 1, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn due_on_monday_at_configured_hour() {
        let cfg = default_test_config();
        let sched = SummarySchedule::new(&cfg);
        // 2024-01-15 is a Monday
        assert!(sched.is_due(ist_to_utc(15, 16, 0)));
        assert!(sched.is_due(ist_to_utc(15, 16, 59)));
    }

    #[test]
    fn closed_outside_the_hour() {
        let cfg = default_test_config();
        let sched = SummarySchedule::new(&cfg);
        assert!(!sched.is_due(ist_to_utc(15, 15, 59)));
        assert!(!sched.is_due(ist_to_utc(15, 17, 0)));
    }

    #[test]
    fn closed_on_other_days() {
        let cfg = default_test_config();
        let sched = SummarySchedule::new(&cfg);
        assert!(!sched.is_due(ist_to_utc(16, 16, 0)));
    }

    #[test]
    fn weekday_is_taken_in_local_time() {
        let cfg = default_test_config();
        let sched = SummarySchedule {
            hour: 2,
            ..SummarySchedule::new(&cfg)
        };
        // Monday 02:00 IST is still Sunday in UTC
        let utc = ist_to_utc(15, 2, 0);
        assert_eq!(utc.weekday(), Weekday::Sun);
        assert!(sched.is_due(utc));
    }
}
