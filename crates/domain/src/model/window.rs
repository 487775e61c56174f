use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, TimeZone, Utc, Weekday};

/// Inclusive time range over which charges are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_epoch(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn end_epoch(&self) -> i64 {
        self.end.timestamp()
    }
}

/// The three windows of one refresh, all ending at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueWindows {
    pub today: DateWindow,
    pub week: DateWindow,
    pub month_to_date: DateWindow,
}

/// Time zone in which day, week and month boundaries are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingZone {
    /// The zone of the host process.
    Local,
    Fixed(FixedOffset),
}

/// Calendar rules used to derive [`RevenueWindows`] from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingCalendar {
    zone: ReportingZone,
    week_start: Weekday,
}

impl Default for ReportingCalendar {
    fn default() -> Self {
        Self::new(ReportingZone::Local, Weekday::Sun)
    }
}

impl ReportingCalendar {
    pub fn new(zone: ReportingZone, week_start: Weekday) -> Self {
        Self { zone, week_start }
    }

    pub fn zone(&self) -> ReportingZone {
        self.zone
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Derives start-of-day, start-of-week and start-of-month windows, each
    /// ending at `now`. Called fresh on every refresh.
    pub fn windows(&self, now: DateTime<Utc>) -> RevenueWindows {
        match self.zone {
            ReportingZone::Local => windows_in(now, &Local, self.week_start),
            ReportingZone::Fixed(offset) => windows_in(now, &offset, self.week_start),
        }
    }
}

fn windows_in<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz, week_start: Weekday) -> RevenueWindows {
    let today = now.with_timezone(tz).date_naive();
    let days_into_week = (7 + today.weekday().num_days_from_sunday()
        - week_start.num_days_from_sunday())
        % 7;
    let week_first = today - Duration::days(i64::from(days_into_week));
    let month_first = today.with_day(1).unwrap_or(today);

    let window_from = |date: NaiveDate| DateWindow::new(start_of_day(date, tz, now), now);

    RevenueWindows {
        today: window_from(today),
        week: window_from(week_first),
        month_to_date: window_from(month_first),
    }
}

/// First existing instant of `date` in `tz`. Midnight can fall into a DST gap,
/// in which case the hours after it are probed.
fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
        return fallback;
    };
    (0..3)
        .map(|hour| midnight + Duration::hours(hour))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or(fallback)
}

/// Source of "now" for refreshes; injected so tests are deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
