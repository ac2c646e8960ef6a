use crate::domain::category::MachineCategory;
use crate::domain::collection::Collection;
use crate::domain::machine::Machine;
use crate::domain::money::Money;
use crate::domain::record::RecordId;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Operator-share total of one period, with its per-category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatBucket {
    pub total: Money,
    pub by_category: BTreeMap<MachineCategory, Money>,
}

impl Default for StatBucket {
    fn default() -> Self {
        Self {
            total: Money::ZERO,
            by_category: MachineCategory::ALL
                .into_iter()
                .map(|c| (c, Money::ZERO))
                .collect(),
        }
    }
}

impl StatBucket {
    fn add(&mut self, category: MachineCategory, amount: Money) {
        self.total += amount;
        *self.by_category.entry(category).or_default() += amount;
    }

    pub fn category(&self, category: MachineCategory) -> Money {
        self.by_category.get(&category).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub day: StatBucket,
    pub week: StatBucket,
    pub month: StatBucket,
    pub lifetime: StatBucket,
}

/// Totals over the whole collection history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LifetimeSummary {
    pub total_revenue: Money,
    pub operator_total: Money,
    pub owner_total: Money,
    pub total_tokens: u64,
}

/// Lower bounds of the day, week and month windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodStarts {
    pub day: DateTime<Utc>,
    pub week: DateTime<Utc>,
    pub month: DateTime<Utc>,
}

impl PeriodStarts {
    /// Computes the windows for `now`, using midnight in `now`'s time zone.
    ///
    /// Weeks start on Sunday, so early in a month the week window can reach
    /// back into the previous month and hold more than the month window.
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
        let first_of_month = today.with_day(1).unwrap_or(today);

        let day = local_midnight(&tz, today);
        let month = local_midnight(&tz, first_of_month);
        let week = local_midnight(&tz, sunday);
        Self { day, week, month }
    }
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump; the day starts at the first valid instant after it.
        None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}

/// Buckets the operator share of every collection into day, week, month and
/// lifetime totals.
///
/// The windows overlap and run up to `now`. Collections whose machine is gone
/// are counted under the default category.
pub fn aggregate<Tz: TimeZone>(
    collections: &[Collection],
    machines: &[Machine],
    now: &DateTime<Tz>,
) -> DashboardStats {
    let starts = PeriodStarts::at(now);
    let categories: HashMap<&RecordId, MachineCategory> =
        machines.iter().map(|m| (&m.id, m.category)).collect();

    let mut stats = DashboardStats::default();
    for collection in collections {
        let category = match categories.get(collection.machine_id()) {
            Some(category) => *category,
            None => {
                warn!(
                    collection = %collection.id,
                    machine = %collection.machine_id(),
                    "collection references a missing machine"
                );
                MachineCategory::default()
            }
        };
        let share = collection.operator_share();
        let at = collection.collected_at();

        stats.lifetime.add(category, share);
        if at >= starts.month {
            stats.month.add(category, share);
        }
        if at >= starts.week {
            stats.week.add(category, share);
        }
        if at >= starts.day {
            stats.day.add(category, share);
        }
    }
    stats
}

pub fn summarize(collections: &[Collection]) -> LifetimeSummary {
    collections
        .iter()
        .fold(LifetimeSummary::default(), |mut acc, c| {
            acc.total_revenue += c.draft.total;
            acc.operator_total += c.draft.operator_share;
            acc.owner_total += c.draft.owner_share;
            acc.total_tokens += u64::from(c.draft.token_count.value());
            acc
        })
}
