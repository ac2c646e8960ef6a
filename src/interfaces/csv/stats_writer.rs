use crate::application::stats::{DashboardStats, LifetimeSummary, StatBucket};
use crate::domain::category::MachineCategory;
use crate::error::Result;
use std::io::Write;

/// Writes dashboard buckets and the lifetime summary as two CSV tables
/// separated by a blank line.
pub struct StatsWriter<W: Write> {
    sink: W,
}

impl<W: Write> StatsWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn write_stats(&mut self, stats: &DashboardStats, summary: &LifetimeSummary) -> Result<()> {
        let mut buckets = csv::Writer::from_writer(&mut self.sink);
        buckets.write_record(["period", "operator_share", "metegol", "pinball", "volante"])?;
        for (period, bucket) in [
            ("day", &stats.day),
            ("week", &stats.week),
            ("month", &stats.month),
            ("lifetime", &stats.lifetime),
        ] {
            buckets.write_record(bucket_row(period, bucket))?;
        }
        buckets.flush()?;
        drop(buckets);

        self.sink.write_all(b"\n")?;

        let mut totals = csv::Writer::from_writer(&mut self.sink);
        totals.write_record(["revenue", "operator_total", "owner_total", "tokens"])?;
        totals.write_record([
            summary.total_revenue.to_string(),
            summary.operator_total.to_string(),
            summary.owner_total.to_string(),
            summary.total_tokens.to_string(),
        ])?;
        totals.flush()?;
        Ok(())
    }
}

fn bucket_row(period: &str, bucket: &StatBucket) -> [String; 5] {
    [
        period.to_string(),
        bucket.total.to_string(),
        bucket.category(MachineCategory::Metegol).to_string(),
        bucket.category(MachineCategory::Pinball).to_string(),
        bucket.category(MachineCategory::Volante).to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_stats() {
        let mut stats = DashboardStats::default();
        stats.day.total = Money::new(dec!(1500.00));
        stats.day.by_category.insert(MachineCategory::Metegol, Money::new(dec!(1500.00)));
        stats.lifetime = stats.day.clone();
        let summary = LifetimeSummary {
            total_revenue: Money::new(dec!(3000)),
            operator_total: Money::new(dec!(1500.00)),
            owner_total: Money::new(dec!(1500.00)),
            total_tokens: 10,
        };

        let mut buffer = Vec::new();
        StatsWriter::new(&mut buffer)
            .write_stats(&stats, &summary)
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert_eq!(
            output,
            "period,operator_share,metegol,pinball,volante\n\
             day,1500,1500,0,0\n\
             week,0,0,0,0\n\
             month,0,0,0,0\n\
             lifetime,1500,1500,0,0\n\
             \n\
             revenue,operator_total,owner_total,tokens\n\
             3000,1500,1500,10\n"
        );
    }
}
