use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{Draw, HistoricalRecord, PICK_COUNT, POOL_SIZE};

/// Expected sum of a draw: 6 × (1 + 60) / 2.
pub const THEORETICAL_SUM_MEAN: f64 = PICK_COUNT as f64 * (1.0 + POOL_SIZE as f64) / 2.0;

/// Standard deviation of the sum of 6 numbers drawn without replacement
/// from 1..=60 (finite population correction applied).
pub fn theoretical_sum_std_dev() -> f64 {
    let n = POOL_SIZE as f64;
    let k = PICK_COUNT as f64;
    let population_var = (n * n - 1.0) / 12.0;
    (k * population_var * (n - k) / (n - 1.0)).sqrt()
}

/// Occurrences of each number 1..=60.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; POOL_SIZE as usize],
    games: u64,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self {
            counts: [0; POOL_SIZE as usize],
            games: 0,
        }
    }
}

impl FrequencyTable {
    pub fn from_draws<'a>(draws: impl IntoIterator<Item = &'a Draw>) -> Self {
        let mut table = Self::default();
        for draw in draws {
            table.games += 1;
            for &n in draw.numbers() {
                table.counts[(n - 1) as usize] += 1;
            }
        }
        table
    }

    pub fn from_records(records: &[HistoricalRecord]) -> Self {
        Self::from_draws(records.iter().map(|r| &r.numbers))
    }

    /// Stacks two tables (history + simulation).
    pub fn merge(&self, other: &FrequencyTable) -> FrequencyTable {
        let mut merged = self.clone();
        for (slot, &c) in merged.counts.iter_mut().zip(other.counts.iter()) {
            *slot += c;
        }
        merged.games += other.games;
        merged
    }

    pub fn count(&self, number: u8) -> u64 {
        match number {
            1..=POOL_SIZE => self.counts[(number - 1) as usize],
            _ => 0,
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn games(&self) -> u64 {
        self.games
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Average occurrences per number; the flat line the bars converge to.
    pub fn mean_count(&self) -> f64 {
        self.total() as f64 / POOL_SIZE as f64
    }

    /// Share of games containing `number`, in percent.
    pub fn relative_percent(&self, number: u8) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.count(number) as f64 / self.games as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SumSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
}

impl SumSummary {
    pub fn deviation_from_theory(&self) -> f64 {
        self.mean - THEORETICAL_SUM_MEAN
    }
}

pub fn sum_summary(sums: &[u32]) -> Option<SumSummary> {
    let min = *sums.iter().min()?;
    let max = *sums.iter().max()?;
    let count = sums.len();
    let mean = sums.iter().map(|&s| s as f64).sum::<f64>() / count as f64;
    let var = sums
        .iter()
        .map(|&s| {
            let d = s as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / count as f64;
    Some(SumSummary {
        count,
        mean,
        std_dev: var.sqrt(),
        min,
        max,
    })
}

pub fn draw_sums<'a>(draws: impl IntoIterator<Item = &'a Draw>) -> Vec<u32> {
    draws.into_iter().map(Draw::sum).collect()
}

/// Games per exact sum value.
pub fn sum_counts(sums: &[u32]) -> BTreeMap<u32, u64> {
    let mut counts = BTreeMap::new();
    for &s in sums {
        *counts.entry(s).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Equal-width bins over [min, max]; the last bin is closed on the right.
pub fn sum_histogram(sums: &[u32], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sums.iter().min(), sums.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let lo = min as f64;
    let span = (max - min) as f64;
    let width = if span == 0.0 { 1.0 } else { span / bins as f64 };
    let bins = if span == 0.0 { 1 } else { bins };

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + i as f64 * width,
            end: lo + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for &s in sums {
        let idx = (((s - min) as f64) / width) as usize;
        out[idx.min(bins - 1)].count += 1;
    }
    out
}

/// Records drawn within [start, end], both ends included.
pub fn filter_by_date(
    records: &[HistoricalRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<HistoricalRecord> {
    records
        .iter()
        .filter(|r| r.draw_date >= start && r.draw_date <= end)
        .cloned()
        .collect()
}

pub fn date_range(records: &[HistoricalRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let first = records.iter().map(|r| r.draw_date).min()?;
    let last = records.iter().map(|r| r.draw_date).max()?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draw(n: [u8; 6]) -> Draw {
        Draw::new(&n).unwrap()
    }

    #[test]
    fn test_theoretical_constants() {
        assert!((THEORETICAL_SUM_MEAN - 183.0).abs() < 1e-12);
        let sd = theoretical_sum_std_dev();
        assert!((sd - 40.583).abs() < 1e-2, "sd = {}", sd);
    }

    #[test]
    fn test_frequency_table_counts() {
        let draws = vec![draw([1, 2, 3, 4, 5, 6]), draw([1, 7, 8, 9, 10, 60])];
        let table = FrequencyTable::from_draws(&draws);
        assert_eq!(table.count(1), 2);
        assert_eq!(table.count(60), 1);
        assert_eq!(table.count(59), 0);
        assert_eq!(table.count(0), 0);
        assert_eq!(table.total(), 12);
        assert_eq!(table.games(), 2);
        assert!((table.mean_count() - 0.2).abs() < 1e-12);
        assert!((table.relative_percent(1) - 100.0).abs() < 1e-12);
        assert!((table.relative_percent(2) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_frequency_merge() {
        let a = FrequencyTable::from_draws(&[draw([1, 2, 3, 4, 5, 6])]);
        let b = FrequencyTable::from_draws(&[draw([1, 12, 13, 14, 15, 16])]);
        let merged = a.merge(&b);
        assert_eq!(merged.count(1), 2);
        assert_eq!(merged.count(16), 1);
        assert_eq!(merged.games(), 2);
        assert_eq!(merged.total(), a.total() + b.total());
    }

    #[test]
    fn test_frequency_empty() {
        let table = FrequencyTable::default();
        assert_eq!(table.total(), 0);
        assert_eq!(table.relative_percent(5), 0.0);
    }

    #[test]
    fn test_sum_summary_known_values() {
        let summary = sum_summary(&[21, 183, 345]).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 183.0).abs() < 1e-12);
        // variance = (162² + 0 + 162²) / 3 = 17496
        assert!((summary.std_dev - 17496f64.sqrt()).abs() < 1e-9);
        assert_eq!(summary.min, 21);
        assert_eq!(summary.max, 345);
        assert!(summary.deviation_from_theory().abs() < 1e-12);
    }

    #[test]
    fn test_sum_summary_empty() {
        assert!(sum_summary(&[]).is_none());
    }

    #[test]
    fn test_sum_counts() {
        let counts = sum_counts(&[21, 21, 100]);
        assert_eq!(counts[&21], 2);
        assert_eq!(counts[&100], 1);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_histogram_counts_cover_input() {
        let sums: Vec<u32> = (21..=345).collect();
        let hist = sum_histogram(&sums, 30);
        assert_eq!(hist.len(), 30);
        assert_eq!(hist.iter().map(|b| b.count).sum::<u64>(), sums.len() as u64);
        assert!((hist[0].start - 21.0).abs() < 1e-12);
        assert!((hist[29].end - 345.0).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_single_value() {
        let hist = sum_histogram(&[183, 183], 30);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0].count, 2);
        assert!((hist[0].center() - 183.5).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(sum_histogram(&[], 10).is_empty());
    }

    #[test]
    fn test_draw_sums() {
        let draws = vec![draw([1, 2, 3, 4, 5, 6]), draw([55, 56, 57, 58, 59, 60])];
        assert_eq!(draw_sums(&draws), vec![21, 345]);
    }

    #[test]
    fn test_filter_by_date_inclusive() {
        let records = vec![
            HistoricalRecord::new(1, date(2020, 1, 1), &[1, 2, 3, 4, 5, 6]).unwrap(),
            HistoricalRecord::new(2, date(2020, 1, 8), &[1, 2, 3, 4, 5, 7]).unwrap(),
            HistoricalRecord::new(3, date(2020, 1, 15), &[1, 2, 3, 4, 5, 8]).unwrap(),
        ];
        let window = filter_by_date(&records, date(2020, 1, 1), date(2020, 1, 8));
        let ids: Vec<u32> = window.iter().map(|r| r.contest_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(filter_by_date(&records, date(2021, 1, 1), date(2021, 12, 31)).is_empty());
        assert_eq!(
            date_range(&records),
            Some((date(2020, 1, 1), date(2020, 1, 15)))
        );
        assert_eq!(date_range(&[]), None);
    }
}
