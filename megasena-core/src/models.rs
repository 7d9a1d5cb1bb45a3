use chrono::NaiveDate;

use crate::error::{AnalysisError, AnalysisResult};

/// Highest number on the ticket (numbers run 1..=60).
pub const POOL_SIZE: u8 = 60;
/// Numbers picked per draw.
pub const PICK_COUNT: usize = 6;

/// One combination: 6 distinct numbers in 1..=60, kept sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Draw {
    numbers: [u8; PICK_COUNT],
}

impl Draw {
    pub fn new(numbers: &[u8]) -> AnalysisResult<Self> {
        Self::checked(numbers, None)
    }

    fn checked(numbers: &[u8], contest_id: Option<u32>) -> AnalysisResult<Self> {
        validate_numbers(numbers).map_err(|reason| AnalysisError::malformed(contest_id, reason))?;
        let mut sorted = [0u8; PICK_COUNT];
        sorted.copy_from_slice(numbers);
        sorted.sort_unstable();
        Ok(Self { numbers: sorted })
    }

    /// Caller guarantees the invariant (sampler output).
    pub(crate) fn from_sorted_unchecked(numbers: [u8; PICK_COUNT]) -> Self {
        debug_assert!(validate_numbers(&numbers).is_ok());
        Self { numbers }
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.numbers
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.binary_search(&number).is_ok()
    }

    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| n as u32).sum()
    }
}

impl std::fmt::Display for Draw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.numbers.iter().map(|n| format!("{:02}", n)).collect();
        write!(f, "{}", parts.join(" - "))
    }
}

fn validate_numbers(numbers: &[u8]) -> Result<(), String> {
    if numbers.len() != PICK_COUNT {
        return Err(format!(
            "esperadas {} dezenas, recebidas {}",
            PICK_COUNT,
            numbers.len()
        ));
    }
    for &n in numbers {
        if n < 1 || n > POOL_SIZE {
            return Err(format!("dezena {} fora do intervalo (1-{})", n, POOL_SIZE));
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                return Err(format!("dezena repetida: {}", numbers[i]));
            }
        }
    }
    Ok(())
}

/// One row of the official history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalRecord {
    pub contest_id: u32,
    pub draw_date: NaiveDate,
    pub numbers: Draw,
}

impl HistoricalRecord {
    pub fn new(contest_id: u32, draw_date: NaiveDate, numbers: &[u8]) -> AnalysisResult<Self> {
        let numbers = Draw::checked(numbers, Some(contest_id))?;
        Ok(Self {
            contest_id,
            draw_date,
            numbers,
        })
    }
}

/// A contest in which a given number came out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub contest_id: u32,
    pub draw_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapRecord {
    pub number: u8,
    pub previous_date: NaiveDate,
    pub next_date: NaiveDate,
    pub days_elapsed: i64,
}

/// Maximal run of consecutive contests containing `number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakGroup {
    pub number: u8,
    pub contest_ids: Vec<u32>,
}

impl StreakGroup {
    pub fn len(&self) -> usize {
        self.contest_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contest_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueReport {
    pub number: u8,
    pub last_seen: NaiveDate,
    pub days_since: i64,
    /// Latest draw date in the history.
    pub reference_date: NaiveDate,
    /// Numbers absent from the whole history, excluded from the ranking.
    pub never_drawn: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_draw_ok_and_sorted() {
        let draw = Draw::new(&[60, 1, 30, 2, 45, 10]).unwrap();
        assert_eq!(draw.numbers(), &[1, 2, 10, 30, 45, 60]);
        assert_eq!(draw.sum(), 148);
        assert!(draw.contains(45));
        assert!(!draw.contains(44));
    }

    #[test]
    fn test_draw_out_of_range() {
        assert!(Draw::new(&[0, 2, 3, 4, 5, 6]).is_err());
        assert!(Draw::new(&[1, 2, 3, 4, 5, 61]).is_err());
    }

    #[test]
    fn test_draw_wrong_count() {
        assert!(Draw::new(&[1, 2, 3, 4, 5]).is_err());
        assert!(Draw::new(&[1, 2, 3, 4, 5, 6, 7]).is_err());
    }

    #[test]
    fn test_draw_duplicate() {
        let err = Draw::new(&[1, 1, 3, 4, 5, 6]).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedRecord { contest_id: None, .. }));
    }

    #[test]
    fn test_draw_display() {
        let draw = Draw::new(&[5, 4, 3, 2, 1, 60]).unwrap();
        assert_eq!(draw.to_string(), "01 - 02 - 03 - 04 - 05 - 60");
    }

    #[test]
    fn test_record_carries_contest_in_error() {
        let err = HistoricalRecord::new(2500, date(2022, 7, 2), &[1, 2, 3, 4, 5, 99]).unwrap_err();
        match err {
            AnalysisError::MalformedRecord { contest_id, reason } => {
                assert_eq!(contest_id, Some(2500));
                assert!(reason.contains("99"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_record_ok() {
        let record = HistoricalRecord::new(1, date(1996, 3, 11), &[41, 5, 4, 52, 30, 33]).unwrap();
        assert_eq!(record.numbers.numbers(), &[4, 5, 30, 33, 41, 52]);
    }
}
