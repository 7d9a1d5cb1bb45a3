//! Records mined from the official draw history: longest gap between two
//! appearances of a number, longest run of consecutive contests, and the
//! number that has been absent the longest.
//!
//! Every function takes the records in any order and recomputes everything
//! from scratch.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Appearance, GapRecord, HistoricalRecord, OverdueReport, StreakGroup, POOL_SIZE};

/// Appearances per number, in input order. Numbers never drawn have no entry.
pub fn appearances(records: &[HistoricalRecord]) -> BTreeMap<u8, Vec<Appearance>> {
    let mut map: BTreeMap<u8, Vec<Appearance>> = BTreeMap::new();
    for record in records {
        for &n in record.numbers.numbers() {
            map.entry(n).or_default().push(Appearance {
                contest_id: record.contest_id,
                draw_date: record.draw_date,
            });
        }
    }
    map
}

fn gaps_of(number: u8, seen: &[Appearance]) -> Vec<GapRecord> {
    let mut dates: Vec<NaiveDate> = seen.iter().map(|a| a.draw_date).collect();
    dates.sort();
    dates
        .windows(2)
        .map(|w| GapRecord {
            number,
            previous_date: w[0],
            next_date: w[1],
            days_elapsed: (w[1] - w[0]).num_days(),
        })
        .collect()
}

/// Gap records of one number, in date order.
pub fn number_gaps(records: &[HistoricalRecord], number: u8) -> AnalysisResult<Vec<GapRecord>> {
    let seen: Vec<Appearance> = records
        .iter()
        .filter(|r| r.numbers.contains(number))
        .map(|r| Appearance {
            contest_id: r.contest_id,
            draw_date: r.draw_date,
        })
        .collect();
    if seen.len() < 2 {
        return Err(AnalysisError::InsufficientHistory {
            number,
            appearances: seen.len(),
        });
    }
    Ok(gaps_of(number, &seen))
}

/// Longest stretch of days between two consecutive appearances of a number.
///
/// Ties go to the lowest number, then to the earliest `previous_date`.
/// Numbers seen fewer than twice are skipped; when none qualifies the call
/// fails with `EmptyInput`.
pub fn largest_gap(records: &[HistoricalRecord]) -> AnalysisResult<GapRecord> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyInput {
            operation: "largest_gap",
        });
    }

    let mut best: Option<GapRecord> = None;
    for (number, seen) in appearances(records) {
        if seen.len() < 2 {
            log::debug!("Dezena {} ignorada: {} aparição", number, seen.len());
            continue;
        }
        for gap in gaps_of(number, &seen) {
            // Numbers come in ascending order, so only a strictly larger gap wins.
            let better = match &best {
                None => true,
                Some(b) => gap.days_elapsed > b.days_elapsed,
            };
            if better {
                best = Some(gap);
            }
        }
    }

    best.ok_or(AnalysisError::EmptyInput {
        operation: "largest_gap",
    })
}

fn streaks_of(number: u8, seen: &[Appearance]) -> Vec<StreakGroup> {
    let mut contests: Vec<u32> = seen.iter().map(|a| a.contest_id).collect();
    contests.sort_unstable();

    let mut groups: Vec<StreakGroup> = Vec::new();
    let mut current: Vec<u32> = Vec::new();
    for id in contests {
        match current.last() {
            Some(&prev) if id.checked_sub(prev) == Some(1) => current.push(id),
            Some(_) => {
                groups.push(StreakGroup {
                    number,
                    contest_ids: std::mem::take(&mut current),
                });
                current.push(id);
            }
            None => current.push(id),
        }
    }
    if !current.is_empty() {
        groups.push(StreakGroup {
            number,
            contest_ids: current,
        });
    }
    groups
}

/// Every run of consecutive contests that reaches the record length.
///
/// All numbers sharing the record are returned, ordered by number then by
/// first contest. An empty history yields an empty list.
pub fn longest_streaks(records: &[HistoricalRecord]) -> Vec<StreakGroup> {
    let all: Vec<StreakGroup> = appearances(records)
        .iter()
        .flat_map(|(&number, seen)| streaks_of(number, seen))
        .collect();

    let Some(max_len) = all.iter().map(StreakGroup::len).max() else {
        return Vec::new();
    };

    all.into_iter().filter(|g| g.len() == max_len).collect()
}

/// Number with the most days since its last appearance, measured against
/// the latest draw date of the history. Ties go to the lowest number.
pub fn most_overdue(records: &[HistoricalRecord]) -> AnalysisResult<OverdueReport> {
    let reference_date = records
        .iter()
        .map(|r| r.draw_date)
        .max()
        .ok_or(AnalysisError::EmptyInput {
            operation: "most_overdue",
        })?;

    let seen = appearances(records);
    let never_drawn: Vec<u8> = (1..=POOL_SIZE).filter(|n| !seen.contains_key(n)).collect();
    if !never_drawn.is_empty() {
        log::warn!(
            "{} dezena(s) nunca sorteada(s) no histórico: {:?}",
            never_drawn.len(),
            never_drawn
        );
    }

    let mut best: Option<(u8, NaiveDate, i64)> = None;
    for (&number, list) in &seen {
        let Some(last_seen) = list.iter().map(|a| a.draw_date).max() else {
            continue;
        };
        let days_since = (reference_date - last_seen).num_days();
        let better = match best {
            None => true,
            Some((_, _, d)) => days_since > d,
        };
        if better {
            best = Some((number, last_seen, days_since));
        }
    }

    let (number, last_seen, days_since) = best.ok_or(AnalysisError::EmptyInput {
        operation: "most_overdue",
    })?;

    Ok(OverdueReport {
        number,
        last_seen,
        days_since,
        reference_date,
        never_drawn,
    })
}
