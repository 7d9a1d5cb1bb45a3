use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use megasena_core::chrono::NaiveDate;
use megasena_core::error::AnalysisError;
use megasena_core::models::{HistoricalRecord, PICK_COUNT};

/// Searched in order when no file is given on the command line.
pub const DEFAULT_HISTORY_PATHS: [&str; 3] = [
    "./data/megasena_full_history.csv",
    "../data/megasena_full_history.csv",
    "megasena_full_history.csv",
];

const CONTEST_COLUMNS: [&str; 2] = ["Concurso", "concurso"];
const DATE_COLUMNS: [&str; 3] = ["Data do Sorteio", "Data Sorteio", "data_do_sorteio"];

pub struct ImportResult {
    pub total_records: u32,
    pub loaded: u32,
    /// Rows whose date could not be parsed (dropped, as the official export
    /// carries some blank trailing lines).
    pub dropped_dates: u32,
    pub errors: u32,
}

pub struct LoadedHistory {
    pub path: PathBuf,
    pub records: Vec<HistoricalRecord>,
    pub summary: ImportResult,
}

struct Columns {
    contest: usize,
    date: usize,
    balls: [usize; PICK_COUNT],
}

pub fn resolve_history_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    DEFAULT_HISTORY_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .with_context(|| format!("Data inválida: '{}'", raw))
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim() == *a))
}

fn locate_columns(headers: &csv::StringRecord) -> Result<Columns> {
    let contest = find_column(headers, &CONTEST_COLUMNS)
        .with_context(|| format!("Coluna 'Concurso' não encontrada em {:?}", headers))?;
    let date = find_column(headers, &DATE_COLUMNS)
        .with_context(|| format!("Coluna 'Data do Sorteio' não encontrada em {:?}", headers))?;

    let mut balls = [0usize; PICK_COUNT];
    for (i, slot) in balls.iter_mut().enumerate() {
        let upper = format!("Bola{}", i + 1);
        let lower = format!("bola{}", i + 1);
        *slot = find_column(headers, &[upper.as_str(), lower.as_str()])
            .with_context(|| format!("Coluna '{}' não encontrada", upper))?;
    }

    Ok(Columns {
        contest,
        date,
        balls,
    })
}

enum RowOutcome {
    Record(HistoricalRecord),
    BadDate(String),
}

fn parse_row(record: &csv::StringRecord, columns: &Columns) -> Result<RowOutcome, AnalysisError> {
    let get = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");

    // Undated rows are dropped before anything else is checked.
    let raw_date = get(columns.date);
    let Ok(draw_date) = parse_date(raw_date) else {
        return Ok(RowOutcome::BadDate(raw_date.to_string()));
    };

    let raw_contest = get(columns.contest);
    let contest_id: u32 = raw_contest.parse().map_err(|_| {
        AnalysisError::malformed(None, format!("concurso inválido: '{}'", raw_contest))
    })?;

    let mut numbers = [0u8; PICK_COUNT];
    for (slot, &idx) in numbers.iter_mut().zip(columns.balls.iter()) {
        let raw = get(idx);
        *slot = raw.parse().map_err(|_| {
            AnalysisError::malformed(Some(contest_id), format!("dezena inválida: '{}'", raw))
        })?;
    }

    HistoricalRecord::new(contest_id, draw_date, &numbers).map(RowOutcome::Record)
}

fn parse_with_delimiter(content: &str, delimiter: u8) -> Result<(Vec<HistoricalRecord>, ImportResult)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Cabeçalho ilegível")?.clone();
    let columns = locate_columns(&headers)?;

    let mut records = Vec::new();
    let mut result = ImportResult {
        total_records: 0,
        loaded: 0,
        dropped_dates: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_row(&record, &columns) {
                Ok(RowOutcome::Record(r)) => {
                    records.push(r);
                    result.loaded += 1;
                }
                Ok(RowOutcome::BadDate(raw)) => {
                    log::warn!("Linha {}: data '{}' descartada", result.total_records, raw);
                    result.dropped_dates += 1;
                }
                Err(e) => {
                    log::warn!("Erro na linha {}: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                log::warn!("Erro de leitura na linha {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    Ok((records, result))
}

/// Parses a history table, `;`-separated first, then `,`-separated.
pub fn parse_history(content: &str) -> Result<(Vec<HistoricalRecord>, ImportResult)> {
    match parse_with_delimiter(content, b';') {
        Ok(parsed) => Ok(parsed),
        Err(first) => {
            log::debug!("Separador ';' rejeitado ({}), tentando ','", first);
            parse_with_delimiter(content, b',')
        }
    }
}

pub fn load_history(explicit: Option<&Path>) -> Result<LoadedHistory> {
    let Some(path) = resolve_history_path(explicit) else {
        bail!(
            "Arquivo de histórico não encontrado (procurado em {:?})",
            DEFAULT_HISTORY_PATHS
        );
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Impossível ler {:?}", path))?;
    let (records, summary) =
        parse_history(&content).with_context(|| format!("Formato inesperado em {:?}", path))?;

    log::info!("{} concursos carregados de {:?}", records.len(), path);

    Ok(LoadedHistory {
        path,
        records,
        summary,
    })
}
