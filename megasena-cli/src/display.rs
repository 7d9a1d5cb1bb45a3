use std::collections::BTreeMap;

use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};
use textplots::{Chart, Plot, Shape};

use megasena_core::chrono::NaiveDate;
use megasena_core::error::AnalysisResult;
use megasena_core::models::{Draw, GapRecord, OverdueReport, StreakGroup, PICK_COUNT, POOL_SIZE};
use megasena_core::stats::{
    FrequencyTable, SumSummary, THEORETICAL_SUM_MEAN, sum_histogram, theoretical_sum_std_dev,
};

use crate::import::ImportResult;

const CHART_WIDTH: u32 = 120;
const CHART_HEIGHT: u32 = 40;

/// 1000000 -> "1.000.000"
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn display_games(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Nenhum jogo a exibir.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Dezenas", "Soma"]);

    for (i, draw) in draws.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            draw.to_string(),
            draw.sum().to_string(),
        ]);
    }

    println!("{table}");
}

pub fn display_load_summary(path: &std::path::Path, result: &ImportResult) {
    println!("Histórico carregado de {} :", path.display());
    println!("  Linhas lidas       : {}", result.total_records);
    println!("  Concursos válidos  : {}", result.loaded);
    if result.dropped_dates > 0 {
        println!("  Datas inválidas    : {}", result.dropped_dates);
    }
    if result.errors > 0 {
        println!("  Erros              : {}", result.errors);
    }
}

pub fn display_sum_summary(summary: &SumSummary, label: &str) {
    println!("\n── Estatísticas da soma ({label}) ──");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Medida", "Observado", "Teórico"]);

    table.add_row(vec![
        "Total de jogos".to_string(),
        format_thousands(summary.count),
        "-".to_string(),
    ]);
    table.add_row(vec![
        "Média das somas".to_string(),
        format!("{:.4}", summary.mean),
        format!("{:.1}", THEORETICAL_SUM_MEAN),
    ]);
    table.add_row(vec![
        "Desvio padrão".to_string(),
        format!("{:.4}", summary.std_dev),
        format!("{:.4}", theoretical_sum_std_dev()),
    ]);
    table.add_row(vec![
        "Mínimo / Máximo".to_string(),
        format!("{} / {}", summary.min, summary.max),
        "21 / 345".to_string(),
    ]);

    println!("{table}");
}

/// Counts per number, history stacked under simulation, with the mean line.
pub fn display_frequency(history: &FrequencyTable, simulation: &FrequencyTable) {
    let combined = history.merge(simulation);
    if combined.total() == 0 {
        println!("  (Nenhum jogo selecionado)");
        return;
    }

    println!("\n── Frequência das dezenas (Histórico + Simulação) ──\n");

    let mean = combined.mean_count();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Dezena", "Histórico", "Simulação", "Total", "Rel. %"]);

    for n in 1..=POOL_SIZE {
        let total = combined.count(n);
        let color = if (total as f64) >= mean { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(format!("{:2}", n)),
            Cell::new(history.count(n)),
            Cell::new(simulation.count(n)),
            Cell::new(total).fg(color),
            Cell::new(format!("{:.2}", combined.relative_percent(n))),
        ]);
    }
    println!("{table}");

    let bars: Vec<(f32, f32)> = (1..=POOL_SIZE)
        .map(|n| (n as f32, combined.count(n) as f32))
        .collect();
    let mean_line = [(0.0f32, mean as f32), (POOL_SIZE as f32 + 1.0, mean as f32)];
    let y_max = combined.counts().iter().copied().max().unwrap_or(1) as f32 * 1.1;

    println!("  Média por dezena : {:.2}", mean);
    Chart::new_with_y_range(CHART_WIDTH, CHART_HEIGHT, 0.0, POOL_SIZE as f32 + 1.0, 0.0, y_max)
        .lineplot(&Shape::Bars(&bars))
        .lineplot(&Shape::Lines(&mean_line))
        .display();
}

/// Histogram of draw sums with the sample mean and the theoretical mean.
pub fn display_sum_distribution(sums: &[u32], bins: usize, title: &str) {
    println!("\n── Distribuição da soma das 6 dezenas ({title}) ──\n");

    let hist = sum_histogram(sums, bins);
    if hist.is_empty() {
        println!("  (Nenhum jogo selecionado)");
        return;
    }

    let mean = sums.iter().map(|&s| s as f64).sum::<f64>() / sums.len() as f64;
    let bars: Vec<(f32, f32)> = hist.iter().map(|b| (b.center() as f32, b.count as f32)).collect();
    let y_max = hist.iter().map(|b| b.count).max().unwrap_or(1) as f32 * 1.1;
    let theory = [
        (THEORETICAL_SUM_MEAN as f32, 0.0f32),
        (THEORETICAL_SUM_MEAN as f32, y_max),
    ];

    let x_min = hist[0].start.min(THEORETICAL_SUM_MEAN) as f32 - 1.0;
    let x_max = hist[hist.len() - 1].end.max(THEORETICAL_SUM_MEAN) as f32 + 1.0;

    println!(
        "  Média: {:.2} | Média teórica: {:.0} | Jogos: {}",
        mean,
        THEORETICAL_SUM_MEAN,
        format_thousands(sums.len())
    );
    Chart::new_with_y_range(CHART_WIDTH, CHART_HEIGHT, x_min, x_max, 0.0, y_max)
        .lineplot(&Shape::Bars(&bars))
        .lineplot(&Shape::Lines(&theory))
        .display();
}

/// One point per possible sum (21..=345), zero where no game landed.
pub fn exact_sum_points(counts: &BTreeMap<u32, u64>) -> Vec<(f32, f32)> {
    let lo = (1..=PICK_COUNT as u32).sum::<u32>();
    let hi = (0..PICK_COUNT as u32).map(|i| POOL_SIZE as u32 - i).sum::<u32>();
    (lo..=hi)
        .map(|s| (s as f32, counts.get(&s).copied().unwrap_or(0) as f32))
        .collect()
}

/// Games per exact sum value, with the theoretical mean.
pub fn display_exact_sums(counts: &BTreeMap<u32, u64>, title: &str) {
    if counts.is_empty() {
        return;
    }
    println!("\n── Jogos por soma exata ({title}) ──\n");

    let points = exact_sum_points(counts);
    let x_min = points.first().map(|p| p.0).unwrap_or(0.0) - 1.0;
    let x_max = points.last().map(|p| p.0).unwrap_or(0.0) + 1.0;
    let y_max = counts.values().copied().max().unwrap_or(1) as f32 * 1.1;
    let theory = [
        (THEORETICAL_SUM_MEAN as f32, 0.0f32),
        (THEORETICAL_SUM_MEAN as f32, y_max),
    ];

    println!("  Somas distintas: {}", counts.len());
    Chart::new_with_y_range(CHART_WIDTH, CHART_HEIGHT, x_min, x_max, 0.0, y_max)
        .lineplot(&Shape::Bars(&points))
        .lineplot(&Shape::Lines(&theory))
        .display();
}

pub fn display_largest_gap(gap: &AnalysisResult<GapRecord>) {
    println!("{}", "-".repeat(30));
    println!("MAIOR INTERVALO ENCONTRADO:");
    match gap {
        Ok(g) => {
            println!("Dezena: {}", g.number);
            println!("Última aparição : {}", format_date(g.previous_date));
            println!("Reaparecimento  : {}", format_date(g.next_date));
            println!("Dias sem sair   : {}", g.days_elapsed);
        }
        Err(e) => println!("  ({e})"),
    }
    println!("{}", "-".repeat(30));
}

pub fn display_streaks(streaks: &[StreakGroup]) {
    let Some(record) = streaks.first().map(StreakGroup::len) else {
        println!("MAIOR SEQUÊNCIA DE SORTEIOS CONSECUTIVOS: (histórico vazio)");
        return;
    };

    println!("MAIOR SEQUÊNCIA DE SORTEIOS CONSECUTIVOS (Recorde: {} vezes):", record);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Dezena", "Concursos"]);

    for group in streaks {
        let contests = group
            .contest_ids
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![format!("{:2}", group.number), contests]);
    }
    println!("{table}");
    println!("{}", "-".repeat(30));
}

pub fn display_overdue(report: &AnalysisResult<OverdueReport>) {
    println!("DEZENA MAIS ATRASADA ATUALMENTE:");
    match report {
        Ok(r) => {
            println!("Dezena: {}", r.number);
            println!("Última vez sorteada: {}", format_date(r.last_seen));
            println!(
                "Dias sem sair: {} dias (em relação ao último sorteio da base: {})",
                r.days_since,
                format_date(r.reference_date)
            );
            if !r.never_drawn.is_empty() {
                let list = r
                    .never_drawn
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("Atenção: dezenas nunca sorteadas na base: {}", list);
            }
        }
        Err(e) => println!("  ({e})"),
    }
    println!("{}", "-".repeat(30));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1.000");
        assert_eq!(format_thousands(10_000), "10.000");
        assert_eq!(format_thousands(1_000_000), "1.000.000");
        assert_eq!(format_thousands(50_063_860), "50.063.860");
    }

    #[test]
    fn test_exact_sum_points_cover_every_sum() {
        let mut counts = BTreeMap::new();
        counts.insert(21, 2);
        counts.insert(183, 5);
        let points = exact_sum_points(&counts);
        assert_eq!(points.len(), 325);
        assert_eq!(points[0], (21.0, 2.0));
        assert_eq!(points[1], (22.0, 0.0));
        assert_eq!(points[183 - 21], (183.0, 5.0));
        assert_eq!(points[324], (345.0, 0.0));
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(1996, 3, 11).unwrap();
        assert_eq!(format_date(d), "11/03/1996");
    }
}
