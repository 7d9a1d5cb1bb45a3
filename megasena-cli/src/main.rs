mod display;
mod import;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use megasena_core::chrono::{Local, NaiveDate};
use megasena_core::config::{ChartSelection, SimulationConfig};
use megasena_core::history::{largest_gap, longest_streaks, most_overdue};
use megasena_core::models::HistoricalRecord;
use megasena_core::sampler::{sample_batch, seeded_rng};
use megasena_core::simulation::simulate;
use megasena_core::stats::{FrequencyTable, date_range, draw_sums, filter_by_date, sum_counts, sum_summary};

use crate::display::{
    display_exact_sums, display_frequency, display_games, display_largest_gap, display_load_summary,
    display_overdue, display_streaks, display_sum_distribution, display_sum_summary, format_date,
    format_thousands,
};

#[derive(Parser)]
#[command(name = "megasena", about = "Simulação e estatísticas da Mega-Sena")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Gerar jogos aleatórios (6 dezenas entre 1 e 60)
    Generate {
        /// Quantidade de jogos (bolão)
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed para a reprodutibilidade (padrão: entropia do sistema)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Simular jogos em paralelo e comparar com o histórico
    Simulate {
        /// Arquivo de configuração JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Total de jogos simulados
        #[arg(short, long)]
        total: Option<usize>,

        /// Número de workers (padrão: núcleos disponíveis)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Seed para a reprodutibilidade
        #[arg(long)]
        seed: Option<u64>,

        /// Arquivo CSV do histórico
        #[arg(long)]
        history: Option<PathBuf>,

        /// Início do período histórico (DD/MM/AAAA)
        #[arg(long, value_parser = parse_cli_date)]
        from: Option<NaiveDate>,

        /// Fim do período histórico (DD/MM/AAAA)
        #[arg(long, value_parser = parse_cli_date)]
        to: Option<NaiveDate>,

        /// Considerar apenas os N primeiros jogos simulados
        #[arg(long)]
        first: Option<usize>,

        /// Gráficos exibidos
        #[arg(long)]
        show: Option<ChartSelection>,

        /// Número de classes do histograma das somas
        #[arg(long)]
        bins: Option<usize>,
    },

    /// Lei dos grandes números e teorema do limite central por tamanho de amostra
    Scenarios {
        /// Arquivo de configuração JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tamanhos de amostra (separados por vírgulas)
        #[arg(short, long)]
        sizes: Option<String>,

        /// Número de workers (padrão: núcleos disponíveis)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Seed para a reprodutibilidade
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Recordes do histórico (maior intervalo, maior sequência, dezena mais atrasada)
    Records {
        /// Arquivo CSV do histórico
        #[arg(long)]
        history: Option<PathBuf>,
    },
}

/// Date of the first Mega-Sena contest, start of the default window.
fn first_contest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1996, 3, 11).unwrap_or_default()
}

fn parse_cli_date(raw: &str) -> Result<NaiveDate, String> {
    import::parse_date(raw).map_err(|e| format!("{e:#}. Use DD/MM/AAAA."))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate { count, seed } => cmd_generate(count, seed),
        Command::Simulate {
            config,
            total,
            workers,
            seed,
            history,
            from,
            to,
            first,
            show,
            bins,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            cfg.total_draws = total.unwrap_or(cfg.total_draws);
            cfg.workers = workers.or(cfg.workers);
            cfg.seed = seed.or(cfg.seed);
            cfg.history_path = history.or(cfg.history_path);
            cfg.show = show.unwrap_or(cfg.show);
            cfg.histogram_bins = bins.unwrap_or(cfg.histogram_bins);
            cfg.validate()?;
            cmd_simulate(&cfg, from, to, first)
        }
        Command::Scenarios {
            config,
            sizes,
            workers,
            seed,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(raw) = sizes {
                cfg.scenario_sizes = parse_sizes(&raw)?;
            }
            cfg.workers = workers.or(cfg.workers);
            cfg.seed = seed.or(cfg.seed);
            cfg.validate()?;
            cmd_scenarios(&cfg)
        }
        Command::Records { history } => cmd_records(history.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(p) => SimulationConfig::load(p)
            .with_context(|| format!("Impossível carregar a configuração {:?}", p)),
        None => Ok(SimulationConfig::default()),
    }
}

fn parse_sizes(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(|s| s.trim().replace(['.', '_'], "").parse::<usize>())
        .collect::<Result<_, _>>()
        .context("Formato de tamanhos inválido")
}

fn cmd_generate(count: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let games = sample_batch(count, &mut rng);
    println!("Seus jogos:");
    display_games(&games);
    Ok(())
}

/// Loads the history, or warns and returns an empty one.
fn load_history_or_warn(path: Option<&Path>) -> Vec<HistoricalRecord> {
    match import::load_history(path) {
        Ok(loaded) => {
            display_load_summary(&loaded.path, &loaded.summary);
            loaded.records
        }
        Err(e) => {
            log::warn!("Histórico indisponível: {e:#}");
            println!("Aviso: Não foi possível carregar o histórico ({e:#}).");
            Vec::new()
        }
    }
}

fn cmd_simulate(
    cfg: &SimulationConfig,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    first: Option<usize>,
) -> Result<()> {
    let workers = cfg.effective_workers();
    println!(
        "Iniciando simulação conjunta de {} jogos...",
        format_thousands(cfg.total_draws)
    );
    println!("Utilizando {} núcleos de processamento.", workers);

    let start = Instant::now();
    let sim = simulate(cfg.total_draws, workers, cfg.seed, true)?;
    println!(
        "\nSimulação concluída em {:.2} segundos.",
        start.elapsed().as_secs_f64()
    );

    if let Some(summary) = sum_summary(&sim.sums()) {
        display_sum_summary(&summary, "simulação");
    }

    let history = load_history_or_warn(cfg.history_path.as_deref());
    let (hist_min, hist_max) = date_range(&history).unwrap_or_else(|| {
        println!("AVISO: Histórico não carregado. Usando intervalo de datas padrão.");
        (first_contest_date(), Local::now().date_naive())
    });

    let start_date = from.unwrap_or(hist_min);
    let end_date = to.unwrap_or(hist_max);
    if start_date > end_date {
        bail!(
            "Período inválido: {} posterior a {}",
            format_date(start_date),
            format_date(end_date)
        );
    }

    let window = filter_by_date(&history, start_date, end_date);
    let subset = sim.first(first.unwrap_or(sim.len()));

    println!(
        "\nHistórico ({} jogos de {} a {}) + {} Simulações",
        format_thousands(window.len()),
        format_date(start_date),
        format_date(end_date),
        format_thousands(subset.len())
    );

    if cfg.show.shows_frequency() {
        let hist_freq = FrequencyTable::from_records(&window);
        let sim_freq = FrequencyTable::from_draws(subset);
        display_frequency(&hist_freq, &sim_freq);
    }

    if cfg.show.shows_sum() {
        let mut sums = draw_sums(window.iter().map(|r| &r.numbers));
        sums.extend(draw_sums(subset));
        display_sum_distribution(&sums, cfg.histogram_bins, "Histórico + Simulação");
        display_exact_sums(&sum_counts(&sums), "Histórico + Simulação");
    }

    Ok(())
}

fn cmd_scenarios(cfg: &SimulationConfig) -> Result<()> {
    if cfg.scenario_sizes.is_empty() {
        bail!("Nenhum tamanho de amostra informado");
    }
    let workers = cfg.effective_workers();

    println!("Simulação Mega-Sena: Lei dos Grandes Números e Teorema do Limite Central");
    println!("Iniciando simulação... Isso pode levar alguns segundos para N grandes.");

    for &n in &cfg.scenario_sizes {
        let start = Instant::now();
        let sim = simulate(n, workers, cfg.seed, true)?;
        let label = format!("N = {} jogos", format_thousands(n));

        display_frequency(&FrequencyTable::default(), &FrequencyTable::from_draws(sim.draws()));
        let sums = sim.sums();
        display_sum_distribution(&sums, cfg.histogram_bins, &label);
        display_exact_sums(&sum_counts(&sums), &label);
        if let Some(summary) = sum_summary(&sums) {
            display_sum_summary(&summary, &label);
        }

        println!(
            "Processado N={} em {:.4} segundos.",
            format_thousands(n),
            start.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

fn cmd_records(path: Option<&Path>) -> Result<()> {
    let loaded = import::load_history(path)?;
    display_load_summary(&loaded.path, &loaded.summary);
    if loaded.records.is_empty() {
        bail!("Nenhum concurso válido em {:?}", loaded.path);
    }

    let records = &loaded.records;
    display_largest_gap(&largest_gap(records));
    display_streaks(&longest_streaks(records));
    display_overdue(&most_overdue(records));

    Ok(())
}
