use thiserror::Error;

/// Errors raised by record validation and by the history aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A historical row does not describe a valid draw.
    #[error("Registro malformado (concurso {}): {reason}", contest_label(.contest_id))]
    MalformedRecord {
        contest_id: Option<u32>,
        reason: String,
    },

    /// An aggregate was asked for on a history with no usable data.
    #[error("Histórico vazio para {operation}")]
    EmptyInput { operation: &'static str },

    /// Fewer than two appearances, so the number has no gap.
    #[error("Dezena {number} com apenas {appearances} aparição(ões)")]
    InsufficientHistory { number: u8, appearances: usize },

    #[error("Configuração inválida: {0}")]
    InvalidConfig(String),
}

fn contest_label(contest_id: &Option<u32>) -> String {
    match contest_id {
        Some(id) => id.to_string(),
        None => "?".to_string(),
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    pub fn malformed(contest_id: Option<u32>, reason: impl Into<String>) -> Self {
        AnalysisError::MalformedRecord {
            contest_id,
            reason: reason.into(),
        }
    }
}
