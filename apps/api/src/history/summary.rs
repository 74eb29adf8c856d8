//! History digest — bounded textual projection of the log for prompt inclusion.

use crate::models::record::{HistoryLog, TIMESTAMP_FORMAT};

/// Digest emitted when no prior evaluations exist. Kept in the prompt
/// language; the evaluation template embeds this string verbatim and tells
/// the model how to react to it.
pub const NO_HISTORY_SENTINEL: &str = "Nenhum histórico de feedback anterior disponível.";

/// Renders the log as one fixed-shape block per record, oldest first.
///
/// Blocks carry the bounded `summary`, never `full_text`, so the digest stays
/// within the prompt budget no matter how verbose past critiques were. The
/// digest is a concatenation of whole blocks; it is never cut mid-record.
pub fn summarize(log: &HistoryLog) -> String {
    if log.is_empty() {
        return NO_HISTORY_SENTINEL.to_string();
    }

    let mut digest = String::new();
    for (i, record) in log.iter().enumerate() {
        digest.push_str(&format!(
            "--- Feedback {n} ---\nData: {data}\nArquivo: {arquivo}\nNota: {nota}\nResumo: {resumo}\n\n",
            n = i + 1,
            data = record.timestamp.format(TIMESTAMP_FORMAT),
            arquivo = record.source_name,
            nota = record.score,
            resumo = record.summary,
        ));
    }
    digest
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::models::record::{EvaluationRecord, Score};

    use super::*;

    fn record(day: u32, source_name: &str, score: Score) -> EvaluationRecord {
        EvaluationRecord {
            timestamp: NaiveDate::from_ymd_opt(2025, 4, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            source_name: source_name.to_string(),
            score,
            summary: format!("Resumo de {source_name}"),
            full_text: format!("Texto completo e muito mais longo de {source_name}"),
        }
    }

    #[test]
    fn test_empty_log_yields_sentinel() {
        assert_eq!(summarize(&Vec::new()), NO_HISTORY_SENTINEL);
    }

    #[test]
    fn test_one_block_per_record() {
        let log = vec![
            record(1, "a.txt", Score::Value(5.0)),
            record(2, "b.txt", Score::Value(7.5)),
            record(3, "c.txt", Score::Unavailable),
        ];
        let digest = summarize(&log);
        assert_eq!(digest.matches("--- Feedback").count(), log.len());
    }

    #[test]
    fn test_blocks_preserve_log_order() {
        let log = vec![
            record(1, "primeira.txt", Score::Value(4.0)),
            record(2, "segunda.txt", Score::Value(8.0)),
        ];
        let digest = summarize(&log);
        let first = digest.find("primeira.txt").unwrap();
        let second = digest.find("segunda.txt").unwrap();
        assert!(first < second);
        assert!(digest.find("--- Feedback 1 ---").unwrap() < digest.find("--- Feedback 2 ---").unwrap());
    }

    #[test]
    fn test_block_carries_record_fields() {
        let log = vec![record(9, "entrevista.txt", Score::Value(6.5))];
        let digest = summarize(&log);
        assert!(digest.contains("Data: 2025-04-09 10:00:00"));
        assert!(digest.contains("Arquivo: entrevista.txt"));
        assert!(digest.contains("Nota: 6.5"));
        assert!(digest.contains("Resumo: Resumo de entrevista.txt"));
    }

    #[test]
    fn test_unavailable_score_renders_sentinel() {
        let log = vec![record(9, "a.txt", Score::Unavailable)];
        assert!(summarize(&log).contains("Nota: N/A"));
    }

    #[test]
    fn test_digest_excludes_full_text() {
        let log = vec![record(9, "a.txt", Score::Value(6.0))];
        assert!(!summarize(&log).contains("Texto completo"));
    }
}
