//! Top-3 ranking of raw classification scores

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::labels::LabelTable;

/// Number of ranked entries reported per classification.
pub const TOP_K: usize = 3;

/// Label shown for score indices outside the label table.
const UNKNOWN_LABEL: &str = "Unknown";

/// One ranked prediction.
#[derive(Debug, Clone, Serialize)]
pub struct RankedLabel {
    /// Class id (index into the model's output vector)
    pub class_id: usize,
    /// Human-readable label
    pub label: String,
    /// Confidence as a percentage
    pub confidence: f32,
}

/// Ranked result for a single image.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// Up to three predictions, best first
    pub results: Vec<RankedLabel>,
    /// Wall-clock time spent inside the inference call, in milliseconds
    pub inference_time_ms: u64,
}

/// Select the top-3 scoring classes, best first.
///
/// Returns `min(3, scores.len())` entries. The sort is stable, so equal
/// scores keep their class-id order.
#[must_use]
pub fn rank(scores: &[f32], labels: &LabelTable, inference_time_ms: u64) -> Classification {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let results = indexed
        .into_iter()
        .take(TOP_K)
        .map(|(class_id, score)| RankedLabel {
            class_id,
            label: labels
                .get(class_id)
                .unwrap_or(UNKNOWN_LABEL)
                .to_string(),
            confidence: score * 100.0,
        })
        .collect();

    Classification {
        results,
        inference_time_ms,
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results (inference time: {}ms):", self.inference_time_ms)?;
        for (position, result) in self.results.iter().enumerate() {
            writeln!(
                f,
                "{}. {} ({:.1}%)",
                position + 1,
                result.label,
                result.confidence
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(value: f32, expected: f32) -> bool {
        (value - expected).abs() < 1e-4
    }

    #[test]
    fn test_top3_descending() {
        let labels = LabelTable::parse("cat\ndog\nbird\n");
        let result = rank(&[0.1, 0.7, 0.2], &labels, 0);

        assert_eq!(result.results.len(), 3);
        assert_eq!(result.results[0].label, "dog");
        assert!(close_to(result.results[0].confidence, 70.0));
        assert_eq!(result.results[1].label, "bird");
        assert!(close_to(result.results[1].confidence, 20.0));
        assert_eq!(result.results[2].label, "cat");
        assert!(close_to(result.results[2].confidence, 10.0));
    }

    #[test]
    fn test_fewer_scores_than_top_k() {
        let labels = LabelTable::parse("cat\ndog\n");
        let result = rank(&[0.4, 0.6], &labels, 0);

        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[0].label, "dog");
    }

    #[test]
    fn test_ties_keep_class_order() {
        let labels = LabelTable::parse("a\nb\nc\nd\n");
        let result = rank(&[0.5, 0.5, 0.1, 0.5], &labels, 0);

        assert_eq!(result.results[0].class_id, 0);
        assert_eq!(result.results[1].class_id, 1);
        assert_eq!(result.results[2].class_id, 3);
    }

    #[test]
    fn test_index_past_label_table_is_unknown() {
        let labels = LabelTable::parse("cat\ndog\n");
        let result = rank(&[0.1, 0.2, 0.9], &labels, 0);

        assert_eq!(result.results[0].class_id, 2);
        assert_eq!(result.results[0].label, "Unknown");
    }

    #[test]
    fn test_display_format() {
        let labels = LabelTable::parse("cat\ndog\nbird\n");
        let result = rank(&[0.1, 0.7, 0.2], &labels, 12);

        assert_eq!(
            result.to_string(),
            "Results (inference time: 12ms):\n\
             1. dog (70.0%)\n\
             2. bird (20.0%)\n\
             3. cat (10.0%)\n"
        );
    }

    #[test]
    fn test_serializes_to_json() {
        let labels = LabelTable::parse("cat\n");
        let result = rank(&[0.5], &labels, 3);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["inference_time_ms"], 3);
        assert_eq!(json["results"][0]["label"], "cat");
    }
}
