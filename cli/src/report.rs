use magswipe_core::{Direction, SwipeDecode};
use serde::Serialize;

/// JSON-friendly summary of one swipe decode
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DecodeSummary {
    pub success: bool,
    /// Decoded track text, or the partial text read before the failure
    pub data: String,
    /// Diagnostic name of the failure, e.g. `LRC_INVALID`
    pub error: Option<&'static str>,
    /// Legacy status code: 0 on success, -1 through -6 on failure
    pub code: i32,
    pub direction: &'static str,
    /// Forward failure when only the reversed buffer decoded
    pub forward_error: Option<&'static str>,
    pub samples: usize,
    pub peaks: usize,
    pub bits: usize,
}

impl DecodeSummary {
    pub fn new(swipe: &SwipeDecode, samples: usize) -> Self {
        let report = &swipe.report;
        let kind = report.error_kind();
        Self {
            success: report.is_success(),
            data: report.text().to_string(),
            error: kind.map(|k| k.name()),
            code: kind.map_or(0, |k| k.code()),
            direction: match swipe.direction {
                Direction::Forward => "forward",
                Direction::Reverse => "reverse",
            },
            forward_error: swipe.forward_failure.as_ref().map(|f| f.kind.name()),
            samples,
            peaks: report.peak_count,
            bits: report.bit_count,
        }
    }

    /// Human readable form, in the layout of the reader's status display
    pub fn render(&self) -> String {
        let status = match self.error {
            None => "Success".to_string(),
            Some(name) => format!("Error: {}", name),
        };
        format!("Data:\n{}\n\n{} ({} swipe)", self.data, status, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magswipe_core::{decode_bidirectional, Track2Encoder};

    #[test]
    fn test_summary_of_success() {
        let samples = Track2Encoder::new().encode("1234").unwrap();
        let summary = DecodeSummary::new(&decode_bidirectional(&samples), samples.len());
        assert!(summary.success);
        assert_eq!(summary.data, ";1234?");
        assert_eq!(summary.code, 0);
        assert_eq!(summary.direction, "forward");
        assert!(summary.render().contains("Success"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["data"], ";1234?");
        assert!(json["error"].is_null());
    }

    #[test]
    fn test_summary_of_failure() {
        let summary = DecodeSummary::new(&decode_bidirectional(&[0; 10]), 10);
        assert!(!summary.success);
        assert_eq!(summary.error, Some("NOT_ENOUGH_PEAKS"));
        assert_eq!(summary.forward_error, Some("NOT_ENOUGH_PEAKS"));
        assert_eq!(summary.code, -1);
        assert_eq!(summary.direction, "reverse");
        assert!(summary.render().contains("Error: NOT_ENOUGH_PEAKS"));
    }
}
