//! Generation report aggregating a cross-product run.

use std::fmt;

/// Summary of one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// (architecture, variant, thread-count) pairs emitted.
    pub pairs_emitted: usize,
    /// Pairs skipped because the architecture does not declare the variant.
    pub pairs_skipped: usize,
    /// Bytes left unused by floor division, summed over emitted pairs.
    pub residual_bytes: u64,
    /// Entries that failed validation: (function key, error description).
    pub failures: Vec<(String, String)>,
}

impl GenerationReport {
    /// Whether every planned entry emitted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Generation Report ===")?;
        writeln!(f, "Pairs emitted: {}", self.pairs_emitted)?;
        writeln!(
            f,
            "Pairs skipped (variant not declared): {}",
            self.pairs_skipped
        )?;
        writeln!(
            f,
            "Residual bytes unused by floor division: {}",
            self.residual_bytes
        )?;
        if !self.failures.is_empty() {
            writeln!(f, "Failures:")?;
            for (key, error) in &self.failures {
                writeln!(f, "  {key}: {error}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_display() {
        let report = GenerationReport {
            pairs_emitted: 6,
            pairs_skipped: 1,
            residual_bytes: 0,
            failures: vec![("skl_xeonsp_sse2_64t".into(), "line budget".into())],
        };
        let text = format!("{report}");
        assert!(text.contains("Generation Report"));
        assert!(text.contains("Pairs emitted: 6"));
        assert!(text.contains("skl_xeonsp_sse2_64t: line budget"));
        assert!(!report.is_clean());
    }
}
