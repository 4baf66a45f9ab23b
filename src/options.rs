//! Apply-time configuration.

/// Options controlling how edits are re-applied to a document.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Font-fit parameters for PDF replacement text
    pub fit: FitOptions,

    /// What to do with insertions aimed at a PDF
    pub pdf_insertions: InsertionPolicy,
}

impl ApplyOptions {
    /// Create new apply options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font-fit parameters.
    pub fn with_fit(mut self, fit: FitOptions) -> Self {
        self.fit = fit;
        self
    }

    /// Set the PDF insertion policy.
    pub fn with_pdf_insertions(mut self, policy: InsertionPolicy) -> Self {
        self.pdf_insertions = policy;
        self
    }

    /// Reject PDF insertions instead of ignoring them.
    pub fn strict_insertions(mut self) -> Self {
        self.pdf_insertions = InsertionPolicy::Reject;
        self
    }
}

/// Handling of insertions for formats with no insertion support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionPolicy {
    /// Drop them and carry on
    #[default]
    Ignore,
    /// Fail the whole apply with `Error::UnsupportedInsertion`
    Reject,
}

/// Parameters of the shrink-to-fit loop used when redrawing PDF lines.
///
/// Replacement text is always set in Helvetica, whose metrics drive the fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Lower clamp for the starting size
    pub min_start_size: f32,
    /// Upper clamp for the starting size
    pub max_start_size: f32,
    /// Size reduction per failed attempt
    pub step: f32,
    /// Size never goes below this
    pub floor: f32,
    /// Number of fit attempts before the unconditional render
    pub max_attempts: u32,
    /// Line advance as a multiple of the font size
    pub line_height: f32,
}

impl FitOptions {
    /// Create fit options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting-size clamp range.
    pub fn with_start_range(mut self, min: f32, max: f32) -> Self {
        self.min_start_size = min;
        self.max_start_size = max;
        self
    }

    /// Set the shrink step.
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Set the size floor.
    pub fn with_floor(mut self, floor: f32) -> Self {
        self.floor = floor;
        self
    }

    /// Set the maximum number of fit attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Clamp an extracted font size into the starting range.
    pub fn start_size(&self, extracted: f32) -> f32 {
        let size = if extracted.is_finite() && extracted > 0.0 {
            extracted
        } else {
            10.0
        };
        size.clamp(self.min_start_size, self.max_start_size)
    }

    /// The size tried after `size` failed.
    pub fn next_size(&self, size: f32) -> f32 {
        (size - self.step).max(self.floor)
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            min_start_size: 6.0,
            max_start_size: 18.0,
            step: 0.7,
            floor: 5.0,
            max_attempts: 8,
            line_height: 1.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_options_builder() {
        let options = ApplyOptions::new()
            .strict_insertions()
            .with_fit(FitOptions::new().with_max_attempts(3));

        assert_eq!(options.pdf_insertions, InsertionPolicy::Reject);
        assert_eq!(options.fit.max_attempts, 3);

        let relaxed = options.with_pdf_insertions(InsertionPolicy::Ignore);
        assert_eq!(relaxed.pdf_insertions, InsertionPolicy::Ignore);
    }

    #[test]
    fn test_fit_options_builder() {
        let fit = FitOptions::new()
            .with_start_range(8.0, 12.0)
            .with_step(1.0)
            .with_floor(7.5);

        assert_eq!(fit.start_size(4.0), 8.0);
        assert_eq!(fit.start_size(20.0), 12.0);
        assert_eq!(fit.next_size(10.0), 9.0);
        assert_eq!(fit.next_size(8.0), 7.5);
    }

    #[test]
    fn test_default_options() {
        let options = ApplyOptions::default();
        assert_eq!(options.pdf_insertions, InsertionPolicy::Ignore);
        assert_eq!(options.fit.max_attempts, 8);
        assert_eq!(options.fit, FitOptions::new());
    }

    #[test]
    fn test_start_size_clamped() {
        let fit = FitOptions::default();
        assert_eq!(fit.start_size(10.0), 10.0);
        assert_eq!(fit.start_size(3.0), 6.0);
        assert_eq!(fit.start_size(40.0), 18.0);
        assert_eq!(fit.start_size(f32::NAN), 10.0);
    }

    #[test]
    fn test_next_size_respects_floor() {
        let fit = FitOptions::default();
        assert!((fit.next_size(10.0) - 9.3).abs() < 1e-4);
        assert_eq!(fit.next_size(5.3), 5.0);
        assert_eq!(fit.next_size(5.0), 5.0);
    }
}
