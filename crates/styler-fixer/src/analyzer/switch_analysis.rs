//! Switch layout elements

/// One `case`/`default` label, identified by its terminating `:` or `;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseAnalysis {
    index: usize,
}

impl CaseAnalysis {
    pub(crate) fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Boundaries of a switch's case body plus its top-level labels in source
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchAnalysis {
    cases_start: usize,
    cases_end: usize,
    cases: Vec<CaseAnalysis>,
}

impl SwitchAnalysis {
    pub(crate) fn new(cases_start: usize, cases_end: usize, cases: Vec<CaseAnalysis>) -> Self {
        Self {
            cases_start,
            cases_end,
            cases,
        }
    }

    pub fn cases_start(&self) -> usize {
        self.cases_start
    }

    pub fn cases_end(&self) -> usize {
        self.cases_end
    }

    pub fn cases(&self) -> &[CaseAnalysis] {
        &self.cases
    }
}
