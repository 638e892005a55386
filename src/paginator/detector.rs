use crate::state::PageResult;

/// Outcome of observing a released page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Stop,
}

/// Detects the end of a listing from a run of blank pages
///
/// Pages are observed in release order. Each `Empty` or `Omitted` page extends
/// the run, any page with items resets it, and the run ends the listing once
/// it reaches the threshold. A burst of omitted pages in the middle of a
/// listing also ends it.
#[derive(Debug, Clone)]
pub struct EndOfListingDetector {
    threshold: u32,
    consecutive: u32,
}

impl EndOfListingDetector {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive: 0,
        }
    }

    pub fn observe(&mut self, result: &PageResult) -> Verdict {
        if result.is_blank() {
            self.consecutive += 1;
        } else {
            self.consecutive = 0;
        }

        if self.consecutive >= self.threshold {
            Verdict::Stop
        } else {
            Verdict::Continue
        }
    }

    /// Length of the current run of blank pages
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
