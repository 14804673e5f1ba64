// src/crawl/barrier.rs
// =============================================================================
// A countdown latch for one depth of the crawl.
//
// Every link dispatched at a depth produces exactly one result (extracted
// links or a failure). The coordinator may only move on to the next depth
// once all of them have come back, otherwise late results would be counted
// against the wrong depth.
// =============================================================================

/// Tracks how many results are still outstanding for the current depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthBarrier {
    depth: usize,
    expected: usize,
    arrived: usize,
}

impl DepthBarrier {
    pub fn new(depth: usize, expected: usize) -> Self {
        Self {
            depth,
            expected,
            arrived: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Records one result. Returns true once every expected result is in.
    pub fn arrive(&mut self) -> bool {
        self.arrived += 1;
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.arrived >= self.expected
    }

    pub fn outstanding(&self) -> usize {
        self.expected.saturating_sub(self.arrived)
    }
}
