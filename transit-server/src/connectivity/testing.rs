//! Scripted probe for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::probe::{Probe, ProbeFuture};

/// Probe that replays a fixed sequence of results, then reports offline.
pub(crate) struct ScriptProbe {
    results: Mutex<VecDeque<bool>>,
}

impl ScriptProbe {
    pub(crate) fn new(results: &[bool]) -> Self {
        Self {
            results: Mutex::new(results.iter().copied().collect()),
        }
    }
}

impl Probe for ScriptProbe {
    fn check(&self) -> ProbeFuture {
        let result = self
            .results
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .unwrap_or(false);
        Box::pin(async move { result })
    }
}
