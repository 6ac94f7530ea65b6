use std::time::{Duration, Instant};

use log::debug;

/// Before/after marker placed around a test body.
///
/// `begin` records the start of a run and the bracket records its end when
/// dropped, so an early return or a failed assertion still closes it. Code
/// under test never sees the bracket.
#[derive(Debug)]
pub struct RunBracket {
    name: String,
    started: Instant,
    ended: bool,
}

impl RunBracket {
    pub fn begin(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!("run begin: {}", name);
        Self {
            name,
            started: Instant::now(),
            ended: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Closes the bracket and returns how long the run took.
    pub fn end(mut self) -> Duration {
        self.finish()
    }

    fn finish(&mut self) -> Duration {
        let elapsed = self.elapsed();
        if !self.ended {
            self.ended = true;
            debug!("run end: {} after {:?}", self.name, elapsed);
        }
        elapsed
    }
}

impl Drop for RunBracket {
    fn drop(&mut self) {
        self.finish();
    }
}
