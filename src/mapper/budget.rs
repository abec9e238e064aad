use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::MapperConfig;

/// Why a method pair was not mapped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapperAbort {
    #[error("mapping exceeded its time budget ({elapsed:?} > {budget:?})")]
    TimedOut { elapsed: Duration, budget: Duration },

    #[error("{statements} statements exceed the mapper limit of {limit}")]
    SizeExceeded { statements: usize, limit: usize },
}

/// Deadline and size limit carried by one mapper invocation
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    started: Instant,
    time: Duration,
    max_statements: usize,
}

impl Budget {
    pub fn new(time: Duration, max_statements: usize) -> Self {
        Self {
            started: Instant::now(),
            time,
            max_statements,
        }
    }

    pub fn from_config(config: &MapperConfig) -> Self {
        Self::new(config.timeout(), config.max_statements)
    }

    pub fn check_size(&self, statements: usize) -> Result<(), MapperAbort> {
        if statements > self.max_statements {
            return Err(MapperAbort::SizeExceeded {
                statements,
                limit: self.max_statements,
            });
        }
        Ok(())
    }

    pub fn check_time(&self) -> Result<(), MapperAbort> {
        let elapsed = self.started.elapsed();
        if elapsed > self.time {
            return Err(MapperAbort::TimedOut {
                elapsed,
                budget: self.time,
            });
        }
        Ok(())
    }
}
