//! Statistics gathered by the solver workers, and the helpers that print them.
mod statistic_logger;
pub mod statistic_logging;

pub use statistic_logger::StatisticLogger;

/// Counters collected by a single worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// How often the worker asked Pumpkin for a (better) solution.
    pub solve_calls: u64,
    pub solutions: u64,
}

impl SearchStatistics {
    pub fn log(&self, statistic_logger: &StatisticLogger) {
        statistic_logger
            .attach_to_prefix("numberOfSolveCalls")
            .log_statistic(self.solve_calls);
        statistic_logger
            .attach_to_prefix("numberOfSolutions")
            .log_statistic(self.solutions);
    }
}
