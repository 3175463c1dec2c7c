use crate::config::LogCategory;

use std::{borrow::Cow, time::Instant};

/// Emits statement events for the categories enabled in the configuration.
#[derive(Debug, Clone)]
pub(crate) struct Logger {
    enabled: [bool; LogCategory::ALL.len()],
}

/// An in-flight statement. Finishing it logs the elapsed time.
#[must_use]
pub(crate) struct LogPoint<'a> {
    category: LogCategory,
    sql: Cow<'a, str>,
    started: Instant,
}

impl Logger {
    pub(crate) fn new(categories: &[LogCategory]) -> Logger {
        let mut enabled = [false; LogCategory::ALL.len()];
        for category in categories {
            enabled[*category as usize] = true;
        }
        Logger { enabled }
    }

    pub(crate) fn enabled(&self, category: LogCategory) -> bool {
        self.enabled[category as usize]
    }

    pub(crate) fn start<'a>(
        &self,
        category: LogCategory,
        sql: &'a str,
        params: usize,
    ) -> Option<LogPoint<'a>> {
        if !self.enabled(category) {
            return None;
        }

        match category {
            LogCategory::MultiRow => {
                tracing::debug!(target: "rowbound::batch", sql, params, "executing chunk")
            }
            LogCategory::Mapping => {
                tracing::debug!(target: "rowbound::mapping", sql, params, "mapping rows")
            }
            _ => tracing::debug!(target: "rowbound::sql", ?category, sql, params, "executing"),
        }

        Some(LogPoint {
            category,
            sql: Cow::Borrowed(sql),
            started: Instant::now(),
        })
    }

    /// Logs a mapping event.
    pub(crate) fn mapping(&self, message: std::fmt::Arguments<'_>) {
        if self.enabled(LogCategory::Mapping) {
            tracing::debug!(target: "rowbound::mapping", "{message}");
        }
    }
}

impl LogPoint<'_> {
    /// Detaches the event from the borrowed SQL text.
    pub(crate) fn into_owned(self) -> LogPoint<'static> {
        LogPoint {
            category: self.category,
            sql: Cow::Owned(self.sql.into_owned()),
            started: self.started,
        }
    }

    /// Finishes the event with the number of rows affected or read.
    pub(crate) fn finish(self, rows: u64) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;

        match self.category {
            LogCategory::MultiRow => {
                tracing::debug!(target: "rowbound::batch", sql = &*self.sql, rows, elapsed_ms, "chunk done")
            }
            LogCategory::Mapping => {
                tracing::debug!(target: "rowbound::mapping", sql = &*self.sql, rows, elapsed_ms, "rows mapped")
            }
            _ => tracing::debug!(target: "rowbound::sql", sql = &*self.sql, rows, elapsed_ms, "done"),
        }
    }
}

/// Finishes `point` if logging was enabled.
pub(crate) fn finish(point: Option<LogPoint<'_>>, rows: u64) {
    if let Some(point) = point {
        point.finish(rows);
    }
}
