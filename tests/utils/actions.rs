use chrono::NaiveDate;
use kvansum::{AppError, Clock, CompletionReport, LogStatus};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    pub fn clock_day(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn today(&self) -> String {
        self.clock_day().to_string()
    }

    /// Logs `status` for `habit_id` on the clock's current day
    pub async fn log_today(
        &self,
        habit_id: &str,
        status: LogStatus,
    ) -> Result<CompletionReport, AppError> {
        self.service
            .log_completion(&self.user_id, habit_id, &self.today(), status, None)
            .await
    }

    /// Logs a success for every habit in `habit_ids` on `days` consecutive days, starting
    /// today and moving the clock forward after each day. The clock ends on the last logged day.
    pub async fn complete_days(&self, habit_ids: &[&str], days: u32) -> Vec<CompletionReport> {
        let mut reports = Vec::new();
        for day in 0..days {
            if day > 0 {
                self.clock.advance_days(1);
            }
            for habit_id in habit_ids {
                let report = self
                    .log_today(habit_id, LogStatus::Success)
                    .await
                    .expect("logging a success should succeed");
                reports.push(report);
            }
        }
        reports
    }
}
