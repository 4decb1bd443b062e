use super::api::{ClientError, MealsApi};
use crate::models::{normalize_time, DayRecord, FieldPatch, Meal, MealStatus, DEFAULT_BREAKFAST_TIME};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const STATUS_DURATION: Duration = Duration::from_secs(3);
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    shown_at: Instant,
}

impl StatusMessage {
    pub fn visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < STATUS_DURATION
    }
}

/// Why a reload was requested. All triggers share the same load path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    Interval,
    Visible,
    Focus,
}

/// In-memory mirror of the server's week, with optimistic edits.
///
/// Edits are applied locally first and then pushed. A failed push is not
/// rolled back in place; the whole mirror is reloaded from the server.
pub struct MealController<A> {
    api: A,
    days: Vec<DayRecord>,
    remembered_times: HashMap<NaiveDate, String>,
    status: Option<StatusMessage>,
}

impl<A: MealsApi> MealController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            days: Vec::new(),
            remembered_times: HashMap::new(),
            status: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.iter().find(|day| day.date == date)
    }

    /// The current status message, if it has not expired yet.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status
            .as_ref()
            .filter(|status| status.visible_at(Instant::now()))
    }

    /// Replaces the mirror with the server's week. On failure the old mirror
    /// stays in place.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        match self.api.fetch_window().await {
            Ok(days) => {
                debug!(days = days.len(), "loaded meal window");
                self.days = days;
                Ok(())
            }
            Err(err) => {
                warn!("failed to load meals: {err}");
                self.show(StatusKind::Error, "Could not load meals. Please refresh.");
                Err(err)
            }
        }
    }

    pub async fn reload(&mut self, trigger: ReloadTrigger) -> Result<(), ClientError> {
        debug!(?trigger, "reloading meals");
        self.load().await
    }

    /// Advances one cell locally and returns the write to send.
    pub fn stage_cycle(&mut self, date: NaiveDate, meal: Meal) -> Result<FieldPatch, ClientError> {
        let index = self.index_of(date)?;
        let day = &self.days[index];
        let next = meal.next(day.status(meal));

        if meal == Meal::Breakfast {
            if let Some(time) = &day.breakfast_time {
                self.remembered_times.insert(date, time.clone());
            }
        }

        let breakfast_time = (meal == Meal::Breakfast && next == MealStatus::Yes).then(|| {
            self.remembered_times
                .get(&date)
                .cloned()
                .unwrap_or_else(|| DEFAULT_BREAKFAST_TIME.to_string())
        });

        let day = &mut self.days[index];
        day.set_status(meal, next);
        if breakfast_time.is_some() {
            day.breakfast_time = breakfast_time.clone();
        }

        Ok(FieldPatch {
            date,
            meal,
            status: next,
            breakfast_time,
        })
    }

    /// Changes the breakfast time locally and returns the write to send.
    pub fn stage_breakfast_time(
        &mut self,
        date: NaiveDate,
        time: &str,
    ) -> Result<FieldPatch, ClientError> {
        let time = normalize_time(time).ok_or_else(|| ClientError::InvalidTime(time.to_string()))?;
        let index = self.index_of(date)?;
        let day = &mut self.days[index];
        if day.breakfast != MealStatus::Yes {
            return Err(ClientError::TimeNotEditable);
        }

        day.breakfast_time = Some(time.clone());
        self.remembered_times.insert(date, time.clone());

        Ok(FieldPatch {
            date,
            meal: Meal::Breakfast,
            status: MealStatus::Yes,
            breakfast_time: Some(time),
        })
    }

    /// Reconciles the outcome of a pushed write with the mirror.
    pub async fn settle(&mut self, outcome: Result<(), ClientError>) -> Result<(), ClientError> {
        match outcome {
            Ok(()) => {
                self.show(StatusKind::Success, "Saved!");
                Ok(())
            }
            Err(err) => {
                warn!("failed to save meal: {err}");
                if let Err(reload_err) = self.load().await {
                    debug!("reload after failed save also failed: {reload_err}");
                }
                self.show(StatusKind::Error, "Could not save. Please try again.");
                Err(err)
            }
        }
    }

    pub async fn cycle(&mut self, date: NaiveDate, meal: Meal) -> Result<MealStatus, ClientError> {
        let patch = self.stage_cycle(date, meal)?;
        let outcome = self.api.write_field(&patch).await;
        self.settle(outcome).await?;
        Ok(patch.status)
    }

    pub async fn set_breakfast_time(&mut self, date: NaiveDate, time: &str) -> Result<(), ClientError> {
        let patch = self.stage_breakfast_time(date, time)?;
        let outcome = self.api.write_field(&patch).await;
        self.settle(outcome).await
    }

    fn index_of(&self, date: NaiveDate) -> Result<usize, ClientError> {
        self.days
            .iter()
            .position(|day| day.date == date)
            .ok_or(ClientError::UnknownDate(date))
    }

    fn show(&mut self, kind: StatusKind, text: &str) {
        self.status = Some(StatusMessage {
            kind,
            text: text.to_string(),
            shown_at: Instant::now(),
        });
    }
}
