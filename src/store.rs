use crate::errors::StoreError;
use crate::models::{DayRecord, FieldPatch, Meal, MealStatus};
use chrono::{Duration, NaiveDate};
use csv::StringRecord;
use tracing::warn;

pub const HEADER: [&str; 5] = ["date", "breakfast", "lunch", "dinner", "breakfast_time"];
pub const WINDOW_DAYS: i64 = 7;

/// Every known day, in the order the dates were first written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealStore {
    records: Vec<DayRecord>,
}

impl MealStore {
    pub fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.records.iter().find(|record| record.date == date)
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts a row; a repeated date replaces the earlier row in place.
    pub fn insert(&mut self, record: DayRecord) {
        match self.records.iter_mut().find(|existing| existing.date == record.date) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    fn entry(&mut self, date: NaiveDate) -> &mut DayRecord {
        let index = match self.records.iter().position(|record| record.date == date) {
            Some(index) => index,
            None => {
                self.records.push(DayRecord::defaulted(date));
                self.records.len() - 1
            }
        };
        &mut self.records[index]
    }

    pub fn from_csv(input: &str) -> Result<Self, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input.as_bytes());

        let mut store = Self::default();
        for row in reader.records() {
            let row = row?;
            match parse_row(&row) {
                Some(record) => store.insert(record),
                None => {
                    let line = row.position().map(|pos| pos.line()).unwrap_or_default();
                    warn!(line, "skipping malformed meal row");
                }
            }
        }
        Ok(store)
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(Vec::new());

        writer.write_record(HEADER)?;
        for record in &self.records {
            let date = record.date.format("%Y-%m-%d").to_string();
            writer.write_record([
                date.as_str(),
                record.breakfast.as_str(),
                record.lunch.as_str(),
                record.dinner.as_str(),
                record.breakfast_time.as_deref().unwrap_or(""),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|err| StoreError::Io(err.into_error()))
    }
}

fn parse_row(row: &StringRecord) -> Option<DayRecord> {
    let date = NaiveDate::parse_from_str(row.get(0)?, "%Y-%m-%d").ok()?;
    let breakfast: MealStatus = row.get(1)?.parse().ok()?;
    let lunch: MealStatus = row.get(2)?.parse().ok()?;
    let dinner: MealStatus = row.get(3)?.parse().ok()?;
    // Rows from the four-column layout carry no time.
    let breakfast_time = row
        .get(4)
        .filter(|time| !time.is_empty() && breakfast == MealStatus::Yes)
        .map(str::to_string);

    Some(DayRecord {
        date,
        breakfast,
        lunch,
        dinner,
        breakfast_time,
    })
}

/// Applies one field update, seeding the day with defaults if it is new.
pub fn merge(mut store: MealStore, patch: &FieldPatch) -> MealStore {
    let record = store.entry(patch.date);
    record.set_status(patch.meal, patch.status);
    if patch.meal == Meal::Breakfast && patch.status == MealStatus::Yes {
        if let Some(time) = &patch.breakfast_time {
            record.breakfast_time = Some(time.clone());
        }
    }
    store
}

/// The seven days starting at `today`, defaulting any the store lacks.
pub fn window(store: &MealStore, today: NaiveDate) -> Vec<DayRecord> {
    (0..WINDOW_DAYS)
        .map(|offset| {
            let date = today + Duration::days(offset);
            store
                .get(date)
                .cloned()
                .unwrap_or_else(|| DayRecord::defaulted(date))
                .for_display()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_BREAKFAST_TIME;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn patch(date: NaiveDate, meal: Meal, status: MealStatus) -> FieldPatch {
        FieldPatch {
            date,
            meal,
            status,
            breakfast_time: None,
        }
    }

    #[test]
    fn window_defaults_missing_days() {
        let today = day(2026, 1, 5);
        let days = window(&MealStore::default(), today);
        assert_eq!(days.len(), 7);
        for (offset, record) in days.iter().enumerate() {
            assert_eq!(record.date, today + Duration::days(offset as i64));
            assert_eq!(record.breakfast, MealStatus::Yes);
            assert_eq!(record.lunch, MealStatus::No);
            assert_eq!(record.dinner, MealStatus::Yes);
            assert_eq!(record.breakfast_time.as_deref(), Some(DEFAULT_BREAKFAST_TIME));
        }
    }

    #[test]
    fn window_ignores_days_outside_range() {
        let today = day(2026, 1, 5);
        let mut store = MealStore::default();
        store = merge(store, &patch(day(2026, 1, 4), Meal::Dinner, MealStatus::No));
        store = merge(store, &patch(day(2026, 1, 12), Meal::Dinner, MealStatus::No));
        store = merge(store, &patch(day(2026, 1, 11), Meal::Dinner, MealStatus::Late));

        let days = window(&store, today);
        assert!(days.iter().all(|record| record.date >= today));
        assert_eq!(days[6].date, day(2026, 1, 11));
        assert_eq!(days[6].dinner, MealStatus::Late);
        assert!(days[..6].iter().all(|record| record.dinner == MealStatus::Yes));
        // Past rows are kept even though they are never surfaced.
        assert!(store.get(day(2026, 1, 4)).is_some());
    }

    #[test]
    fn merge_changes_only_the_target_field() {
        let date = day(2026, 1, 5);
        let mut store = merge(MealStore::default(), &patch(date, Meal::Dinner, MealStatus::Maybe));
        store = merge(store, &patch(date, Meal::Lunch, MealStatus::Yes));

        let record = store.get(date).unwrap();
        assert_eq!(record.breakfast, MealStatus::Yes);
        assert_eq!(record.lunch, MealStatus::Yes);
        assert_eq!(record.dinner, MealStatus::Maybe);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn merge_is_idempotent() {
        let date = day(2026, 1, 5);
        let once = merge(MealStore::default(), &patch(date, Meal::Lunch, MealStatus::Late));
        let twice = merge(once.clone(), &patch(date, Meal::Lunch, MealStatus::Late));
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_tracks_breakfast_time() {
        let date = day(2026, 1, 5);
        let mut with_time = patch(date, Meal::Breakfast, MealStatus::Yes);
        with_time.breakfast_time = Some("7:15".into());

        let store = merge(MealStore::default(), &with_time);
        assert_eq!(store.get(date).unwrap().breakfast_time.as_deref(), Some("7:15"));

        // yes without a time keeps the stored one
        let store = merge(store, &patch(date, Meal::Breakfast, MealStatus::Yes));
        assert_eq!(store.get(date).unwrap().breakfast_time.as_deref(), Some("7:15"));

        let store = merge(store, &patch(date, Meal::Breakfast, MealStatus::No));
        assert_eq!(store.get(date).unwrap().breakfast_time, None);
    }

    #[test]
    fn csv_keeps_insertion_order() {
        let mut store = MealStore::default();
        store = merge(store, &patch(day(2026, 1, 9), Meal::Lunch, MealStatus::Yes));
        store = merge(store, &patch(day(2026, 1, 5), Meal::Dinner, MealStatus::No));

        let text = String::from_utf8(store.to_csv().unwrap()).unwrap();
        assert_eq!(
            text,
            "date,breakfast,lunch,dinner,breakfast_time\n\
             2026-01-09,yes,yes,yes,\n\
             2026-01-05,yes,no,no,\n"
        );
        assert_eq!(MealStore::from_csv(&text).unwrap(), store);
    }

    #[test]
    fn csv_reads_legacy_and_skips_bad_rows() {
        let text = "date,breakfast,lunch,dinner\n\
                    2026-01-05,no,yes,late\n\
                    \n\
                    not-a-date,yes,no,yes\n\
                    2026-01-06,yes,sometimes,yes\n\
                    2026-01-07,yes,no,yes,6:45\n";
        let store = MealStore::from_csv(text).unwrap();
        assert_eq!(store.len(), 2);

        let legacy = store.get(day(2026, 1, 5)).unwrap();
        assert_eq!(legacy.breakfast, MealStatus::No);
        assert_eq!(legacy.dinner, MealStatus::Late);
        assert_eq!(legacy.breakfast_time, None);
        assert_eq!(
            store.get(day(2026, 1, 7)).unwrap().breakfast_time.as_deref(),
            Some("6:45")
        );
    }

    #[test]
    fn csv_drops_time_when_breakfast_is_off() {
        let store = MealStore::from_csv(
            "date,breakfast,lunch,dinner,breakfast_time\n2026-01-05,maybe,no,yes,8:00\n",
        )
        .unwrap();
        assert_eq!(store.get(day(2026, 1, 5)).unwrap().breakfast_time, None);
    }

    #[test]
    fn csv_duplicate_dates_keep_the_last_row() {
        let store = MealStore::from_csv(
            "date,breakfast,lunch,dinner,breakfast_time\n\
             2026-01-05,yes,no,yes,\n\
             2026-01-06,yes,no,yes,\n\
             2026-01-05,no,no,no,\n",
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].date, day(2026, 1, 5));
        assert_eq!(store.records()[0].breakfast, MealStatus::No);
    }

    #[test]
    fn empty_input_is_an_empty_store() {
        assert!(MealStore::from_csv("").unwrap().is_empty());
        assert!(MealStore::from_csv("date,breakfast,lunch,dinner,breakfast_time\n")
            .unwrap()
            .is_empty());
    }
}
