use crate::models::{DayRecord, Meal, MealStatus};
use chrono::{Duration, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub meal: Meal,
    pub status: MealStatus,
    /// Only present for breakfast while it is `yes`.
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub date: NaiveDate,
    pub label: String,
    pub cells: Vec<CellView>,
}

pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if date == today + Duration::days(1) {
        "Tomorrow".to_string()
    } else {
        date.format("%a %-d %b").to_string()
    }
}

pub fn rows(days: &[DayRecord], today: NaiveDate) -> Vec<RowView> {
    days.iter()
        .map(|day| RowView {
            date: day.date,
            label: date_label(day.date, today),
            cells: Meal::ALL
                .iter()
                .map(|&meal| CellView {
                    meal,
                    status: day.status(meal),
                    time: match meal {
                        Meal::Breakfast if day.breakfast == MealStatus::Yes => {
                            day.breakfast_time.clone()
                        }
                        _ => None,
                    },
                })
                .collect(),
        })
        .collect()
}

pub fn render_table(rows: &[RowView]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:<10} {:<14} {:<14} {:<14}\n",
        "", "date", "breakfast", "lunch", "dinner"
    ));
    for row in rows {
        out.push_str(&format!("{:<12} {:<10}", row.label, row.date.to_string()));
        for cell in &row.cells {
            let text = match &cell.time {
                Some(time) => format!("{} {}", cell.status, time),
                None => cell.status.to_string(),
            };
            out.push_str(&format!(" {text:<14}"));
        }
        out.push('\n');
    }
    out
}
