//! pt-BR date labels and the clock they are stamped from

use chrono::{Datelike, Local, NaiveDate};

/// Month names indexed by `month - 1`
pub const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

pub const DEFAULT_CITY: &str = "Rio de Janeiro";

/// Month name for a 1-based month number
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = month.checked_sub(1)? as usize;
    MONTHS_PT_BR.get(index).copied()
}

/// Place-and-date line closing the document, e.g.
/// `"Rio de Janeiro, 5 de março de 2024."`
pub fn today_label(date: NaiveDate, city: &str) -> String {
    format!(
        "{}, {} de {} de {}.",
        city,
        date.day(),
        month_name(date.month()).unwrap_or_default(),
        date.year()
    )
}

/// Source of the current date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
