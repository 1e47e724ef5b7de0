//! # Callback Scheduling
//!
//! Hourly video-call slots from 10:00 to 22:00, bookable today or
//! tomorrow. A slot today is offered only if it starts strictly after
//! `now`. There is no persistence and no conflict detection; the chosen
//! slot travels to the scheduling webhook and nothing else.
//!
//! Times are local to the lead. `scheduledDateTime` is the same instant
//! expressed in UTC.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use leadq_core::{LeadInfo, Timestamp};

use crate::error::WizardError;

const FIRST_HOUR: u32 = 10;
const LAST_HOUR: u32 = 22;

/// Hourly slot grid and the two selectable dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCalendar {
    first_hour: u32,
    last_hour: u32,
}

impl Default for SlotCalendar {
    fn default() -> Self {
        Self {
            first_hour: FIRST_HOUR,
            last_hour: LAST_HOUR,
        }
    }
}

impl SlotCalendar {
    /// Every slot start, `10:00..=22:00`.
    pub fn slots(&self) -> Vec<NaiveTime> {
        (self.first_hour..=self.last_hour)
            .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
            .collect()
    }

    /// Today and tomorrow, relative to `now`.
    pub fn selectable_dates(&self, now: &DateTime<FixedOffset>) -> Vec<NaiveDate> {
        let today = now.date_naive();
        std::iter::once(today)
            .chain(today.checked_add_days(Days::new(1)))
            .collect()
    }

    /// Whether `time` is on the grid.
    pub fn is_slot(&self, time: NaiveTime) -> bool {
        time.minute() == 0
            && time.second() == 0
            && (self.first_hour..=self.last_hour).contains(&time.hour())
    }

    /// Whether a slot can still be booked.
    pub fn is_available(&self, date: NaiveDate, time: NaiveTime, now: &DateTime<FixedOffset>) -> bool {
        if !self.is_slot(time) || !self.selectable_dates(now).contains(&date) {
            return false;
        }
        date != now.date_naive() || date.and_time(time) > now.naive_local()
    }

    /// Slots still bookable on `date`.
    pub fn available_slots(&self, date: NaiveDate, now: &DateTime<FixedOffset>) -> Vec<NaiveTime> {
        self.slots()
            .into_iter()
            .filter(|t| self.is_available(date, *t, now))
            .collect()
    }
}

/// Parse an `HH:MM` slot label.
pub fn parse_slot_time(raw: &str) -> Result<NaiveTime, WizardError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| WizardError::InvalidSlotTime(raw.to_string()))
}

/// A confirmed slot, as sent in `videoCallScheduling`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingSelection {
    /// `YYYY-MM-DD`.
    pub scheduled_date: NaiveDate,
    /// `HH:MM`.
    pub scheduled_time: String,
    /// Slot start in UTC.
    pub scheduled_date_time: Timestamp,
    pub athlete_name: String,
    pub parent_name: String,
    pub parent_phone: String,
    /// When the selection was made.
    pub timestamp: Timestamp,
}

impl SchedulingSelection {
    /// Validate a slot against the default calendar and bind it to a lead.
    pub fn new(
        date: NaiveDate,
        time: NaiveTime,
        lead: &LeadInfo,
        now: &DateTime<FixedOffset>,
    ) -> Result<Self, WizardError> {
        let calendar = SlotCalendar::default();
        let label = time.format("%H:%M").to_string();
        if !calendar.is_slot(time) {
            return Err(WizardError::InvalidSlotTime(label));
        }
        if !calendar.is_available(date, time, now) {
            return Err(WizardError::SlotUnavailable { date, time: label });
        }

        let start = now
            .offset()
            .from_local_datetime(&date.and_time(time))
            .single()
            .ok_or_else(|| WizardError::SlotUnavailable {
                date,
                time: label.clone(),
            })?;

        Ok(Self {
            scheduled_date: date,
            scheduled_time: label,
            scheduled_date_time: Timestamp::from(start.with_timezone(&Utc)),
            athlete_name: lead.full_name.clone(),
            parent_name: lead.parent_name.clone(),
            parent_phone: lead.parent_phone.clone(),
            timestamp: Timestamp::from(now.with_timezone(&Utc)),
        })
    }
}
