use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub type SlotId = i64;

/// Id carried by a slot that has not been written to storage yet.
pub const UNSAVED_SLOT_ID: SlotId = 0;

/// Serialized upper case (`"MONDAY"`); accepted in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "MONDAY",
            DayOfWeek::Tuesday => "TUESDAY",
            DayOfWeek::Wednesday => "WEDNESDAY",
            DayOfWeek::Thursday => "THURSDAY",
            DayOfWeek::Friday => "FRIDAY",
            DayOfWeek::Saturday => "SATURDAY",
            DayOfWeek::Sunday => "SUNDAY",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown day of week '{}'", s))
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

/// Time of day as minutes since midnight.
///
/// `24:00` (minute 1440) is representable so that a class may run until
/// midnight, but it can only ever be an end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(Self::MINUTES_PER_DAY);

    pub fn from_minutes(minutes: u16) -> Result<Self, String> {
        if minutes > Self::MINUTES_PER_DAY {
            return Err(format!(
                "Minute of day must be between 0 and {}, got {}",
                Self::MINUTES_PER_DAY,
                minutes
            ));
        }
        Ok(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, String> {
        if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(format!("Invalid time {:02}:{:02}", hour, minute));
        }
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    /// Parses `HH:MM` (a single-digit hour is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Time must be in HH:MM format, got '{}'", s);
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u16 = hour.parse().map_err(|_| invalid())?;
        let minute: u16 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl TimeSlot {
    pub fn new(day_of_week: DayOfWeek, start_time: TimeOfDay, end_time: TimeOfDay) -> Result<Self, String> {
        if start_time >= end_time {
            return Err(format!(
                "Start time {} must be before end time {}",
                start_time, end_time
            ));
        }
        Ok(Self {
            day_of_week,
            start_time,
            end_time,
        })
    }

    /// Half-open overlap on the same weekday: a slot ending at 10:00 does not
    /// clash with one starting at 10:00.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day_of_week, self.start_time, self.end_time)
    }
}

/// One recurring weekly class occurrence, owned by a branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSlot {
    pub id: SlotId,
    pub branch_id: String,
    pub title: String,
    pub classroom_id: Option<String>,
    pub teacher_profile_id: Option<String>,
    pub staff_user_ids: BTreeSet<String>,
    pub time_slot: TimeSlot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleSlot {
    pub fn new(id: SlotId, branch_id: impl Into<String>, title: impl Into<String>, time_slot: TimeSlot) -> Self {
        let now = Utc::now();
        Self {
            id,
            branch_id: branch_id.into(),
            title: title.into(),
            classroom_id: None,
            teacher_profile_id: None,
            staff_user_ids: BTreeSet::new(),
            time_slot,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_classroom(mut self, classroom_id: impl Into<String>) -> Self {
        self.classroom_id = Some(classroom_id.into());
        self
    }

    pub fn with_teacher(mut self, teacher_profile_id: impl Into<String>) -> Self {
        self.teacher_profile_id = Some(teacher_profile_id.into());
        self
    }

    pub fn with_staff<I, S>(mut self, staff_user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.staff_user_ids = staff_user_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_SLOT_ID
    }
}

/// Validated create/update payload. Carries everything an administrator may
/// edit; the owning branch is fixed when the slot is first created.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSlotDraft {
    pub title: String,
    pub classroom_id: Option<String>,
    pub teacher_profile_id: Option<String>,
    pub staff_user_ids: BTreeSet<String>,
    pub time_slot: TimeSlot,
}

impl ScheduleSlotDraft {
    pub fn new(
        title: String,
        time_slot: TimeSlot,
        classroom_id: Option<String>,
        teacher_profile_id: Option<String>,
        staff_user_ids: Vec<String>,
    ) -> Result<Self, String> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }

        let mut staff = BTreeSet::new();
        for user_id in staff_user_ids {
            let user_id = user_id.trim();
            if user_id.is_empty() {
                return Err("Staff user ids must not be empty".to_string());
            }
            staff.insert(user_id.to_string());
        }

        Ok(Self {
            title,
            classroom_id: non_blank(classroom_id),
            teacher_profile_id: non_blank(teacher_profile_id),
            staff_user_ids: staff,
            time_slot,
        })
    }

    /// Materializes the draft as a slot of `branch_id`.
    pub fn to_slot(&self, id: SlotId, branch_id: &str, created_at: DateTime<Utc>) -> ScheduleSlot {
        ScheduleSlot {
            id,
            branch_id: branch_id.to_string(),
            title: self.title.clone(),
            classroom_id: self.classroom_id.clone(),
            teacher_profile_id: self.teacher_profile_id.clone(),
            staff_user_ids: self.staff_user_ids.clone(),
            time_slot: self.time_slot,
            created_at,
            updated_at: Utc::now(),
        }
    }
}

// Forms post "" for an unselected room or teacher.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
