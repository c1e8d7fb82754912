use crate::models::{
    check_conflicts, ConflictReport, DayOfWeek, ScheduleSlot, ScheduleSlotDraft, ServiceError,
    SlotId, TimeOfDay, TimeSlot, UNSAVED_SLOT_ID,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::{BTreeSet, HashMap};

/// Result of a checked write: either the stored slot or the clashes that
/// prevented it. Nothing is written in the rejected case.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(ScheduleSlot),
    Rejected(ConflictReport),
}

#[async_trait]
pub trait ScheduleSlotRepository: Send + Sync {
    async fn find_by_id(&self, id: SlotId) -> Result<Option<ScheduleSlot>, ServiceError>;
    async fn find_by_branch(&self, branch_id: &str) -> Result<Vec<ScheduleSlot>, ServiceError>;
    /// Loads the branch, checks for clashes and inserts, all in one transaction.
    async fn create_checked(
        &self,
        branch_id: &str,
        draft: &ScheduleSlotDraft,
    ) -> Result<SaveOutcome, ServiceError>;
    /// Same as `create_checked` for an existing slot, which is excluded from
    /// its own comparison.
    async fn update_checked(
        &self,
        id: SlotId,
        draft: &ScheduleSlotDraft,
    ) -> Result<SaveOutcome, ServiceError>;
    async fn delete(&self, id: SlotId) -> Result<bool, ServiceError>;
}

#[derive(sqlx::FromRow)]
struct ScheduleSlotRow {
    id: i64,
    branch_id: String,
    title: String,
    classroom_id: Option<String>,
    teacher_profile_id: Option<String>,
    day_of_week: String,
    start_minute: i64,
    end_minute: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct StaffRow {
    slot_id: i64,
    user_id: String,
}

const SLOT_COLUMNS: &str = "id, branch_id, title, classroom_id, teacher_profile_id, day_of_week, \
     start_minute, end_minute, created_at, updated_at";

const DAY_ORDER: &str = "CASE day_of_week \
     WHEN 'MONDAY' THEN 1 WHEN 'TUESDAY' THEN 2 WHEN 'WEDNESDAY' THEN 3 \
     WHEN 'THURSDAY' THEN 4 WHEN 'FRIDAY' THEN 5 WHEN 'SATURDAY' THEN 6 \
     ELSE 7 END";

fn minute_column(value: i64, column: &str, id: i64) -> Result<TimeOfDay, ServiceError> {
    u16::try_from(value)
        .map_err(|_| "out of range".to_string())
        .and_then(TimeOfDay::from_minutes)
        .map_err(|e| ServiceError::InternalError(format!("Slot {} has invalid {}: {}", id, column, e)))
}

impl ScheduleSlotRow {
    fn into_slot(self, staff_user_ids: BTreeSet<String>) -> Result<ScheduleSlot, ServiceError> {
        let day: DayOfWeek = self
            .day_of_week
            .parse()
            .map_err(|e| ServiceError::InternalError(format!("Slot {}: {}", self.id, e)))?;
        let start = minute_column(self.start_minute, "start_minute", self.id)?;
        let end = minute_column(self.end_minute, "end_minute", self.id)?;
        let time_slot = TimeSlot::new(day, start, end)
            .map_err(|e| ServiceError::InternalError(format!("Slot {}: {}", self.id, e)))?;

        Ok(ScheduleSlot {
            id: self.id,
            branch_id: self.branch_id,
            title: self.title,
            classroom_id: self.classroom_id,
            teacher_profile_id: self.teacher_profile_id,
            staff_user_ids,
            time_slot,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn assemble(rows: Vec<ScheduleSlotRow>, staff: Vec<StaffRow>) -> Result<Vec<ScheduleSlot>, ServiceError> {
    let mut staff_by_slot: HashMap<i64, BTreeSet<String>> = HashMap::new();
    for row in staff {
        staff_by_slot.entry(row.slot_id).or_default().insert(row.user_id);
    }

    rows.into_iter()
        .map(|row| {
            let staff = staff_by_slot.remove(&row.id).unwrap_or_default();
            row.into_slot(staff)
        })
        .collect()
}

async fn fetch_branch(conn: &mut SqliteConnection, branch_id: &str) -> Result<Vec<ScheduleSlot>, ServiceError> {
    let rows = sqlx::query_as::<_, ScheduleSlotRow>(&format!(
        "SELECT {} FROM schedule_slots WHERE branch_id = ? ORDER BY {}, start_minute, id",
        SLOT_COLUMNS, DAY_ORDER
    ))
    .bind(branch_id)
    .fetch_all(&mut *conn)
    .await?;

    let staff = sqlx::query_as::<_, StaffRow>(
        "SELECT st.slot_id, st.user_id
         FROM schedule_slot_staff st
         JOIN schedule_slots s ON s.id = st.slot_id
         WHERE s.branch_id = ?",
    )
    .bind(branch_id)
    .fetch_all(&mut *conn)
    .await?;

    assemble(rows, staff)
}

async fn fetch_one(conn: &mut SqliteConnection, id: SlotId) -> Result<Option<ScheduleSlot>, ServiceError> {
    let row = sqlx::query_as::<_, ScheduleSlotRow>(&format!(
        "SELECT {} FROM schedule_slots WHERE id = ?",
        SLOT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let staff = sqlx::query_as::<_, StaffRow>(
        "SELECT slot_id, user_id FROM schedule_slot_staff WHERE slot_id = ?",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let staff = staff.into_iter().map(|s| s.user_id).collect();
    row.into_slot(staff).map(Some)
}

async fn replace_staff(conn: &mut SqliteConnection, slot: &ScheduleSlot) -> Result<(), ServiceError> {
    sqlx::query("DELETE FROM schedule_slot_staff WHERE slot_id = ?")
        .bind(slot.id)
        .execute(&mut *conn)
        .await?;

    for user_id in &slot.staff_user_ids {
        sqlx::query("INSERT INTO schedule_slot_staff (slot_id, user_id) VALUES (?, ?)")
            .bind(slot.id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

pub struct SqliteScheduleSlotRepository {
    pool: SqlitePool,
}

impl SqliteScheduleSlotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Writes take the database write lock up front. A deferred transaction
    // that reads first cannot upgrade while another writer holds the lock
    // and fails with SQLITE_BUSY instead of waiting.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, ServiceError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}

#[async_trait]
impl ScheduleSlotRepository for SqliteScheduleSlotRepository {
    async fn find_by_id(&self, id: SlotId) -> Result<Option<ScheduleSlot>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        fetch_one(&mut conn, id).await
    }

    async fn find_by_branch(&self, branch_id: &str) -> Result<Vec<ScheduleSlot>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        fetch_branch(&mut conn, branch_id).await
    }

    async fn create_checked(
        &self,
        branch_id: &str,
        draft: &ScheduleSlotDraft,
    ) -> Result<SaveOutcome, ServiceError> {
        let mut tx = self.begin_write().await?;

        let existing = fetch_branch(&mut tx, branch_id).await?;
        let mut slot = draft.to_slot(UNSAVED_SLOT_ID, branch_id, Utc::now());
        let report = check_conflicts(&slot, &existing);
        if !report.is_empty() {
            tx.rollback().await?;
            return Ok(SaveOutcome::Rejected(report));
        }

        let result = sqlx::query(
            "INSERT INTO schedule_slots
             (branch_id, title, classroom_id, teacher_profile_id, day_of_week,
              start_minute, end_minute, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&slot.branch_id)
        .bind(&slot.title)
        .bind(&slot.classroom_id)
        .bind(&slot.teacher_profile_id)
        .bind(slot.time_slot.day_of_week.as_str())
        .bind(i64::from(slot.time_slot.start_time.minutes()))
        .bind(i64::from(slot.time_slot.end_time.minutes()))
        .bind(slot.created_at)
        .bind(slot.updated_at)
        .execute(&mut *tx)
        .await?;

        slot.id = result.last_insert_rowid();
        replace_staff(&mut tx, &slot).await?;
        tx.commit().await?;

        Ok(SaveOutcome::Saved(slot))
    }

    async fn update_checked(
        &self,
        id: SlotId,
        draft: &ScheduleSlotDraft,
    ) -> Result<SaveOutcome, ServiceError> {
        let mut tx = self.begin_write().await?;

        let previous = fetch_one(&mut tx, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Schedule {} not found", id)))?;

        let existing = fetch_branch(&mut tx, &previous.branch_id).await?;
        let slot = draft.to_slot(id, &previous.branch_id, previous.created_at);
        let report = check_conflicts(&slot, existing.iter().filter(|s| s.id != id));
        if !report.is_empty() {
            tx.rollback().await?;
            return Ok(SaveOutcome::Rejected(report));
        }

        sqlx::query(
            "UPDATE schedule_slots
             SET title = ?, classroom_id = ?, teacher_profile_id = ?, day_of_week = ?,
                 start_minute = ?, end_minute = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&slot.title)
        .bind(&slot.classroom_id)
        .bind(&slot.teacher_profile_id)
        .bind(slot.time_slot.day_of_week.as_str())
        .bind(i64::from(slot.time_slot.start_time.minutes()))
        .bind(i64::from(slot.time_slot.end_time.minutes()))
        .bind(slot.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        replace_staff(&mut tx, &slot).await?;
        tx.commit().await?;

        Ok(SaveOutcome::Saved(slot))
    }

    async fn delete(&self, id: SlotId) -> Result<bool, ServiceError> {
        let mut tx = self.begin_write().await?;

        sqlx::query("DELETE FROM schedule_slot_staff WHERE slot_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM schedule_slots WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
