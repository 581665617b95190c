use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use std::collections::HashMap;

use crate::domain::calendar::{format_date, parse_stored_date};
use crate::domain::models::{AccountId, AttendanceRecord, AttendanceStatus, Student, StudentDetails};
use crate::storage::connection::DbConnection;
use crate::storage::traits::StudentStorage;

const STUDENT_COLUMNS: &str = "id, account_id, name, class_name, image, mobile_number, address, \
     present_count, absent_count, version, created_at, updated_at";

/// SQLite-backed roster repository
#[derive(Clone)]
pub struct StudentRepository {
    db: DbConnection,
}

impl StudentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn name_key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Fixed-width UTC so that text order matches time order
    fn timestamp(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid stored timestamp: {}", raw))?
            .with_timezone(&Utc))
    }

    fn student_from_row(row: &SqliteRow) -> Result<Student> {
        let account_raw: String = row.try_get("account_id")?;
        let account_id = AccountId::parse(&account_raw)
            .with_context(|| format!("Invalid stored account id: {}", account_raw))?;
        let present: i64 = row.try_get("present_count")?;
        let absent: i64 = row.try_get("absent_count")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Student {
            id: row.try_get("id")?,
            account_id,
            name: row.try_get("name")?,
            details: StudentDetails {
                class_name: row.try_get("class_name")?,
                image: row.try_get("image")?,
                mobile_number: row.try_get("mobile_number")?,
                address: row.try_get("address")?,
            },
            present_count: u32::try_from(present).context("present_count out of range")?,
            absent_count: u32::try_from(absent).context("absent_count out of range")?,
            attendance_log: Vec::new(),
            version: row.try_get("version")?,
            created_at: Self::parse_timestamp(&created_at)?,
            updated_at: Self::parse_timestamp(&updated_at)?,
        })
    }

    fn record_from_row(row: &SqliteRow) -> Result<AttendanceRecord> {
        let date: String = row.try_get("date")?;
        let status: String = row.try_get("status")?;

        Ok(AttendanceRecord {
            date: parse_stored_date(&date)
                .with_context(|| format!("Invalid stored attendance date: {}", date))?,
            status: status
                .parse::<AttendanceStatus>()
                .map_err(|_| anyhow::anyhow!("Invalid stored attendance status: {}", status))?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }

    async fn fetch_log(conn: &mut SqliteConnection, student_id: &str) -> Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT date, status, recorded_at
            FROM attendance_records
            WHERE student_id = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(conn)
        .await?;

        rows.iter().map(Self::record_from_row).collect()
    }

    /// Replace the stored log of `student` with its in-memory log
    async fn write_log(conn: &mut SqliteConnection, student: &Student) -> Result<()> {
        sqlx::query("DELETE FROM attendance_records WHERE student_id = ?")
            .bind(&student.id)
            .execute(&mut *conn)
            .await?;

        for (seq, record) in student.attendance_log.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO attendance_records (student_id, seq, date, status, recorded_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&student.id)
            .bind(seq as i64)
            .bind(format_date(record.date))
            .bind(record.status.as_str())
            .bind(&record.recorded_at)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    async fn fetch_student(
        conn: &mut SqliteConnection,
        account_id: &AccountId,
        student_id: &str,
    ) -> Result<Option<Student>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM students WHERE id = ? AND account_id = ?",
            STUDENT_COLUMNS
        ))
        .bind(student_id)
        .bind(account_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(r) => {
                let mut student = Self::student_from_row(&r)?;
                student.attendance_log = Self::fetch_log(conn, &student.id).await?;
                Ok(Some(student))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StudentStorage for StudentRepository {
    async fn store_student(&self, student: &Student) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO students (
                id, account_id, name, name_key, class_name, image, mobile_number, address,
                present_count, absent_count, version, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&student.id)
        .bind(student.account_id.as_str())
        .bind(&student.name)
        .bind(Self::name_key(&student.name))
        .bind(&student.details.class_name)
        .bind(&student.details.image)
        .bind(&student.details.mobile_number)
        .bind(&student.details.address)
        .bind(i64::from(student.present_count))
        .bind(i64::from(student.absent_count))
        .bind(student.version)
        .bind(Self::timestamp(&student.created_at))
        .bind(Self::timestamp(&student.updated_at))
        .execute(&mut *tx)
        .await?;

        Self::write_log(&mut tx, student).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_student(&self, account_id: &AccountId, student_id: &str) -> Result<Option<Student>> {
        // Row and log come from the same read snapshot
        let mut tx = self.db.pool().begin().await?;
        let student = Self::fetch_student(&mut tx, account_id, student_id).await?;
        tx.commit().await?;
        Ok(student)
    }

    async fn find_student_id_by_name(&self, account_id: &AccountId, name: &str) -> Result<Option<String>> {
        let id = sqlx::query_scalar::<_, String>(
            "SELECT id FROM students WHERE account_id = ? AND name_key = ? LIMIT 1",
        )
        .bind(account_id.as_str())
        .bind(Self::name_key(name))
        .fetch_optional(self.db.pool())
        .await?;

        Ok(id)
    }

    async fn list_students(&self, account_id: &AccountId, name_filter: Option<&str>) -> Result<Vec<Student>> {
        // instr() is a literal substring test, so user input never acts as a pattern
        let needle = name_filter.map(Self::name_key).unwrap_or_default();
        let mut tx = self.db.pool().begin().await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM students
            WHERE account_id = ? AND (? = '' OR instr(name_key, ?) > 0)
            ORDER BY created_at DESC, rowid DESC
            "#,
            STUDENT_COLUMNS
        ))
        .bind(account_id.as_str())
        .bind(&needle)
        .bind(&needle)
        .fetch_all(&mut *tx)
        .await?;

        let mut students = rows
            .iter()
            .map(Self::student_from_row)
            .collect::<Result<Vec<_>>>()?;
        if students.is_empty() {
            tx.commit().await?;
            return Ok(students);
        }

        let record_rows = sqlx::query(
            r#"
            SELECT r.student_id, r.date, r.status, r.recorded_at
            FROM attendance_records r
            JOIN students s ON s.id = r.student_id
            WHERE s.account_id = ?
            ORDER BY r.student_id, r.seq ASC
            "#,
        )
        .bind(account_id.as_str())
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut logs: HashMap<String, Vec<AttendanceRecord>> = HashMap::new();
        for row in &record_rows {
            let student_id: String = row.try_get("student_id")?;
            logs.entry(student_id)
                .or_default()
                .push(Self::record_from_row(row)?);
        }

        for student in &mut students {
            if let Some(log) = logs.remove(&student.id) {
                student.attendance_log = log;
            }
        }

        Ok(students)
    }

    async fn save_student(&self, student: &Student) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE students
            SET name = ?, name_key = ?, class_name = ?, image = ?, mobile_number = ?,
                address = ?, present_count = ?, absent_count = ?, version = version + 1,
                updated_at = ?
            WHERE id = ? AND account_id = ? AND version = ?
            "#,
        )
        .bind(&student.name)
        .bind(Self::name_key(&student.name))
        .bind(&student.details.class_name)
        .bind(&student.details.image)
        .bind(&student.details.mobile_number)
        .bind(&student.details.address)
        .bind(i64::from(student.present_count))
        .bind(i64::from(student.absent_count))
        .bind(Self::timestamp(&student.updated_at))
        .bind(&student.id)
        .bind(student.account_id.as_str())
        .bind(student.version)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        Self::write_log(&mut tx, student).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn delete_student(&self, account_id: &AccountId, student_id: &str) -> Result<Option<Student>> {
        let mut tx = self.db.pool().begin().await?;

        // Write first so the transaction holds the write lock before it reads;
        // a read-then-write upgrade fails outright when another writer commits.
        let claimed = sqlx::query(
            "UPDATE students SET version = version + 1 WHERE id = ? AND account_id = ?",
        )
        .bind(student_id)
        .bind(account_id.as_str())
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let student = Self::fetch_student(&mut tx, account_id, student_id)
            .await?
            .context("Claimed student vanished inside its transaction")?;

        sqlx::query("DELETE FROM attendance_records WHERE student_id = ?")
            .bind(student_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM students WHERE id = ? AND account_id = ?")
            .bind(student_id)
            .bind(account_id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(student))
    }
}
