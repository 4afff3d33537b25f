use crate::Database;
use crate::models::{
    AchievementRow, AppointmentRow, ConversationRow, CounselorRow, MoodEntryRow, NewAppointment,
    NewCounselor, NewMoodEntry, NewResource, NewUser, ResourceRow, UserRow,
};
use anyhow::Result;
use mindful_types::models::AppointmentStatus;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "id, email, password, first_name, last_name, university, created_at";
const MOOD_COLUMNS: &str =
    "id, user_id, mood_score, stress_level, anxiety_level, notes, created_at";
const ACHIEVEMENT_COLUMNS: &str =
    "id, user_id, achievement_type, achievement_name, points, created_at";
const RESOURCE_COLUMNS: &str = "id, title, content, type, category, created_at";
const COUNSELOR_COLUMNS: &str =
    "id, name, email, specialization, university, availability, bio, created_at";

impl Database {
    // -- Users --

    /// Insert a user. Returns `false` when the email is already taken.
    pub fn create_user(&self, id: &str, user: &NewUser<'_>) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, email, password, first_name, last_name, university)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    id,
                    user.email,
                    user.password_hash,
                    user.first_name,
                    user.last_name,
                    user.university
                ],
            );
            match inserted {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
            conn.query_row(&sql, [email], user_from_row).optional()
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
            conn.query_row(&sql, [id], user_from_row).optional()
        })
    }

    // -- Conversations --

    pub fn insert_conversation(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        messages_json: &str,
        sentiment: &str,
        crisis_detected: bool,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, user_id, title, messages, sentiment, crisis_detected)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, title, messages_json, sentiment, crisis_detected],
            )?;
            Ok(())
        })
    }

    pub fn get_conversations(&self, user_id: &str) -> Result<Vec<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, messages, sentiment, crisis_detected, created_at
                 FROM conversations
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ConversationRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        title: row.get(2)?,
                        messages: row.get(3)?,
                        sentiment: row.get(4)?,
                        crisis_detected: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Mood entries --

    pub fn insert_mood_entry(&self, id: &str, user_id: &str, entry: &NewMoodEntry<'_>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO mood_entries (id, user_id, mood_score, stress_level, anxiety_level, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    id,
                    user_id,
                    entry.mood_score,
                    entry.stress_level,
                    entry.anxiety_level,
                    entry.notes
                ],
            )?;
            Ok(())
        })
    }

    /// Entries from the last `days` days, newest first.
    pub fn get_mood_entries(&self, user_id: &str, days: u32) -> Result<Vec<MoodEntryRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MOOD_COLUMNS} FROM mood_entries
                 WHERE user_id = ?1 AND created_at >= datetime('now', ?2)
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let window = format!("-{days} days");
            let rows = stmt
                .query_map(rusqlite::params![user_id, window], mood_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Creation timestamps of every entry the user has, newest first.
    pub fn get_mood_timestamps(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT created_at FROM mood_entries
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(rows)
        })
    }

    // -- Achievements --

    pub fn insert_achievement(
        &self,
        id: &str,
        user_id: &str,
        achievement_type: &str,
        achievement_name: &str,
        points: i64,
    ) -> Result<AchievementRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO achievements (id, user_id, achievement_type, achievement_name, points)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, user_id, achievement_type, achievement_name, points],
            )?;
            let sql = format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE id = ?1");
            Ok(conn.query_row(&sql, [id], achievement_from_row)?)
        })
    }

    pub fn get_achievements(&self, user_id: &str) -> Result<Vec<AchievementRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], achievement_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Sum of the user's points, saturating at the `i64` bounds. SQLite's
    /// `SUM` raises "integer overflow" instead.
    pub fn get_total_points(&self, user_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT points FROM achievements WHERE user_id = ?1")?;
            let mut total: i64 = 0;
            for points in stmt.query_map([user_id], |row| row.get::<_, i64>(0))? {
                total = total.saturating_add(points?);
            }
            Ok(total)
        })
    }

    // -- Resources --

    pub fn insert_resource(&self, id: &str, resource: &NewResource<'_>) -> Result<ResourceRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO resources (id, title, content, type, category) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, resource.title, resource.content, resource.kind, resource.category],
            )?;
            let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?1");
            Ok(conn.query_row(&sql, [id], resource_from_row)?)
        })
    }

    /// All resources, optionally narrowed by category and/or type, newest first.
    pub fn get_resources(&self, category: Option<&str>, kind: Option<&str>) -> Result<Vec<ResourceRow>> {
        self.with_conn(|conn| {
            let mut conditions = Vec::new();
            let mut params: Vec<&dyn rusqlite::types::ToSql> = Vec::new();
            if let Some(category) = &category {
                params.push(category);
                conditions.push(format!("category = ?{}", params.len()));
            }
            if let Some(kind) = &kind {
                params.push(kind);
                conditions.push(format!("type = ?{}", params.len()));
            }

            let mut sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources");
            if !conditions.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&conditions.join(" AND "));
            }
            sql.push_str(" ORDER BY created_at DESC, rowid DESC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), resource_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_resource(&self, id: &str) -> Result<Option<ResourceRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?1");
            conn.query_row(&sql, [id], resource_from_row).optional()
        })
    }

    pub fn count_resources(&self) -> Result<i64> {
        self.with_conn(|conn| count(conn, "resources"))
    }

    // -- Counselors --

    pub fn insert_counselor(&self, id: &str, counselor: &NewCounselor<'_>) -> Result<CounselorRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO counselors (id, name, email, specialization, university, availability, bio)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id,
                    counselor.name,
                    counselor.email,
                    counselor.specialization,
                    counselor.university,
                    counselor.availability,
                    counselor.bio
                ],
            )?;
            let sql = format!("SELECT {COUNSELOR_COLUMNS} FROM counselors WHERE id = ?1");
            Ok(conn.query_row(&sql, [id], counselor_from_row)?)
        })
    }

    pub fn get_counselors(&self) -> Result<Vec<CounselorRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {COUNSELOR_COLUMNS} FROM counselors ORDER BY name");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], counselor_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_counselor(&self, id: &str) -> Result<Option<CounselorRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {COUNSELOR_COLUMNS} FROM counselors WHERE id = ?1");
            conn.query_row(&sql, [id], counselor_from_row).optional()
        })
    }

    pub fn count_counselors(&self) -> Result<i64> {
        self.with_conn(|conn| count(conn, "counselors"))
    }

    // -- Appointments --

    /// New appointments always start out `scheduled`.
    pub fn insert_appointment(
        &self,
        id: &str,
        user_id: &str,
        appointment: &NewAppointment<'_>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO appointments (id, user_id, counselor_id, appointment_date, appointment_time, status, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id,
                    user_id,
                    appointment.counselor_id,
                    appointment.appointment_date,
                    appointment.appointment_time,
                    AppointmentStatus::Scheduled.as_str(),
                    appointment.notes
                ],
            )?;
            Ok(())
        })
    }

    /// The user's appointments in calendar order, with the counselor's name
    /// and specialization when the counselor still exists.
    pub fn get_appointments(&self, user_id: &str) -> Result<Vec<AppointmentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.user_id, a.counselor_id, a.appointment_date, a.appointment_time,
                        a.status, a.notes, a.created_at, c.name, c.specialization
                 FROM appointments a
                 LEFT JOIN counselors c ON a.counselor_id = c.id
                 WHERE a.user_id = ?1
                 ORDER BY a.appointment_date, a.appointment_time",
            )?;
            let rows = stmt
                .query_map([user_id], appointment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_appointment(&self, id: &str, user_id: &str) -> Result<Option<AppointmentRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT a.id, a.user_id, a.counselor_id, a.appointment_date, a.appointment_time,
                        a.status, a.notes, a.created_at, c.name, c.specialization
                 FROM appointments a
                 LEFT JOIN counselors c ON a.counselor_id = c.id
                 WHERE a.id = ?1 AND a.user_id = ?2",
                [id, user_id],
                appointment_from_row,
            )
            .optional()
        })
    }

    /// Overwrite the status. Returns `false` when the user has no such
    /// appointment.
    pub fn update_appointment_status(
        &self,
        id: &str,
        user_id: &str,
        status: AppointmentStatus,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE appointments SET status = ?1 WHERE id = ?2 AND user_id = ?3",
                rusqlite::params![status.as_str(), id, user_id],
            )?;
            Ok(changed > 0)
        })
    }
}

fn count(conn: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        university: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn mood_from_row(row: &Row<'_>) -> rusqlite::Result<MoodEntryRow> {
    Ok(MoodEntryRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        mood_score: row.get(2)?,
        stress_level: row.get(3)?,
        anxiety_level: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn achievement_from_row(row: &Row<'_>) -> rusqlite::Result<AchievementRow> {
    Ok(AchievementRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        achievement_type: row.get(2)?,
        achievement_name: row.get(3)?,
        points: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<ResourceRow> {
    Ok(ResourceRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        kind: row.get(3)?,
        category: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn counselor_from_row(row: &Row<'_>) -> rusqlite::Result<CounselorRow> {
    Ok(CounselorRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        specialization: row.get(3)?,
        university: row.get(4)?,
        availability: row.get(5)?,
        bio: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        counselor_id: row.get(2)?,
        appointment_date: row.get(3)?,
        appointment_time: row.get(4)?,
        status: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
        counselor_name: row.get(8)?,
        specialization: row.get(9)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
