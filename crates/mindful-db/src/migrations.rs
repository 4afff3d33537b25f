use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        // Owner and counselor ids are plain columns: the application vouches
        // for them, the store does not.
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                first_name  TEXT NOT NULL,
                last_name   TEXT NOT NULL,
                university  TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE conversations (
                id               TEXT PRIMARY KEY,
                user_id          TEXT NOT NULL,
                title            TEXT NOT NULL,
                messages         TEXT NOT NULL,
                sentiment        TEXT NOT NULL,
                crisis_detected  INTEGER NOT NULL DEFAULT 0,
                created_at       TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_conversations_user
                ON conversations(user_id, created_at);

            CREATE TABLE mood_entries (
                id             TEXT PRIMARY KEY,
                user_id        TEXT NOT NULL,
                mood_score     INTEGER NOT NULL,
                stress_level   INTEGER NOT NULL,
                anxiety_level  INTEGER NOT NULL,
                notes          TEXT,
                created_at     TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_mood_entries_user
                ON mood_entries(user_id, created_at);

            CREATE TABLE achievements (
                id                TEXT PRIMARY KEY,
                user_id           TEXT NOT NULL,
                achievement_type  TEXT NOT NULL,
                achievement_name  TEXT NOT NULL,
                points            INTEGER NOT NULL,
                created_at        TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_achievements_user
                ON achievements(user_id, created_at);

            CREATE TABLE resources (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                type        TEXT NOT NULL,
                category    TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE counselors (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                email           TEXT NOT NULL,
                specialization  TEXT NOT NULL,
                university      TEXT NOT NULL,
                availability    TEXT NOT NULL,
                bio             TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE appointments (
                id                TEXT PRIMARY KEY,
                user_id           TEXT NOT NULL,
                counselor_id      TEXT NOT NULL,
                appointment_date  TEXT NOT NULL,
                appointment_time  TEXT NOT NULL,
                status            TEXT NOT NULL DEFAULT 'scheduled'
                                  CHECK (status IN ('scheduled', 'completed', 'cancelled')),
                notes             TEXT,
                created_at        TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_appointments_user
                ON appointments(user_id, appointment_date, appointment_time);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn status_column_rejects_unknown_values() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO appointments (id, user_id, counselor_id, appointment_date, appointment_time, status)
             VALUES ('a', 'u', 'c', '2024-01-01', '10:00', 'pending')",
            [],
        );
        assert!(result.is_err());
    }
}
