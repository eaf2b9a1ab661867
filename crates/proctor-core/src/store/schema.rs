//! Table definitions.

use rusqlite::Connection;

use crate::error::ProctorResult;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS certifications (
        id TEXT PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        description TEXT,
        is_active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS domains (
        id TEXT PRIMARY KEY,
        certification_id TEXT NOT NULL REFERENCES certifications(id),
        name TEXT NOT NULL,
        weight REAL NOT NULL,
        sort_order INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_domains_certification ON domains(certification_id, sort_order);

    -- Item payload (scenario, question, options, answer key) is stored as JSON.
    CREATE TABLE IF NOT EXISTS items (
        id TEXT PRIMARY KEY,
        domain_id TEXT NOT NULL REFERENCES domains(id),
        certification_id TEXT NOT NULL REFERENCES certifications(id),
        difficulty_estimate REAL NOT NULL DEFAULT 1000,
        content TEXT NOT NULL,
        concept_tag TEXT,
        times_answered INTEGER NOT NULL DEFAULT 0,
        times_correct INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_items_domain_difficulty ON items(domain_id, difficulty_estimate);
    CREATE INDEX IF NOT EXISTS idx_items_certification ON items(certification_id);

    CREATE TABLE IF NOT EXISTS skill_profiles (
        learner_id TEXT PRIMARY KEY,
        global_skill REAL NOT NULL DEFAULT 1000,
        current_streak INTEGER NOT NULL DEFAULT 0,
        longest_streak INTEGER NOT NULL DEFAULT 0,
        last_active_date TEXT,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS domain_skills (
        learner_id TEXT NOT NULL,
        domain_id TEXT NOT NULL,
        skill_rating REAL NOT NULL DEFAULT 1000,
        questions_answered INTEGER NOT NULL DEFAULT 0,
        questions_correct INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (learner_id, domain_id)
    );

    CREATE TABLE IF NOT EXISTS responses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        learner_id TEXT NOT NULL,
        item_id TEXT NOT NULL,
        selected_index INTEGER NOT NULL,
        is_correct INTEGER NOT NULL,
        time_spent_seconds INTEGER,
        skill_before REAL NOT NULL,
        skill_after REAL NOT NULL,
        answered_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_responses_learner ON responses(learner_id, answered_at);

    CREATE TABLE IF NOT EXISTS daily_activity (
        learner_id TEXT NOT NULL,
        activity_date TEXT NOT NULL,
        questions_answered INTEGER NOT NULL DEFAULT 0,
        questions_correct INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (learner_id, activity_date)
    );

    CREATE TABLE IF NOT EXISTS review_queue (
        learner_id TEXT NOT NULL,
        item_id TEXT NOT NULL,
        concept_tag TEXT,
        ease_factor REAL NOT NULL DEFAULT 2.5,
        interval_hours INTEGER NOT NULL DEFAULT 24,
        repetitions INTEGER NOT NULL DEFAULT 0,
        mastery_score REAL NOT NULL DEFAULT 0,
        next_review_at TEXT NOT NULL,
        source TEXT NOT NULL DEFAULT 'manual',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (learner_id, item_id)
    );

    CREATE INDEX IF NOT EXISTS idx_review_queue_due ON review_queue(learner_id, next_review_at);

    CREATE TABLE IF NOT EXISTS simulation_sessions (
        id TEXT PRIMARY KEY,
        learner_id TEXT NOT NULL,
        certification_id TEXT NOT NULL,
        question_order TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'created',
        started_at TEXT NOT NULL,
        ended_at TEXT,
        score INTEGER,
        is_passed INTEGER,
        total_questions INTEGER NOT NULL,
        correct_answers INTEGER,
        time_taken_minutes REAL,
        result TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_simulation_sessions_learner ON simulation_sessions(learner_id, status);

    CREATE TABLE IF NOT EXISTS simulation_answers (
        session_id TEXT NOT NULL REFERENCES simulation_sessions(id),
        position INTEGER NOT NULL,
        item_id TEXT NOT NULL,
        selected_index INTEGER NOT NULL,
        time_spent_seconds INTEGER,
        PRIMARY KEY (session_id, position)
    );
";

/// Create all tables and indexes.
pub(crate) fn init(conn: &Connection) -> ProctorResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
