//! SQLite-backed assessment store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use super::schema;
use crate::config::RatingConfig;
use crate::error::{ErrorCode, ProctorError, ProctorResult};
use crate::rating::update_ratings_with_k;
use crate::traits::{ItemStore, LearnerStore, ReviewStore, SimulationStore};
use crate::types::{
    Certification, CertificationSummary, Domain, DomainSkill, DueReview, Item, ItemQuery,
    ItemView, PracticeAnswer, PracticeRatings, RecordedAnswer, ReviewEntry, ReviewSource,
    SessionStatus, SimulationResult, SimulationSession, SimulationSummary, SkillProfile,
};

/// Concept group for entries without a tag.
pub(crate) const UNTAGGED_CONCEPT: &str = "General";

const ITEM_COLUMNS: &str = "i.id, i.domain_id, i.certification_id, i.difficulty_estimate, \
     i.content, i.concept_tag, i.times_answered, i.times_correct, i.created_at";

const REVIEW_COLUMNS: &str = "learner_id, item_id, concept_tag, ease_factor, interval_hours, \
     repetitions, mastery_score, next_review_at, source, created_at, updated_at";

/// SQLite store implementing every collaborator trait.
///
/// All calls serialize on one connection, which makes each read-modify-write
/// inside a single method atomic.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn new<P: AsRef<Path>>(path: P) -> ProctorResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> ProctorResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> ProctorResult<Self> {
        schema::init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> ProctorResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| ProctorError::store(e.to_string()))
    }

    /// Insert or replace a certification.
    pub fn insert_certification(&self, certification: &Certification) -> ProctorResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO certifications (id, code, title, description, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                certification.id,
                certification.code,
                certification.title,
                certification.description,
                certification.is_active,
            ],
        )?;
        Ok(())
    }

    /// Insert or replace a domain.
    pub fn insert_domain(&self, domain: &Domain) -> ProctorResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO domains (id, certification_id, name, weight, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                domain.id,
                domain.certification_id,
                domain.name,
                domain.weight,
                domain.sort_order,
            ],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> ProctorResult<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }
}

#[async_trait]
impl ItemStore for SqliteStore {
    async fn list_certifications(&self) -> ProctorResult<Vec<CertificationSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.code, c.title, c.description, c.is_active,
                    (SELECT COUNT(*) FROM items i WHERE i.certification_id = c.id)
             FROM certifications c
             WHERE c.is_active = 1
             ORDER BY c.code",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CertificationSummary {
                certification: certification_from_row(row)?,
                item_count: row.get::<_, i64>(5)? as u64,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_certification(&self, id: &str) -> ProctorResult<Option<Certification>> {
        let conn = self.conn()?;
        let cert = conn
            .query_row(
                "SELECT id, code, title, description, is_active FROM certifications WHERE id = ?1",
                params![id],
                certification_from_row,
            )
            .optional()?;
        Ok(cert)
    }

    async fn get_certification_by_code(&self, code: &str) -> ProctorResult<Option<Certification>> {
        let conn = self.conn()?;
        let cert = conn
            .query_row(
                "SELECT id, code, title, description, is_active FROM certifications
                 WHERE code = ?1",
                params![code],
                certification_from_row,
            )
            .optional()?;
        Ok(cert)
    }

    async fn list_domains(&self, certification_id: &str) -> ProctorResult<Vec<Domain>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, certification_id, name, weight, sort_order FROM domains
             WHERE certification_id = ?1
             ORDER BY sort_order, rowid",
        )?;
        let rows = stmt.query_map(params![certification_id], |row| {
            Ok(Domain {
                id: row.get(0)?,
                certification_id: row.get(1)?,
                name: row.get(2)?,
                weight: row.get(3)?,
                sort_order: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_item(&self, id: &str) -> ProctorResult<Option<Item>> {
        let conn = self.conn()?;
        let item = conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items i WHERE i.id = ?1"),
                params![id],
                item_from_row,
            )
            .optional()?;
        Ok(item)
    }

    async fn get_item_view(&self, id: &str) -> ProctorResult<Option<ItemView>> {
        let conn = self.conn()?;
        let view = conn
            .query_row(
                &format!(
                    "SELECT {ITEM_COLUMNS}, d.name, d.weight
                     FROM items i JOIN domains d ON d.id = i.domain_id
                     WHERE i.id = ?1"
                ),
                params![id],
                |row| {
                    Ok(ItemView {
                        item: item_from_row(row)?,
                        domain_name: row.get(9)?,
                        domain_weight: row.get(10)?,
                    })
                },
            )
            .optional()?;
        Ok(view)
    }

    async fn find_items(&self, query: &ItemQuery) -> ProctorResult<Vec<Item>> {
        let mut sql = format!("SELECT {ITEM_COLUMNS} FROM items i WHERE i.domain_id = ?");
        let mut values: Vec<Value> = vec![Value::Text(query.domain_id.clone())];

        if let Some(min) = query.min_difficulty {
            sql.push_str(" AND i.difficulty_estimate >= ?");
            values.push(Value::Real(min));
        }
        if let Some(max) = query.max_difficulty {
            sql.push_str(" AND i.difficulty_estimate <= ?");
            values.push(Value::Real(max));
        }
        if let Some(learner_id) = &query.unanswered_by {
            sql.push_str(" AND i.id NOT IN (SELECT item_id FROM responses WHERE learner_id = ?)");
            values.push(Value::Text(learner_id.clone()));
        }
        if !query.exclude_ids.is_empty() {
            let placeholders = vec!["?"; query.exclude_ids.len()].join(", ");
            sql.push_str(&format!(" AND i.id NOT IN ({placeholders})"));
            values.extend(query.exclude_ids.iter().cloned().map(Value::Text));
        }
        sql.push_str(" ORDER BY i.created_at, i.rowid LIMIT ?");
        values.push(Value::Integer(if query.limit == 0 {
            -1
        } else {
            query.limit as i64
        }));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), item_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn insert_item(&self, item: &Item) -> ProctorResult<()> {
        let content = serde_json::to_string(&item.content)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO items (id, domain_id, certification_id, difficulty_estimate, content,
                                concept_tag, times_answered, times_correct, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                item.id,
                item.domain_id,
                item.certification_id,
                item.difficulty_estimate,
                content,
                item.concept_tag,
                item.times_answered,
                item.times_correct,
                ts(item.created_at),
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl LearnerStore for SqliteStore {
    async fn get_profile(&self, learner_id: &str) -> ProctorResult<Option<SkillProfile>> {
        let conn = self.conn()?;
        let profile = conn
            .query_row(
                "SELECT global_skill, current_streak, longest_streak, last_active_date
                 FROM skill_profiles WHERE learner_id = ?1",
                params![learner_id],
                |row| {
                    let last_active: Option<String> = row.get(3)?;
                    let last_active_date = last_active
                        .map(|s| NaiveDate::from_str(&s).map_err(|e| conversion(3, e)))
                        .transpose()?;
                    Ok(SkillProfile {
                        learner_id: learner_id.to_string(),
                        global_skill: row.get(0)?,
                        domain_skills: HashMap::new(),
                        current_streak: row.get(1)?,
                        longest_streak: row.get(2)?,
                        last_active_date,
                    })
                },
            )
            .optional()?;

        let Some(mut profile) = profile else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT domain_id, skill_rating, questions_answered, questions_correct
             FROM domain_skills WHERE learner_id = ?1",
        )?;
        let rows = stmt.query_map(params![learner_id], |row| {
            Ok(DomainSkill {
                domain_id: row.get(0)?,
                skill_rating: row.get(1)?,
                questions_answered: row.get(2)?,
                questions_correct: row.get(3)?,
            })
        })?;
        for skill in rows {
            let skill = skill?;
            profile.domain_skills.insert(skill.domain_id.clone(), skill);
        }

        Ok(Some(profile))
    }

    async fn update_streak(&self, profile: &SkillProfile) -> ProctorResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE skill_profiles
             SET current_streak = ?2, longest_streak = ?3, last_active_date = ?4, updated_at = ?5
             WHERE learner_id = ?1",
            params![
                profile.learner_id,
                profile.current_streak,
                profile.longest_streak,
                profile.last_active_date.map(|d| d.to_string()),
                ts(Utc::now()),
            ],
        )?;
        Ok(())
    }

    async fn record_practice_answer(
        &self,
        answer: &PracticeAnswer,
        rating: &RatingConfig,
    ) -> ProctorResult<PracticeRatings> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let (domain_id, difficulty_before): (String, f64) = tx
            .query_row(
                "SELECT domain_id, difficulty_estimate FROM items WHERE id = ?1",
                params![answer.item_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| ProctorError::item_not_found(&answer.item_id))?;
        let skill_before: f64 = tx
            .query_row(
                "SELECT global_skill FROM skill_profiles WHERE learner_id = ?1",
                params![answer.learner_id],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(rating.default_rating);
        let domain_before: f64 = tx
            .query_row(
                "SELECT skill_rating FROM domain_skills WHERE learner_id = ?1 AND domain_id = ?2",
                params![answer.learner_id, domain_id],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(rating.default_rating);

        let global = update_ratings_with_k(
            skill_before,
            difficulty_before,
            answer.is_correct,
            rating.k_factor,
        );
        let domain = update_ratings_with_k(
            domain_before,
            difficulty_before,
            answer.is_correct,
            rating.k_factor,
        );
        let correct = i64::from(answer.is_correct);
        let answered_at = ts(answer.answered_at);

        tx.execute(
            "INSERT INTO skill_profiles (learner_id, global_skill, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(learner_id) DO UPDATE SET
                 global_skill = excluded.global_skill,
                 updated_at = excluded.updated_at",
            params![answer.learner_id, global.new_skill, answered_at],
        )?;
        tx.execute(
            "INSERT INTO domain_skills
             (learner_id, domain_id, skill_rating, questions_answered, questions_correct)
             VALUES (?1, ?2, ?3, 1, ?4)
             ON CONFLICT(learner_id, domain_id) DO UPDATE SET
                 skill_rating = excluded.skill_rating,
                 questions_answered = questions_answered + 1,
                 questions_correct = questions_correct + excluded.questions_correct",
            params![answer.learner_id, domain_id, domain.new_skill, correct],
        )?;
        tx.execute(
            "UPDATE items SET difficulty_estimate = ?2,
                              times_answered = times_answered + 1,
                              times_correct = times_correct + ?3
             WHERE id = ?1",
            params![answer.item_id, global.new_difficulty, correct],
        )?;
        tx.execute(
            "INSERT INTO responses (learner_id, item_id, selected_index, is_correct,
                                    time_spent_seconds, skill_before, skill_after, answered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                answer.learner_id,
                answer.item_id,
                answer.selected_index,
                answer.is_correct,
                answer.time_spent_seconds,
                skill_before,
                global.new_skill,
                answered_at,
            ],
        )?;
        tx.commit()?;

        Ok(PracticeRatings {
            skill_before,
            skill_after: global.new_skill,
            domain_skill_after: domain.new_skill,
            difficulty_before,
            difficulty_after: global.new_difficulty,
            expected: global.expected,
        })
    }

    async fn recent_outcomes(
        &self,
        learner_id: &str,
        certification_id: &str,
        limit: usize,
    ) -> ProctorResult<Vec<bool>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT r.is_correct FROM responses r
             JOIN items i ON i.id = r.item_id
             WHERE r.learner_id = ?1 AND i.certification_id = ?2
             ORDER BY r.answered_at DESC, r.id DESC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![learner_id, certification_id, limit as i64], |row| {
            row.get(0)
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn record_daily_activity(
        &self,
        learner_id: &str,
        date: NaiveDate,
        correct: bool,
    ) -> ProctorResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO daily_activity (learner_id, activity_date, questions_answered, questions_correct)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(learner_id, activity_date) DO UPDATE SET
                 questions_answered = questions_answered + 1,
                 questions_correct = questions_correct + excluded.questions_correct",
            params![learner_id, date.to_string(), i64::from(correct)],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for SqliteStore {
    async fn get_review(
        &self,
        learner_id: &str,
        item_id: &str,
    ) -> ProctorResult<Option<ReviewEntry>> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                &format!(
                    "SELECT {REVIEW_COLUMNS} FROM review_queue
                     WHERE learner_id = ?1 AND item_id = ?2"
                ),
                params![learner_id, item_id],
                review_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    async fn insert_review(&self, entry: &ReviewEntry) -> ProctorResult<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO review_queue ({REVIEW_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                entry.learner_id,
                entry.item_id,
                entry.concept_tag,
                entry.ease_factor,
                entry.interval_hours,
                entry.repetitions,
                entry.mastery_score,
                ts(entry.next_review_at),
                entry.source.to_string(),
                ts(entry.created_at),
                ts(entry.updated_at),
            ],
        )?;
        Ok(inserted == 1)
    }

    async fn update_review(&self, entry: &ReviewEntry) -> ProctorResult<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE review_queue
             SET ease_factor = ?3, interval_hours = ?4, repetitions = ?5, mastery_score = ?6,
                 next_review_at = ?7, updated_at = ?8
             WHERE learner_id = ?1 AND item_id = ?2",
            params![
                entry.learner_id,
                entry.item_id,
                entry.ease_factor,
                entry.interval_hours,
                entry.repetitions,
                entry.mastery_score,
                ts(entry.next_review_at),
                ts(entry.updated_at),
            ],
        )?;
        if updated == 0 {
            return Err(ProctorError::not_found(
                ErrorCode::NfReview,
                "Review entry",
                &entry.item_id,
            ));
        }
        Ok(())
    }

    async fn due_reviews(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> ProctorResult<Vec<DueReview>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT r.item_id, COALESCE(r.concept_tag, i.concept_tag, ?4), i.content, d.name,
                    r.next_review_at, r.mastery_score, r.repetitions
             FROM review_queue r
             JOIN items i ON i.id = r.item_id
             JOIN domains d ON d.id = i.domain_id
             WHERE r.learner_id = ?1 AND r.next_review_at <= ?2
             ORDER BY r.next_review_at ASC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![learner_id, ts(now), limit as i64, UNTAGGED_CONCEPT],
            |row| {
                let content: crate::types::ItemContent = json_column(row, 2)?;
                Ok(DueReview {
                    item_id: row.get(0)?,
                    concept_tag: row.get(1)?,
                    question: content.question,
                    domain: row.get(3)?,
                    next_review_at: ts_column(row, 4)?,
                    mastery_score: row.get(5)?,
                    repetitions: row.get(6)?,
                })
            },
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn list_reviews(&self, learner_id: &str) -> ProctorResult<Vec<ReviewEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review_queue WHERE learner_id = ?1
             ORDER BY next_review_at"
        ))?;
        let rows = stmt.query_map(params![learner_id], review_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn delete_review(&self, learner_id: &str, item_id: &str) -> ProctorResult<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM review_queue WHERE learner_id = ?1 AND item_id = ?2",
            params![learner_id, item_id],
        )?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl SimulationStore for SqliteStore {
    async fn insert_session(&self, session: &SimulationSession) -> ProctorResult<()> {
        let order = serde_json::to_string(&session.question_order)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO simulation_sessions
             (id, learner_id, certification_id, question_order, status, started_at, total_questions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.id,
                session.learner_id,
                session.certification_id,
                order,
                session.status.to_string(),
                ts(session.started_at),
                session.question_order.len() as i64,
            ],
        )?;
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> ProctorResult<Option<SimulationSession>> {
        let conn = self.conn()?;
        let session = conn
            .query_row(
                "SELECT id, learner_id, certification_id, question_order, status, started_at,
                        ended_at, result
                 FROM simulation_sessions WHERE id = ?1",
                params![session_id],
                |row| {
                    let status: String = row.get(4)?;
                    let ended_at: Option<String> = row.get(6)?;
                    let result: Option<String> = row.get(7)?;
                    Ok(SimulationSession {
                        id: row.get(0)?,
                        learner_id: row.get(1)?,
                        certification_id: row.get(2)?,
                        question_order: json_column(row, 3)?,
                        status: SessionStatus::from_str(&status).map_err(|e| conversion(4, e))?,
                        started_at: ts_column(row, 5)?,
                        ended_at: ended_at.map(|s| parse_ts(&s, 6)).transpose()?,
                        answers: BTreeMap::new(),
                        result: result
                            .map(|s| serde_json::from_str(&s).map_err(|e| conversion(7, e)))
                            .transpose()?,
                    })
                },
            )
            .optional()?;

        let Some(mut session) = session else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT position, item_id, selected_index, time_spent_seconds
             FROM simulation_answers WHERE session_id = ?1",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            let position: i64 = row.get(0)?;
            Ok((
                position as usize,
                RecordedAnswer {
                    item_id: row.get(1)?,
                    selected_index: row.get(2)?,
                    time_spent_seconds: row.get(3)?,
                },
            ))
        })?;
        for answer in rows {
            let (position, answer) = answer?;
            session.answers.insert(position, answer);
        }

        Ok(Some(session))
    }

    async fn record_answer(
        &self,
        session_id: &str,
        index: usize,
        answer: &RecordedAnswer,
    ) -> ProctorResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM simulation_sessions WHERE id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        match status.as_deref() {
            None => return Err(ProctorError::session_not_found(session_id)),
            Some(s) if s == SessionStatus::Completed.to_string() => {
                return Err(ProctorError::state(
                    ErrorCode::StateSessionCompleted,
                    format!("Simulation session '{}' is already completed", session_id),
                ));
            }
            Some(_) => {}
        }

        tx.execute(
            "INSERT OR REPLACE INTO simulation_answers
             (session_id, position, item_id, selected_index, time_spent_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session_id,
                index as i64,
                answer.item_id,
                answer.selected_index,
                answer.time_spent_seconds,
            ],
        )?;
        tx.execute(
            "UPDATE simulation_sessions SET status = ?2 WHERE id = ?1 AND status = ?3",
            params![
                session_id,
                SessionStatus::InProgress.to_string(),
                SessionStatus::Created.to_string(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    async fn complete_session(
        &self,
        session_id: &str,
        result: &SimulationResult,
        ended_at: DateTime<Utc>,
    ) -> ProctorResult<bool> {
        let payload = serde_json::to_string(result)?;
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE simulation_sessions
             SET status = ?2, ended_at = ?3, score = ?4, is_passed = ?5, correct_answers = ?6,
                 time_taken_minutes = ?7, result = ?8
             WHERE id = ?1 AND status != ?2",
            params![
                session_id,
                SessionStatus::Completed.to_string(),
                ts(ended_at),
                result.score,
                result.is_passed,
                result.correct_answers,
                result.time_taken_minutes,
                payload,
            ],
        )?;
        Ok(updated == 1)
    }

    async fn list_completed_sessions(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> ProctorResult<Vec<SimulationSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, certification_id, score, is_passed, total_questions, correct_answers,
                    started_at, ended_at, time_taken_minutes
             FROM simulation_sessions
             WHERE learner_id = ?1 AND status = ?2
             ORDER BY started_at DESC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![
                learner_id,
                SessionStatus::Completed.to_string(),
                limit as i64
            ],
            |row| {
                let ended_at: Option<String> = row.get(7)?;
                Ok(SimulationSummary {
                    session_id: row.get(0)?,
                    certification_id: row.get(1)?,
                    score: row.get(2)?,
                    is_passed: row.get(3)?,
                    total_questions: row.get(4)?,
                    correct_answers: row.get(5)?,
                    started_at: ts_column(row, 6)?,
                    ended_at: ended_at.map(|s| parse_ts(&s, 7)).transpose()?,
                    time_taken_minutes: row.get(8)?,
                })
            },
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Fixed-width UTC timestamps so lexical order matches time order.
fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion(idx, e))
}

fn ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw, idx)
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion(idx, e))
}

fn conversion<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn certification_from_row(row: &Row<'_>) -> rusqlite::Result<Certification> {
    Ok(Certification {
        id: row.get(0)?,
        code: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        is_active: row.get(4)?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        domain_id: row.get(1)?,
        certification_id: row.get(2)?,
        difficulty_estimate: row.get(3)?,
        content: json_column(row, 4)?,
        concept_tag: row.get(5)?,
        times_answered: row.get(6)?,
        times_correct: row.get(7)?,
        created_at: ts_column(row, 8)?,
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewEntry> {
    let source: String = row.get(8)?;
    Ok(ReviewEntry {
        learner_id: row.get(0)?,
        item_id: row.get(1)?,
        concept_tag: row.get(2)?,
        ease_factor: row.get(3)?,
        interval_hours: row.get(4)?,
        repetitions: row.get(5)?,
        mastery_score: row.get(6)?,
        next_review_at: ts_column(row, 7)?,
        source: ReviewSource::from_str(&source).map_err(|e| conversion(8, e))?,
        created_at: ts_column(row, 9)?,
        updated_at: ts_column(row, 10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample_content;
    use chrono::Duration;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store
            .insert_certification(&Certification::new("c1", "DEA", "Data Engineer"))
            .unwrap();
        store
            .insert_domain(&Domain::new("d1", "c1", "Ingestion", 0.6, 1))
            .unwrap();
        store
            .insert_domain(&Domain::new("d2", "c1", "Storage", 0.4, 2))
            .unwrap();
        store
    }

    fn item(id: &str, domain: &str, difficulty: f64) -> Item {
        Item::new(domain, "c1", sample_content(id, 1))
            .with_id(id)
            .with_difficulty(difficulty)
    }

    #[tokio::test]
    async fn test_catalog_counts_items() {
        let store = seeded();
        store.insert_item(&item("q1", "d1", 1000.0)).await.unwrap();
        store.insert_item(&item("q2", "d2", 1000.0)).await.unwrap();

        let certs = store.list_certifications().await.unwrap();
        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].item_count, 2);

        let by_code = store.get_certification_by_code("DEA").await.unwrap();
        assert_eq!(by_code.map(|c| c.id).as_deref(), Some("c1"));

        let domains = store.list_domains("c1").await.unwrap();
        assert_eq!(
            domains.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            vec!["Ingestion", "Storage"]
        );
    }

    #[tokio::test]
    async fn test_find_items_window_and_exclusion() {
        let store = seeded();
        for (id, difficulty) in [("q1", 940.0), ("q2", 990.0), ("q3", 1050.0), ("q4", 1051.0)] {
            store.insert_item(&item(id, "d1", difficulty)).await.unwrap();
        }

        let query = ItemQuery::domain("d1", 10)
            .within(950.0, 1050.0)
            .excluding(vec!["q2".to_string()]);
        let found = store.find_items(&query).await.unwrap();
        assert_eq!(found.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["q3"]);

        let all = store.find_items(&ItemQuery::domain("d1", 0)).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    fn practice(item_id: &str, is_correct: bool) -> PracticeAnswer {
        PracticeAnswer {
            learner_id: "u1".to_string(),
            item_id: item_id.to_string(),
            selected_index: if is_correct { 1 } else { 0 },
            is_correct,
            time_spent_seconds: Some(30),
            answered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_practice_answer_updates_every_row() {
        let store = seeded();
        store.insert_item(&item("q1", "d1", 1000.0)).await.unwrap();
        store.insert_item(&item("q2", "d1", 1000.0)).await.unwrap();
        let rating = RatingConfig::default();

        let first = store
            .record_practice_answer(&practice("q1", true), &rating)
            .await
            .unwrap();
        assert_eq!(first.skill_before, 1000.0);
        assert_eq!(first.skill_after, 1016.0);
        assert_eq!(first.domain_skill_after, 1016.0);
        assert_eq!(first.difficulty_after, 984.0);

        let second = store
            .record_practice_answer(&practice("q2", false), &rating)
            .await
            .unwrap();
        assert_eq!(second.skill_before, 1016.0);
        assert!(second.skill_after < 1016.0);

        let profile = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.global_skill, second.skill_after);
        let domain = &profile.domain_skills["d1"];
        assert_eq!(domain.skill_rating, second.domain_skill_after);
        assert_eq!(domain.questions_answered, 2);
        assert_eq!(domain.questions_correct, 1);

        let q1 = store.get_item("q1").await.unwrap().unwrap();
        assert_eq!(q1.difficulty_estimate, 984.0);
        assert_eq!((q1.times_answered, q1.times_correct), (1, 1));
        assert_eq!(
            store.recent_outcomes("u1", "c1", 10).await.unwrap(),
            vec![false, true]
        );

        let missing = store
            .record_practice_answer(&practice("nope", true), &rating)
            .await;
        assert!(matches!(missing, Err(ProctorError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_failed_practice_answer_writes_nothing() {
        let store = seeded();
        store.insert_item(&item("q1", "d1", 1000.0)).await.unwrap();
        store.execute_batch("DROP TABLE responses;").unwrap();

        let err = store
            .record_practice_answer(&practice("q1", true), &RatingConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        assert!(store.get_profile("u1").await.unwrap().is_none());
        let q1 = store.get_item("q1").await.unwrap().unwrap();
        assert_eq!(q1.difficulty_estimate, 1000.0);
        assert_eq!(q1.times_answered, 0);
    }

    #[tokio::test]
    async fn test_streak_round_trip() {
        let store = seeded();
        store.insert_item(&item("q1", "d1", 1000.0)).await.unwrap();
        store
            .record_practice_answer(&practice("q1", true), &RatingConfig::default())
            .await
            .unwrap();

        let mut profile = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.domain_rating("d1"), Some(1016.0));

        profile.record_activity(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
        store.update_streak(&profile).await.unwrap();
        let reloaded = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(reloaded.current_streak, 1);
        assert_eq!(reloaded.last_active_date, profile.last_active_date);
        assert_eq!(reloaded.global_skill, 1016.0);
    }

    #[tokio::test]
    async fn test_find_items_skips_answered_by_learner() {
        let store = seeded();
        for id in ["q1", "q2", "q3"] {
            store.insert_item(&item(id, "d1", 1000.0)).await.unwrap();
        }
        store
            .record_practice_answer(&practice("q2", true), &RatingConfig::default())
            .await
            .unwrap();

        let unseen = store
            .find_items(&ItemQuery::domain("d1", 0).unanswered_by("u1"))
            .await
            .unwrap();
        assert_eq!(
            unseen.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            vec!["q1", "q3"]
        );

        let other = store
            .find_items(&ItemQuery::domain("d1", 0).unanswered_by("u2"))
            .await
            .unwrap();
        assert_eq!(other.len(), 3);
    }

    #[tokio::test]
    async fn test_review_insert_is_idempotent() {
        let store = seeded();
        store.insert_item(&item("q1", "d1", 1000.0)).await.unwrap();
        let now = Utc::now();
        let entry = ReviewEntry {
            learner_id: "u1".to_string(),
            item_id: "q1".to_string(),
            concept_tag: None,
            ease_factor: 2.5,
            interval_hours: 24,
            repetitions: 0,
            mastery_score: 0.0,
            next_review_at: now - Duration::hours(1),
            source: ReviewSource::Auto,
            created_at: now,
            updated_at: now,
        };

        assert!(store.insert_review(&entry).await.unwrap());
        assert!(!store.insert_review(&entry).await.unwrap());

        let due = store.due_reviews("u1", now, 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].concept_tag, UNTAGGED_CONCEPT);
        assert_eq!(due[0].domain, "Ingestion");

        assert!(store.delete_review("u1", "q1").await.unwrap());
        assert!(!store.delete_review("u1", "q1").await.unwrap());
    }

    #[tokio::test]
    async fn test_session_answers_and_completion_cas() {
        let store = seeded();
        let session = SimulationSession {
            id: "s1".to_string(),
            learner_id: "u1".to_string(),
            certification_id: "c1".to_string(),
            question_order: vec!["q1".to_string(), "q2".to_string()],
            answers: BTreeMap::new(),
            status: SessionStatus::Created,
            started_at: Utc::now(),
            ended_at: None,
            result: None,
        };
        store.insert_session(&session).await.unwrap();

        let answer = RecordedAnswer {
            item_id: "q1".to_string(),
            selected_index: 2,
            time_spent_seconds: Some(30),
        };
        store.record_answer("s1", 0, &answer).await.unwrap();
        let overwrite = RecordedAnswer {
            selected_index: 1,
            ..answer.clone()
        };
        store.record_answer("s1", 0, &overwrite).await.unwrap();

        let loaded = store.get_session("s1").await.unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::InProgress);
        assert_eq!(loaded.answers.len(), 1);
        assert_eq!(loaded.answers[&0].selected_index, 1);

        let result = SimulationResult {
            session_id: "s1".to_string(),
            score: 500,
            is_passed: false,
            pass_threshold: 700,
            total_questions: 2,
            correct_answers: 1,
            accuracy: 50.0,
            time_taken_minutes: 1.5,
            domain_results: Vec::new(),
            question_results: Vec::new(),
        };
        assert!(store.complete_session("s1", &result, Utc::now()).await.unwrap());
        assert!(!store.complete_session("s1", &result, Utc::now()).await.unwrap());

        let late = store.record_answer("s1", 1, &answer).await;
        assert!(matches!(late, Err(ProctorError::State { .. })));

        let history = store.list_completed_sessions("u1", 20).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score, 500);
        assert_eq!(history[0].total_questions, 2);
    }
}
