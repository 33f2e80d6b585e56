//! Maps driver errors onto the three classes the retry layer cares about.
//!
//! | Backend               | Code(s)                          | Class                   |
//! |-----------------------|----------------------------------|-------------------------|
//! | PostgreSQL/CockroachDB | `40001` (serialization_failure) | `SerializationConflict` |
//! | PostgreSQL/CockroachDB | `23505` (unique_violation)      | `ConstraintViolation`   |
//! | SQLite                | `5`, `6`, `261`, `262`, `517`    | `SerializationConflict` |
//! | SQLite                | `1555`, `2067`                   | `ConstraintViolation`   |
//! | any                   | anything else                    | `Other`                 |

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    SerializationConflict,
    ConstraintViolation,
    Other,
}

const PG_SERIALIZATION_FAILURE: &str = "40001";
const PG_UNIQUE_VIOLATION: &str = "23505";

// SQLITE_BUSY, SQLITE_LOCKED, SQLITE_BUSY_RECOVERY, SQLITE_LOCKED_SHAREDCACHE, SQLITE_BUSY_SNAPSHOT
const SQLITE_LOCK_CONTENTION: [&str; 5] = ["5", "6", "261", "262", "517"];
// SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE
const SQLITE_KEY_VIOLATION: [&str; 2] = ["1555", "2067"];

pub fn classify(err: &sqlx::Error) -> ErrorClass {
    match err {
        sqlx::Error::Database(db_err) => {
            classify_code(db_err.code().as_deref(), db_err.is_unique_violation())
        }
        _ => ErrorClass::Other,
    }
}

fn classify_code(code: Option<&str>, unique_violation: bool) -> ErrorClass {
    match code {
        Some(PG_SERIALIZATION_FAILURE) => ErrorClass::SerializationConflict,
        Some(code) if SQLITE_LOCK_CONTENTION.contains(&code) => ErrorClass::SerializationConflict,
        Some(PG_UNIQUE_VIOLATION) => ErrorClass::ConstraintViolation,
        Some(code) if SQLITE_KEY_VIOLATION.contains(&code) => ErrorClass::ConstraintViolation,
        _ if unique_violation => ErrorClass::ConstraintViolation,
        _ => ErrorClass::Other,
    }
}
