//! SQL for the `store` table.
//!
//! Every statement is valid on PostgreSQL, CockroachDB and SQLite (>= 3.24): placeholders use the
//! `$n` form and the upsert is spelled `INSERT ... ON CONFLICT DO UPDATE`.

pub const CREATE_STORE: &str = r#"
CREATE TABLE IF NOT EXISTS store (
    pid BIGINT PRIMARY KEY,
    quantity BIGINT NOT NULL,
    pname VARCHAR
)
"#;

pub const UPSERT_ITEM: &str = r#"
INSERT INTO store (pid, quantity, pname)
VALUES ($1, $2, $3)
ON CONFLICT (pid) DO UPDATE SET
    quantity = excluded.quantity,
    pname = excluded.pname
"#;

pub const INSERT_ITEM: &str = "INSERT INTO store (pid, quantity, pname) VALUES ($1, $2, $3)";

pub const SELECT_QUANTITY: &str = "SELECT quantity FROM store WHERE pid = $1";

pub const DECREMENT_QUANTITY: &str = "UPDATE store SET quantity = quantity - $1 WHERE pid = $2";

pub const DELETE_ITEM: &str = "DELETE FROM store WHERE pid = $1";

// NULL labels can exist in tables created by older tooling.
pub const SELECT_ALL: &str = r#"
SELECT pid, quantity, COALESCE(pname, '') AS pname
FROM store
ORDER BY pid
"#;

/// Applied as the first statement of every PostgreSQL-wire transaction.
pub const SET_SERIALIZABLE: &str = "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE";
