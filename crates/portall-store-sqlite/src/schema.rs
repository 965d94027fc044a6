//! SQL schema for the Portall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS colleges (
    college_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- `sport` is written once at registration and never updated.
CREATE TABLE IF NOT EXISTS coaches (
    coach_id    TEXT PRIMARY KEY,
    college_id  TEXT NOT NULL REFERENCES colleges(college_id),
    name        TEXT NOT NULL,
    sport       TEXT NOT NULL,    -- 'mens_soccer' | 'womens_soccer'
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS players (
    player_id   TEXT PRIMARY KEY,
    college_id  TEXT NOT NULL REFERENCES colleges(college_id),
    name        TEXT NOT NULL,
    gender      TEXT NOT NULL,    -- 'male' | 'female'
    position    TEXT,
    visible     INTEGER NOT NULL DEFAULT 1,
    active      INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

-- Evaluations are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table. The current
-- record of a pair is the one with the highest version.
CREATE TABLE IF NOT EXISTS evaluations (
    evaluation_id            TEXT PRIMARY KEY,
    coach_id                 TEXT NOT NULL REFERENCES coaches(coach_id),
    player_id                TEXT NOT NULL REFERENCES players(player_id),
    version                  INTEGER NOT NULL CHECK (version >= 1),
    created_at               TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    available_to_transfer    INTEGER NOT NULL,
    expected_graduation_year INTEGER NOT NULL,
    role_in_team             TEXT NOT NULL,
    performance_level        TEXT NOT NULL,
    player_strengths         TEXT NOT NULL,
    improvement_areas        TEXT NOT NULL,
    mentality                TEXT NOT NULL,
    coachability             TEXT NOT NULL,
    technique                TEXT NOT NULL,
    physique                 TEXT NOT NULL,
    coach_final_comment      TEXT NOT NULL,
    UNIQUE (coach_id, player_id, version)
);

CREATE INDEX IF NOT EXISTS coaches_college_idx     ON coaches(college_id);
CREATE INDEX IF NOT EXISTS players_college_idx     ON players(college_id);
CREATE INDEX IF NOT EXISTS evaluations_coach_idx   ON evaluations(coach_id, created_at);

PRAGMA user_version = 1;
";
