//! # Database Schema
//!
//! SQL schema definitions for the Journly database.
//!
//! ## Schema Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DATABASE SCHEMA                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────┐        ┌─────────────────────┐                 │
//! │  │     envelopes       │        │    preferences      │                 │
//! │  ├─────────────────────┤        ├─────────────────────┤                 │
//! │  │ id          (PK)    │        │ id (always 1)       │                 │
//! │  │ type                │        │ value (JSON blob)   │                 │
//! │  │ ciphertext          │        │ updated_at          │                 │
//! │  │ iv                  │        └─────────────────────┘                 │
//! │  │ created_at          │                                                │
//! │  │ updated_at          │        ┌─────────────────────┐                 │
//! │  └─────────────────────┘        │   schema_version    │                 │
//! │   idx: (type, updated_at)       └─────────────────────┘                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL to create all tables
pub const CREATE_TABLES: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Encrypted envelopes
-- One row per domain record. Only id/type/timestamps are plaintext;
-- ciphertext and iv are base64 AES-256-GCM output.
CREATE TABLE IF NOT EXISTS envelopes (
    id TEXT PRIMARY KEY,
    -- Record kind: 'entry' or 'story'
    type TEXT NOT NULL CHECK (type IN ('entry', 'story')),
    -- AES-256-GCM ciphertext with auth tag (base64)
    ciphertext TEXT NOT NULL,
    -- 12-byte IV, unique per record version (base64)
    iv TEXT NOT NULL,
    -- RFC 3339 UTC timestamps; fixed-width, so string order = time order
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
-- Descending (type, updated_at) range scans drive every listing
CREATE INDEX IF NOT EXISTS idx_envelopes_type_updated ON envelopes(type, updated_at DESC);
CREATE INDEX IF NOT EXISTS idx_envelopes_created ON envelopes(created_at);

-- Preferences document (single JSON row)
CREATE TABLE IF NOT EXISTS preferences (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
