//! Shared constants for end-to-end tests

// ============================================================================
// Seed Songs
// ============================================================================

/// Songs inserted by [`crate::common::TestClient::seed`], oldest first.
/// Columns are title, artist, album, genre.
pub const SEED_SONGS: &[(&str, &str, &str, &str)] = &[
    ("So What", "Miles Davis", "Kind of Blue", "Jazz"),
    ("Blue in Green", "Miles Davis", "Kind of Blue", "Jazz"),
    ("Come Together", "The Beatles", "Abbey Road", "Rock"),
    ("Something", "The Beatles", "Abbey Road", "Rock"),
    ("Help!", "The Beatles", "Help!", "Rock"),
    ("Kashmir", "Led Zeppelin", "Physical Graffiti", "Rock"),
];

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to answer /health (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
