//! Repository tests against in-memory SQLite.
//!
//! Each module holds shared test functions taking a context of repo trait
//! objects, plus a `sqlite_tests` module wiring them to SQLite.

mod permissions;
