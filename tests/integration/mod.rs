//! Integration tests for the deskfs virtual filesystem

mod editor_session;
mod persistence;
mod scenarios;
mod terminal_transcripts;
mod vfs_properties;
