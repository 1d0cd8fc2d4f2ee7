//! Transaction scoped providers.
//!
//! Each provider wraps a reference to an open MDBX transaction and implements one concern:
//! - Decoded records (via [`RecordProvider`])
//! - Ingestion cursors (via [`CursorProvider`])
//! - Named flags (via [`FlagProvider`])
//!
//! Providers never open or commit transactions themselves, so several of them can be combined
//! in a single atomic write.

mod record_provider;
pub(crate) use record_provider::RecordProvider;

mod cursor_provider;
pub(crate) use cursor_provider::CursorProvider;

mod flag_provider;
pub(crate) use flag_provider::FlagProvider;
