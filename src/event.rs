//! `LoggingEvent`: the immutable record handed down from a logger to its
//! appenders. Most fields are filled in eagerly at construction; a handful
//! of "environment" fields (thread name, user name, identity, domain,
//! properties snapshot) are expensive enough to collect that they're only
//! captured on first access, memoized behind a [`FixFlags`] bit so repeat
//! access (e.g. from several appenders on the same node) doesn't redo the
//! work.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

use crate::level::Level;

/// Anything that can serve as a log message: `Display` for rendering,
/// `Debug` so appenders can fall back to it, `Send + Sync` so events can
/// cross thread boundaries to appenders running elsewhere.
pub trait Message: fmt::Display + fmt::Debug + Send + Sync {}

impl<T: fmt::Display + fmt::Debug + Send + Sync + ?Sized> Message for T {}

/// A reference-counted, type-erased log message.
pub type MessageObject = Arc<dyn Message>;

/// Where in the source a log call was made. Captured eagerly (it's cheap:
/// two `&'static str`s and a line number) rather than gated by
/// [`FixFlags::LOCATION_INFO`] like the other lazy fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationInfo {
    pub file: &'static str,
    pub line: u32,
}

/// Bitset recording which lazily-captured fields of a [`LoggingEvent`] have
/// been fixed (captured and frozen) so far, and which the caller wants
/// fixed eagerly at construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixFlags(u16);

impl FixFlags {
    pub const NONE: FixFlags = FixFlags(0);
    pub const THREAD_NAME: FixFlags = FixFlags(1 << 0);
    pub const USER_NAME: FixFlags = FixFlags(1 << 1);
    pub const IDENTITY: FixFlags = FixFlags(1 << 2);
    pub const DOMAIN: FixFlags = FixFlags(1 << 3);
    pub const PROPERTIES: FixFlags = FixFlags(1 << 4);
    pub const MESSAGE: FixFlags = FixFlags(1 << 5);

    /// The fields cheap enough, and common enough, to fix by default:
    /// everything except identity and the properties snapshot.
    pub const PARTIAL: FixFlags = FixFlags(
        Self::THREAD_NAME.0 | Self::DOMAIN.0 | Self::MESSAGE.0,
    );

    pub const ALL: FixFlags = FixFlags(
        Self::THREAD_NAME.0
            | Self::USER_NAME.0
            | Self::IDENTITY.0
            | Self::DOMAIN.0
            | Self::PROPERTIES.0
            | Self::MESSAGE.0,
    );

    pub fn contains(self, other: FixFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FixFlags {
    type Output = FixFlags;
    fn bitor(self, rhs: FixFlags) -> FixFlags {
        FixFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for FixFlags {
    fn bitor_assign(&mut self, rhs: FixFlags) {
        self.0 |= rhs.0;
    }
}

/// An immutable, partially-lazy snapshot of a single log call.
#[derive(Debug)]
pub struct LoggingEvent {
    logger_name: String,
    level: Level,
    message: MessageObject,
    timestamp_utc: DateTime<Utc>,
    exception: Option<Arc<dyn std::error::Error + Send + Sync>>,
    location_info: LocationInfo,
    fix_flags: FixFlags,

    thread_name: OnceLock<String>,
    user_name: OnceLock<String>,
    identity: OnceLock<String>,
    domain: OnceLock<String>,
    properties: OnceLock<BTreeMap<String, String>>,
}

impl LoggingEvent {
    #[track_caller]
    pub fn builder(logger_name: impl Into<String>, level: Level, message: MessageObject) -> LoggingEventBuilder {
        let caller = std::panic::Location::caller();
        LoggingEventBuilder {
            logger_name: logger_name.into(),
            level,
            message,
            exception: None,
            location_info: LocationInfo {
                file: caller.file(),
                line: caller.line(),
            },
            fix_flags: FixFlags::PARTIAL,
            properties: BTreeMap::new(),
        }
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn message(&self) -> &MessageObject {
        &self.message
    }

    pub fn timestamp_utc(&self) -> DateTime<Utc> {
        self.timestamp_utc
    }

    pub fn exception(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        self.exception.as_deref()
    }

    pub fn location_info(&self) -> &LocationInfo {
        &self.location_info
    }

    pub fn fix_flags(&self) -> FixFlags {
        self.fix_flags
    }

    /// The capturing thread's name, fixed on first access.
    pub fn thread_name(&self) -> &str {
        self.thread_name.get_or_init(|| {
            std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_owned()
        })
    }

    /// The OS user running the process, fixed on first access.
    pub fn user_name(&self) -> &str {
        self.user_name.get_or_init(|| {
            std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "unknown".to_owned())
        })
    }

    /// A process-wide identity string, fixed on first access. There is no
    /// portable notion of "thread principal" in Rust, so this defaults to
    /// the process id, which is at least stable for the event's lifetime.
    pub fn identity(&self) -> &str {
        self.identity
            .get_or_init(|| std::process::id().to_string())
    }

    /// The "domain" an event was raised in. Rust has no AppDomain
    /// equivalent; this defaults to the running executable's file name.
    pub fn domain(&self) -> &str {
        self.domain.get_or_init(|| {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "unknown".to_owned())
        })
    }

    /// A snapshot of the repository-wide properties map at the moment it was
    /// first observed, taken at most once for the lifetime of this event.
    pub fn properties_snapshot(&self, current: impl FnOnce() -> BTreeMap<String, String>) -> &BTreeMap<String, String> {
        self.properties.get_or_init(current)
    }
}

/// Builds a [`LoggingEvent`], eagerly fixing whichever fields
/// [`FixFlags`] requests.
pub struct LoggingEventBuilder {
    logger_name: String,
    level: Level,
    message: MessageObject,
    exception: Option<Arc<dyn std::error::Error + Send + Sync>>,
    location_info: LocationInfo,
    fix_flags: FixFlags,
    properties: BTreeMap<String, String>,
}

impl LoggingEventBuilder {
    pub fn exception(mut self, exception: Arc<dyn std::error::Error + Send + Sync>) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn fix_flags(mut self, flags: FixFlags) -> Self {
        self.fix_flags = flags;
        self
    }

    pub fn properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn build(self) -> LoggingEvent {
        let event = LoggingEvent {
            logger_name: self.logger_name,
            level: self.level,
            message: self.message,
            timestamp_utc: Utc::now(),
            exception: self.exception,
            location_info: self.location_info,
            fix_flags: self.fix_flags,
            thread_name: OnceLock::new(),
            user_name: OnceLock::new(),
            identity: OnceLock::new(),
            domain: OnceLock::new(),
            properties: OnceLock::new(),
        };

        if event.fix_flags.contains(FixFlags::THREAD_NAME) {
            let _ = event.thread_name();
        }
        if event.fix_flags.contains(FixFlags::USER_NAME) {
            let _ = event.user_name();
        }
        if event.fix_flags.contains(FixFlags::IDENTITY) {
            let _ = event.identity();
        }
        if event.fix_flags.contains(FixFlags::DOMAIN) {
            let _ = event.domain();
        }
        if event.fix_flags.contains(FixFlags::PROPERTIES) {
            let properties = self.properties.clone();
            let _ = event.properties_snapshot(|| properties);
        }

        event
    }
}
