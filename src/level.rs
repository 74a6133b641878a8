//! Severity levels and the vocabulary that maps names to them.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// A severity level.
///
/// Levels are ordered by [`Level::value`]; higher values are more severe.
/// Two levels are equal iff their values are equal, regardless of name —
/// this lets a custom level alias a standard one.
#[derive(Clone, Debug)]
pub struct Level {
    value: i64,
    name: String,
    display_name: String,
}

impl Level {
    /// Creates a new level. `display_name` defaults to `name` if not given.
    pub fn new(name: impl Into<String>, value: i64, display_name: Option<String>) -> Level {
        let name = name.into();
        let display_name = display_name.unwrap_or_else(|| name.clone());
        Level {
            value,
            name,
            display_name,
        }
    }

    /// The ordering value of this level. Higher is more severe.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// The canonical, upper-cased-by-convention name (e.g. `"DEBUG"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name to use when rendering this level to a human.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Level) -> bool {
        self.value == other.value
    }
}

impl Eq for Level {}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Level) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Level) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// An ordered, case-insensitive vocabulary of [`Level`]s.
///
/// A freshly constructed `LevelMap` always contains the five standard
/// levels (`DEBUG`, `INFO`, `WARN`, `ERROR`, `FATAL`) plus the two sentinel
/// levels `ALL` and `OFF`. Custom levels can be layered in at configure time
/// via [`LevelMap::add`].
#[derive(Clone, Debug)]
pub struct LevelMap {
    by_name: HashMap<String, Level>,
    order: Vec<String>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Default for LevelMap {
    fn default() -> LevelMap {
        LevelMap::new()
    }
}

impl LevelMap {
    /// Builds the standard vocabulary: `ALL`, `DEBUG`, `INFO`, `WARN`,
    /// `ERROR`, `FATAL`, `OFF`, in that order.
    pub fn new() -> LevelMap {
        let mut map = LevelMap {
            by_name: HashMap::new(),
            order: Vec::new(),
        };
        map.add("ALL", i64::MIN, None);
        map.add("DEBUG", 30_000, None);
        map.add("INFO", 40_000, None);
        map.add("WARN", 60_000, None);
        map.add("ERROR", 70_000, None);
        map.add("FATAL", 110_000, None);
        map.add("OFF", i64::MAX, None);
        map
    }

    /// Inserts or replaces (by name, case-insensitively) a level, returning
    /// the stored copy.
    ///
    /// Two distinct names may map to the same `value`; the last writer for a
    /// given *name* wins, but no attempt is made to de-duplicate by value.
    pub fn add(&mut self, name: impl Into<String>, value: i64, display_name: Option<String>) -> Level {
        let name = name.into();
        let level = Level::new(name.clone(), value, display_name);
        let k = key(&name);
        if self.by_name.insert(k.clone(), level.clone()).is_none() {
            self.order.push(k);
        }
        level
    }

    /// Case-insensitive lookup by name.
    pub fn lookup(&self, name: &str) -> Option<Level> {
        self.by_name.get(&key(name)).cloned()
    }

    /// Returns the map's entry matching `level.name()` if present, otherwise
    /// inserts `level` under its own name and returns it back.
    pub fn lookup_with_default(&mut self, level: Level) -> Level {
        match self.lookup(level.name()) {
            Some(existing) => existing,
            None => self.add(level.name().to_owned(), level.value(), Some(level.display_name().to_owned())),
        }
    }

    /// All registered levels, in insertion order.
    pub fn all_levels(&self) -> Vec<Level> {
        self.order
            .iter()
            .map(|k| self.by_name[k].clone())
            .collect()
    }
}
