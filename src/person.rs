//! Person records and the id-keyed table built during ingestion.

use std::collections::{BTreeMap, btree_map};
use std::fmt;

use chrono::NaiveDate;

/// Output format for birthdays, e.g. `2006 07 23`.
pub const BIRTHDAY_DISPLAY_FORMAT: &str = "%Y %m %d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub birthday: NaiveDate,
}

impl Person {
    pub fn new(name: impl Into<String>, birthday: NaiveDate) -> Self {
        Self {
            name: name.into(),
            birthday,
        }
    }

    pub fn birthday_display(&self) -> String {
        self.birthday.format(BIRTHDAY_DISPLAY_FORMAT).to_string()
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with a birthday of {}",
            self.name,
            self.birthday_display()
        )
    }
}

/// People keyed by identifier. A later insert for the same id replaces the
/// earlier record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonTable {
    people: BTreeMap<i64, Person>,
}

impl PersonTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `person` under `id`, returning the record it replaced.
    pub fn insert(&mut self, id: i64, person: Person) -> Option<Person> {
        self.people.insert(id, person)
    }

    pub fn get(&self, id: i64) -> Option<&Person> {
        self.people.get(&id)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, i64, Person> {
        self.people.iter()
    }
}

impl FromIterator<(i64, Person)> for PersonTable {
    fn from_iter<T: IntoIterator<Item = (i64, Person)>>(iter: T) -> Self {
        let mut table = PersonTable::new();
        for (id, person) in iter {
            table.insert(id, person);
        }
        table
    }
}

impl<'a> IntoIterator for &'a PersonTable {
    type Item = (&'a i64, &'a Person);
    type IntoIter = btree_map::Iter<'a, i64, Person>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
