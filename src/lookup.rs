use crate::person::PersonTable;

pub const NOT_FOUND: &str = "No user found with that id";

/// Renders the answer line for `id`. Never mutates the table.
pub fn describe(id: i64, table: &PersonTable) -> String {
    match table.get(id) {
        Some(person) => format!("Person #{id} is {person}"),
        None => NOT_FOUND.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::person::Person;

    fn table() -> PersonTable {
        [(
            1,
            Person::new("Charles Paxton", NaiveDate::from_ymd_opt(1963, 1, 5).unwrap()),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn describe_formats_known_person() {
        assert_eq!(
            describe(1, &table()),
            "Person #1 is Charles Paxton with a birthday of 1963 01 05"
        );
    }

    #[test]
    fn describe_reports_unknown_id_and_is_repeatable() {
        let table = table();
        assert_eq!(describe(2, &table), NOT_FOUND);
        assert_eq!(describe(2, &table), describe(2, &table));
        assert_eq!(table.len(), 1);
    }
}
