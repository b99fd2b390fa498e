//! Lookup by display name: sheet titles, header cells, row keys.

use crate::error::LookupError;

/// A sequence of entries addressable by name.
pub trait NameIndexed {
    /// What the names identify, for error messages ("sheet", "column", ...).
    const KIND: &'static str;

    /// Every entry as `(index, name)`.
    fn names(&self) -> impl Iterator<Item = (usize, &str)>;

    /// Index of the one entry named `name`.
    fn find_unique(&self, name: &str) -> Result<usize, LookupError> {
        let mut matches = self.names().filter(|(_, n)| *n == name).map(|(idx, _)| idx);
        let Some(first) = matches.next() else {
            return Err(LookupError::NotFound { kind: Self::KIND, name: name.to_string() });
        };
        let extra = matches.count();
        if extra > 0 {
            return Err(LookupError::Duplicate {
                kind: Self::KIND,
                name: name.to_string(),
                count: extra + 1,
            });
        }
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names(Vec<String>);

    impl NameIndexed for Names {
        const KIND: &'static str = "entry";

        fn names(&self) -> impl Iterator<Item = (usize, &str)> {
            self.0.iter().enumerate().map(|(idx, n)| (idx, n.as_str()))
        }
    }

    #[test]
    fn test_find_unique() {
        let names = Names(["id", "name", "qty", "name"].map(String::from).to_vec());
        assert_eq!(names.find_unique("qty"), Ok(2));
        assert_eq!(
            names.find_unique("price"),
            Err(LookupError::NotFound { kind: "entry", name: "price".into() })
        );
        assert_eq!(
            names.find_unique("name"),
            Err(LookupError::Duplicate { kind: "entry", name: "name".into(), count: 2 })
        );
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let names = Names(vec!["Enable".to_string()]);
        assert!(names.find_unique("enable").is_err());
    }
}
