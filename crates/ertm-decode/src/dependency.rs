//! File-name dependency lists.

use crate::header::extension;

/// Ordered list of file names one asset references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList {
    pub names: Vec<String>,
}

impl DependencyList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Entries whose extension matches `ext` (case-insensitive, no dot).
    pub fn with_extension<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |name| extension(name).is_some_and(|e| e.eq_ignore_ascii_case(ext)))
    }
}

impl From<Vec<String>> for DependencyList {
    fn from(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl<'a> FromIterator<&'a str> for DependencyList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(str::to_owned).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_extension() {
        let list: DependencyList = ["a.d3dmesh", "b.prop", "c.D3DMESH", "noext"]
            .into_iter()
            .collect();
        let meshes: Vec<_> = list.with_extension("d3dmesh").collect();
        assert_eq!(meshes, vec!["a.d3dmesh", "c.D3DMESH"]);
    }

    #[test]
    fn keeps_order() {
        let mut list = DependencyList::new();
        list.push("z.prop");
        list.push(String::from("a.prop"));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["z.prop", "a.prop"]);
        assert_eq!(list.len(), 2);
    }
}
