use url::form_urlencoded;

/// Ordered `(name, value)` pairs, the way a browser serializes a form.
///
/// Names may repeat; order is preserved because the serialized query string
/// is the identity of a partial refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Overwrites every field named `name`. Returns `false` (and changes
    /// nothing) if there is none.
    pub fn set_existing(&mut self, name: &str, value: &str) -> bool {
        let mut found = false;
        for (k, v) in &mut self.pairs {
            if k == name {
                v.clear();
                v.push_str(value);
                found = true;
            }
        }
        found
    }

    /// Overwrites every field named `name`, appending one if there is none.
    pub fn set(&mut self, name: &str, value: &str) {
        if !self.set_existing(name, value) {
            self.push(name, value);
        }
    }

    pub fn extend(&mut self, other: &FormFields) {
        self.pairs.extend(other.pairs.iter().cloned());
    }

    /// Browser-compatible query string: spaces become `+`.
    pub fn serialize(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}
