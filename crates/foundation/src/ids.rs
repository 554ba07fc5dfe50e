use std::fmt;

/// Company identifier (French SIRET number) as rendered in the result markup.
///
/// Kept as an opaque string: the page is the source of truth and the value is
/// only ever compared, never validated.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Siret(String);

impl Siret {
    pub fn new(s: impl Into<String>) -> Self {
        Siret(s.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Siret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
