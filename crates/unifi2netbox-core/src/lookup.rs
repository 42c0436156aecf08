// ── Tri-state lookup results ──
//
// NetBox filters can return zero, one, or several objects where exactly
// one is expected. `Lookup` makes the three outcomes explicit so every
// fetch-or-create step branches on data instead of on errors.

/// Outcome of a get-by-filter query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    NotFound,
    Unique(T),
    /// More than one match; ordered as the inventory returned them.
    Ambiguous(Vec<T>),
}

impl<T> Lookup<T> {
    pub fn from_vec(mut items: Vec<T>) -> Self {
        match items.len() {
            0 => Self::NotFound,
            1 => items.pop().map_or(Self::NotFound, Self::Unique),
            _ => Self::Ambiguous(items),
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound)
    }

    /// The single match, or the first of several.
    pub fn into_first(self) -> Option<T> {
        match self {
            Self::NotFound => None,
            Self::Unique(item) => Some(item),
            Self::Ambiguous(items) => items.into_iter().next(),
        }
    }
}

impl<T> From<Vec<T>> for Lookup<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}
