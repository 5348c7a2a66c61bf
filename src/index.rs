use crate::error::ChartError;

/// Position → column name mapping recovered from the header row.
///
/// Backed by a `BTreeMap` so that walking the index always visits positions in
/// ascending order; data-row tokens are resolved against it in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    positions: std::collections::BTreeMap<usize, String>,
}

impl PositionIndex {
    /// Builds the index from the header tokens.
    ///
    /// Tokens are accepted left to right until the first empty one (a trailing comma
    /// produces exactly one). Anything after that gap is ignored, even if non-empty.
    ///
    /// # Errors
    /// * `ChartError::DuplicateColumn` if a name appears twice among accepted tokens.
    pub fn from_header<'a, I>(tokens: I) -> Result<Self, ChartError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index = PositionIndex::default();
        let mut seen = std::collections::HashSet::new();

        for (position, name) in tokens.into_iter().enumerate() {
            if name.is_empty() {
                break; // csv file might have a trailing comma
            }
            if !seen.insert(name) {
                return Err(ChartError::DuplicateColumn(name.to_string()));
            }
            index.positions.insert(position, name.to_string());
        }

        Ok(index)
    }

    /// Iterates `(position, name)` pairs in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.positions.iter().map(|(p, name)| (*p, name.as_str()))
    }

    pub fn name_at(&self, position: usize) -> Option<&str> {
        self.positions.get(&position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_comma_does_not_create_empty_column() {
        let index = PositionIndex::from_header("timestamp,price_open,sma9,".split(',')).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.name_at(2), Some("sma9"));
        assert_eq!(index.name_at(3), None);
    }

    #[test]
    fn tokens_after_gap_are_not_resumed() {
        let index = PositionIndex::from_header("a,b,,c".split(',')).unwrap();
        let names: Vec<_> = index.iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn iteration_is_ascending_by_position() {
        let index = PositionIndex::from_header("z,y,x,w,v,u,t,s,r,q,p".split(',')).unwrap();
        let positions: Vec<_> = index.iter().map(|(p, _)| p).collect();
        assert_eq!(positions, (0..11).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let err = PositionIndex::from_header("timestamp,volume,volume".split(',')).unwrap_err();
        assert!(matches!(err, ChartError::DuplicateColumn(ref n) if n == "volume"));
    }

    #[test]
    fn empty_first_token_gives_empty_index() {
        let index = PositionIndex::from_header(",timestamp".split(',')).unwrap();
        assert!(index.is_empty());
    }
}
