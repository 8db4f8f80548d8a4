//! Bracket suffix parsing for a single tier of a key path.

/// A tier split into its bare name and bracket suffixes: `servers[1][0]`,
/// `tags[]`, `matrix[2][]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub name: &'a str,
    pub indices: Vec<i64>,
    pub length: bool,
}

impl<'a> Segment<'a> {
    /// Parse the suffixes of `segment`. Returns `None` when there is no
    /// well-formed suffix; the caller then treats the segment as a literal key.
    ///
    /// An empty pair `[]` requests the length and must come last.
    pub fn parse(segment: &'a str) -> Option<Self> {
        let open = segment.find('[')?;
        let name = &segment[..open];
        let mut rest = &segment[open..];
        let mut indices = Vec::new();
        let mut length = false;

        while !rest.is_empty() {
            if length || !rest.starts_with('[') {
                return None;
            }
            let close = rest.find(']')?;
            let inner = &rest[1..close];
            if inner.is_empty() {
                length = true;
            } else {
                indices.push(inner.parse::<i64>().ok()?);
            }
            rest = &rest[close + 1..];
        }

        Some(Segment {
            name,
            indices,
            length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_suffix() {
        assert_eq!(Segment::parse("plain"), None);
    }

    #[test]
    fn test_index_and_length() {
        assert_eq!(
            Segment::parse("slice[1]"),
            Some(Segment {
                name: "slice",
                indices: vec![1],
                length: false
            })
        );
        assert_eq!(
            Segment::parse("slice[]"),
            Some(Segment {
                name: "slice",
                indices: vec![],
                length: true
            })
        );
        assert_eq!(
            Segment::parse("m[0][12][]"),
            Some(Segment {
                name: "m",
                indices: vec![0, 12],
                length: true
            })
        );
        assert_eq!(
            Segment::parse("neg[-1]").map(|s| s.indices),
            Some(vec![-1])
        );
    }

    #[test]
    fn test_malformed() {
        assert_eq!(Segment::parse("a[x]"), None);
        assert_eq!(Segment::parse("a[0"), None);
        assert_eq!(Segment::parse("a[0]b"), None);
        assert_eq!(Segment::parse("a[][0]"), None);
    }
}
