/// Whitespace-separated tokens following the read id on a FASTQ header line.
///
/// Nanopore basecallers write `key=value` tokens here (`runid=..`,
/// `ch=..`, `start_time=..`). Tokens are kept in order so they can be looked
/// up either by key or by their position on the line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMetadata {
    tokens: Vec<String>,
}

impl HeaderMetadata {
    /// Split a header line into the read id and its metadata.
    /// A leading `@` is stripped from the id if present.
    pub fn parse(header: &str) -> (String, Self) {
        let mut parts = header.split_whitespace();
        let id = parts
            .next()
            .map(|first| first.strip_prefix('@').unwrap_or(first))
            .unwrap_or("")
            .to_string();
        let tokens = parts.map(str::to_string).collect();
        (id, Self { tokens })
    }

    /// Value of the first `key=value` token with this key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Token at a position on the header line, where the read id is position 0.
    pub fn field_at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(String::as_str)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().filter_map(|t| t.split_once('='))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUPPY: &str = "@3d6f0c1e runid=ab12 sampleid=s1 read=17 ch=211 start_time=2019-03-01T10:00:05Z flow_cell_id=FAK1";

    #[test]
    fn test_parse_id_and_pairs() {
        let (id, meta) = HeaderMetadata::parse(GUPPY);
        assert_eq!(id, "3d6f0c1e");
        assert_eq!(meta.len(), 6);
        assert_eq!(meta.get("ch"), Some("211"));
        assert_eq!(meta.get("start_time"), Some("2019-03-01T10:00:05Z"));
        assert_eq!(meta.get("barcode"), None);
    }

    #[test]
    fn test_field_at_counts_id_as_zero() {
        let (_, meta) = HeaderMetadata::parse(GUPPY);
        assert_eq!(meta.field_at(0), None);
        assert_eq!(meta.field_at(1), Some("runid=ab12"));
        assert_eq!(meta.field_at(5), Some("start_time=2019-03-01T10:00:05Z"));
        assert_eq!(meta.field_at(9), None);
    }

    #[test]
    fn test_bare_header() {
        let (id, meta) = HeaderMetadata::parse("@read1");
        assert_eq!(id, "read1");
        assert!(meta.is_empty());

        let (id, _) = HeaderMetadata::parse("");
        assert_eq!(id, "");
    }

    #[test]
    fn test_tokens_without_equals_are_positional_only() {
        let (_, meta) = HeaderMetadata::parse("@r1 1:N:0:ACGT start_time=5");
        assert_eq!(meta.pairs().count(), 1);
        assert_eq!(meta.field_at(1), Some("1:N:0:ACGT"));
    }
}
