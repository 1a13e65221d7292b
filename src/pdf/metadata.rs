//! Document metadata fields and sparse merging

use log::debug;

use super::DocumentBackend;
use crate::error::Result;

/// The metadata fields that can be overridden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    Title,
    Author,
    Subject,
    Keywords,
    Creator,
    Producer,
}

impl MetadataKey {
    pub const ALL: [MetadataKey; 6] = [
        MetadataKey::Title,
        MetadataKey::Author,
        MetadataKey::Subject,
        MetadataKey::Keywords,
        MetadataKey::Creator,
        MetadataKey::Producer,
    ];

    /// Key name in the PDF Info dictionary
    pub fn info_key(&self) -> &'static [u8] {
        match self {
            MetadataKey::Title => b"Title",
            MetadataKey::Author => b"Author",
            MetadataKey::Subject => b"Subject",
            MetadataKey::Keywords => b"Keywords",
            MetadataKey::Creator => b"Creator",
            MetadataKey::Producer => b"Producer",
        }
    }
}

/// Optional value per metadata field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

impl MetadataRecord {
    pub fn get(&self, key: MetadataKey) -> Option<&str> {
        match key {
            MetadataKey::Title => self.title.as_deref(),
            MetadataKey::Author => self.author.as_deref(),
            MetadataKey::Subject => self.subject.as_deref(),
            MetadataKey::Keywords => self.keywords.as_deref(),
            MetadataKey::Creator => self.creator.as_deref(),
            MetadataKey::Producer => self.producer.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        MetadataKey::ALL.iter().all(|k| self.get(*k).is_none())
    }
}

/// Write every present override into the document, leaving the rest alone
///
/// An empty string is a real value and blanks the field.
pub fn merge_metadata<D: DocumentBackend + ?Sized>(doc: &mut D, overrides: &MetadataRecord) -> Result<()> {
    if overrides.is_empty() {
        debug!("No metadata overrides");
        return Ok(());
    }

    for key in MetadataKey::ALL {
        if let Some(value) = overrides.get(key) {
            debug!("Setting metadata {:?} = {:?}", key, value);
            doc.set_metadata(key, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageSize, Rect};
    use std::collections::HashMap;
    use std::path::Path;

    #[derive(Default)]
    struct MetadataOnly {
        fields: HashMap<MetadataKey, String>,
        writes: usize,
    }

    impl DocumentBackend for MetadataOnly {
        fn page_sizes(&self) -> Vec<PageSize> {
            Vec::new()
        }

        fn insert_image(&mut self, _: usize, _: Rect, _: &[u8]) -> Result<()> {
            unreachable!("metadata merge never inserts images")
        }

        fn metadata(&self, key: MetadataKey) -> Option<String> {
            self.fields.get(&key).cloned()
        }

        fn set_metadata(&mut self, key: MetadataKey, value: &str) -> Result<()> {
            self.writes += 1;
            self.fields.insert(key, value.to_string());
            Ok(())
        }

        fn save(&mut self, _: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn populated() -> MetadataOnly {
        let mut doc = MetadataOnly::default();
        for key in MetadataKey::ALL {
            doc.fields.insert(key, format!("old {:?}", key));
        }
        doc
    }

    #[test]
    fn test_merge_title_only() {
        let mut doc = populated();
        let overrides = MetadataRecord {
            title: Some("Quarterly Report".to_string()),
            ..Default::default()
        };

        merge_metadata(&mut doc, &overrides).unwrap();

        assert_eq!(doc.metadata(MetadataKey::Title).as_deref(), Some("Quarterly Report"));
        for key in &MetadataKey::ALL[1..] {
            assert_eq!(doc.metadata(*key), Some(format!("old {:?}", key)));
        }
        assert_eq!(doc.writes, 1);
    }

    #[test]
    fn test_merge_empty_string_blanks_field() {
        let mut doc = populated();
        let overrides = MetadataRecord {
            author: Some(String::new()),
            ..Default::default()
        };

        merge_metadata(&mut doc, &overrides).unwrap();
        assert_eq!(doc.metadata(MetadataKey::Author).as_deref(), Some(""));
    }

    #[test]
    fn test_merge_nothing() {
        let mut doc = populated();
        merge_metadata(&mut doc, &MetadataRecord::default()).unwrap();
        assert_eq!(doc.writes, 0);
        assert!(MetadataRecord::default().is_empty());
    }
}
