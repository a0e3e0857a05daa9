use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use super::store::BookError;

/// A catalogued book as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier, generated on creation
    pub id: String,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    /// Total number of pages
    pub page_count: u32,
    /// Pages read so far, never above `page_count`
    pub read_page: u32,
    /// `read_page == page_count` as of the last write
    pub finished: bool,
    /// Whether the book is currently being read
    pub reading: bool,
    #[serde(with = "iso8601_millis")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "iso8601_millis")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    pub(crate) fn new(id: String, fields: BookFields, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: fields.name,
            year: fields.year,
            author: fields.author,
            summary: fields.summary,
            publisher: fields.publisher,
            page_count: fields.page_count,
            read_page: fields.read_page,
            finished: fields.read_page == fields.page_count,
            reading: fields.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every caller-owned field, leaving `id` and `inserted_at` alone.
    pub(crate) fn apply(&mut self, fields: BookFields, now: OffsetDateTime) {
        self.finished = fields.read_page == fields.page_count;
        self.name = fields.name;
        self.year = fields.year;
        self.author = fields.author;
        self.summary = fields.summary;
        self.publisher = fields.publisher;
        self.page_count = fields.page_count;
        self.read_page = fields.read_page;
        self.reading = fields.reading;
        self.updated_at = now;
    }

    pub fn to_summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Reduced view returned when listing books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

/// Request body for creating or replacing a book.
///
/// Only `name` is optional at this level so that a missing name surfaces as a
/// domain failure instead of a deserialization error. Falsy JSON values
/// (`null`, `false`, `0`, `""`) count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookPayload {
    #[serde(deserialize_with = "falsy_as_none")]
    pub name: Option<String>,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl BookPayload {
    /// Check the payload and hand back the fields ready to be written.
    pub fn validate(self) -> Result<BookFields, BookError> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or(BookError::MissingName)?;

        if self.read_page > self.page_count {
            return Err(BookError::ReadPageExceedsPageCount {
                read_page: self.read_page,
                page_count: self.page_count,
            });
        }

        Ok(BookFields {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

fn falsy_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::String(name)) if name.is_empty() => Ok(None),
        Some(Value::String(name)) => Ok(Some(name)),
        Some(other) => Err(de::Error::invalid_type(
            de::Unexpected::Other(&other.to_string()),
            &"a string",
        )),
    }
}

/// Validated field values; only obtainable through [`BookPayload::validate`].
#[derive(Debug, Clone)]
pub struct BookFields {
    name: String,
    year: i32,
    author: String,
    summary: String,
    publisher: String,
    page_count: u32,
    read_page: u32,
    reading: bool,
}

/// Serializes timestamps as `2024-01-01T00:00:00.000Z`.
mod iso8601_millis {
    use serde::Serializer;
    use time::{macros::format_description, OffsetDateTime, UtcOffset};

    pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = value
            .to_offset(UtcOffset::UTC)
            .format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
            ))
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn payload(name: Option<&str>, page_count: u32, read_page: u32) -> BookPayload {
        BookPayload {
            name: name.map(str::to_string),
            page_count,
            read_page,
            ..BookPayload::default()
        }
    }

    #[test]
    fn missing_fields_default_except_name() {
        let payload: BookPayload = serde_json::from_value(json!({"pageCount": 10})).unwrap();
        assert_eq!(payload.name, None);
        assert_eq!(payload.page_count, 10);
        assert_eq!(payload.read_page, 0);
        assert!(!payload.reading);
    }

    #[test]
    fn falsy_names_read_as_missing() {
        for name in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            let payload: BookPayload =
                serde_json::from_value(json!({"name": name, "pageCount": 1})).unwrap();
            assert_eq!(payload.name, None, "name {name} should be missing");
            assert!(matches!(payload.validate(), Err(BookError::MissingName)));
        }
    }

    #[test]
    fn truthy_non_string_name_is_not_a_payload() {
        let parsed = serde_json::from_value::<BookPayload>(json!({"name": true}));
        assert!(parsed.is_err());
    }

    #[test]
    fn negative_page_count_is_not_a_payload() {
        let parsed = serde_json::from_value::<BookPayload>(json!({"name": "A", "pageCount": -1}));
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_rejects_missing_and_empty_name() {
        assert!(matches!(
            payload(None, 10, 0).validate(),
            Err(BookError::MissingName)
        ));
        assert!(matches!(
            payload(Some(""), 10, 0).validate(),
            Err(BookError::MissingName)
        ));
    }

    #[test]
    fn name_is_checked_before_page_counts() {
        assert!(matches!(
            payload(None, 10, 20).validate(),
            Err(BookError::MissingName)
        ));
    }

    #[test]
    fn validate_rejects_read_page_past_page_count() {
        assert!(matches!(
            payload(Some("A"), 10, 11).validate(),
            Err(BookError::ReadPageExceedsPageCount {
                read_page: 11,
                page_count: 10
            })
        ));
    }

    #[test]
    fn serializes_camel_case_with_millisecond_timestamps() {
        let now = datetime!(2024-03-05 07:08:09.123456 UTC);
        let fields = payload(Some("Buku A"), 100, 40).validate().unwrap();
        let book = Book::new("abcdefghijklmnop".to_string(), fields, now);

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["pageCount"], 100);
        assert_eq!(value["readPage"], 40);
        assert_eq!(value["finished"], false);
        assert_eq!(value["insertedAt"], "2024-03-05T07:08:09.123Z");
        assert_eq!(value["updatedAt"], "2024-03-05T07:08:09.123Z");
    }

    #[test]
    fn summary_projects_three_fields() {
        let fields = payload(Some("Buku A"), 1, 1).validate().unwrap();
        let book = Book::new("id".to_string(), fields, datetime!(2024-01-01 0:00 UTC));

        let value = serde_json::to_value(book.to_summary()).unwrap();
        assert_eq!(value, json!({"id": "id", "name": "Buku A", "publisher": ""}));
    }
}
