use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything but the RFC 3986 unreserved characters.
const VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Builds query strings in the bracketed `key[a][b]=value` notation understood by
/// the content API. Keys are written verbatim; only values are percent-encoded.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    out: String,
}

impl QueryBuilder {
    pub fn new() -> Self { Self::default() }

    /// Request related records inline, one `populate[i]` entry per relation path.
    pub fn populate(mut self, relations: &[&str]) -> Self {
        for (i, relation) in relations.iter().enumerate() {
            self.push(&format!("populate[{i}]"), relation);
        }
        self
    }

    pub fn filter(mut self, path: &[&str], value: &str) -> Self {
        let mut key = String::from("filters");
        for segment in path {
            key.push('[');
            key.push_str(segment);
            key.push(']');
        }
        self.push(&key, value);
        self
    }

    pub fn build(self) -> String { self.out }

    fn push(&mut self, key: &str, value: &str) {
        if !self.out.is_empty() {
            self.out.push('&');
        }
        self.out.push_str(key);
        self.out.push('=');
        self.out.extend(utf8_percent_encode(value, VALUE));
    }
}

pub fn post_query(slug: &str) -> String {
    QueryBuilder::new()
        .populate(&["post_tags", "post_category", "authors.avatar"])
        .filter(&["slug", "$eq"], slug)
        .build()
}

pub fn question_query(slug: &str) -> String {
    QueryBuilder::new().populate(&["profile.avatar"]).filter(&["slugs", "slug"], slug).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_query() {
        assert_eq!(
            post_query("my-first-post"),
            "populate[0]=post_tags&populate[1]=post_category&populate[2]=authors.avatar\
             &filters[slug][$eq]=my-first-post"
        );
    }

    #[test]
    fn test_question_query() {
        assert_eq!(
            question_query("my-first-post"),
            "populate[0]=profile.avatar&filters[slugs][slug]=my-first-post"
        );
    }

    #[test]
    fn test_values_are_encoded() {
        assert_eq!(question_query(""), "populate[0]=profile.avatar&filters[slugs][slug]=");
        assert_eq!(
            QueryBuilder::new().filter(&["slug", "$eq"], "a&b=c/d").build(),
            "filters[slug][$eq]=a%26b%3Dc%2Fd"
        );
    }

    #[test]
    fn test_rfc3986_encoding() {
        assert_eq!(
            QueryBuilder::new().filter(&["slug", "$eq"], "hello world~ü+").build(),
            "filters[slug][$eq]=hello%20world~%C3%BC%2B"
        );
    }
}
