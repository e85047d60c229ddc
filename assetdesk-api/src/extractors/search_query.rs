//! Raw query string extractor for search requests.
//!
//! Search parameters are positional (`filter1`, `search1`, ...) and repeated
//! keys keep submission order, so the query string is decoded into
//! [`RequestParams`] instead of a typed `Query<T>`. The raw string is kept
//! for redirects back to the search form.

use assetdesk_core::RequestParams;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::borrow::Cow;
use std::convert::Infallible;

/// Decoded search parameters plus the query string they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw: String,
    pub params: RequestParams,
}

impl SearchQuery {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            params: parse_query_string(&raw),
            raw,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_raw(parts.uri.query().unwrap_or_default()))
    }
}

/// Decode an `application/x-www-form-urlencoded` query string.
///
/// A pair without `=` is a key with an empty value. Invalid UTF-8 after
/// percent-decoding is replaced rather than rejected.
pub fn parse_query_string(raw: &str) -> RequestParams {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Encode pairs as a query string.
pub fn to_query_string<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key.as_ref()),
                urlencoding::encode(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_component(raw: &str) -> String {
    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes()))
            .into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_string_decodes_and_keeps_order() {
        let params = parse_query_string("filter1=Software.Name&search1=Office+2019&search1=x&distinct");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(
            pairs,
            [
                ("filter1", "Software.Name"),
                ("search1", "Office 2019"),
                ("search1", "x"),
                ("distinct", ""),
            ]
        );
        assert_eq!(params.get("search1"), Some("Office 2019"));
    }

    #[test]
    fn test_parse_query_string_percent_decoding() {
        let params = parse_query_string("search=%2A%C3%BCro%3F&filter=UserDefinedInfo.B%C3%BCro");
        assert_eq!(params.get("search"), Some("*üro?"));
        assert_eq!(params.get("filter"), Some("UserDefinedInfo.Büro"));
    }

    #[test]
    fn test_parse_query_string_tolerates_garbage() {
        let params = parse_query_string("&&a=%FF&=b&c=%");
        assert_eq!(params.get("a"), Some("\u{FFFD}"));
        assert_eq!(params.get(""), Some("b"));
        assert!(params.contains("c"));
        assert!(parse_query_string("").is_empty());
    }

    #[test]
    fn test_to_query_string_round_trips() {
        let raw = to_query_string([("filter", "Name"), ("search", "a&b c")]);
        assert_eq!(raw, "filter=Name&search=a%26b%20c");
        assert_eq!(parse_query_string(&raw).get("search"), Some("a&b c"));
    }
}
