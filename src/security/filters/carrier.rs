//! Where the client puts its token: a request header or a URL query parameter.

use axum::http::{HeaderMap, HeaderName};

use super::RequestView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarrierLocation {
    Header(HeaderName),
    QueryParam(String),
}

impl CarrierLocation {
    /// Raw carrier value, undecoded for headers, percent-decoded for query params.
    ///
    /// For repeated parameters the first occurrence wins.
    pub fn extract(&self, request: &RequestView<'_>) -> Option<String> {
        match self {
            Self::Header(name) => header_value(request.headers, name),
            Self::QueryParam(name) => {
                let query = request.query?;
                url::form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.into_owned())
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Header(name) => format!("header:{name}"),
            Self::QueryParam(name) => format!("query:{name}"),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    fn view<'a>(headers: &'a HeaderMap, query: Option<&'a str>) -> RequestView<'a> {
        RequestView {
            path: "/any",
            query,
            headers,
        }
    }

    #[test]
    fn reads_configured_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));

        let carrier = CarrierLocation::Header(header::AUTHORIZATION);
        assert_eq!(
            carrier.extract(&view(&headers, None)).as_deref(),
            Some("Bearer abc")
        );
    }

    #[test]
    fn missing_header_is_none() {
        let headers = HeaderMap::new();
        let carrier = CarrierLocation::Header(HeaderName::from_static("x-auth-token"));
        assert_eq!(carrier.extract(&view(&headers, None)), None);
    }

    #[test]
    fn reads_and_decodes_query_param() {
        let headers = HeaderMap::new();
        let carrier = CarrierLocation::QueryParam("access_token".into());

        let value = carrier.extract(&view(&headers, Some("page=2&access_token=Bearer%20abc.def")));
        assert_eq!(value.as_deref(), Some("Bearer abc.def"));

        let value = carrier.extract(&view(&headers, Some("access_token=Bearer+abc")));
        assert_eq!(value.as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn query_carrier_ignores_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        let carrier = CarrierLocation::QueryParam("access_token".into());

        assert_eq!(carrier.extract(&view(&headers, None)), None);
        assert_eq!(carrier.extract(&view(&headers, Some("token=abc"))), None);
    }

    #[test]
    fn first_query_occurrence_wins() {
        let headers = HeaderMap::new();
        let carrier = CarrierLocation::QueryParam("access_token".into());
        let value = carrier.extract(&view(&headers, Some("access_token=one&access_token=two")));
        assert_eq!(value.as_deref(), Some("one"));
    }
}
