//! Rendering of store results into redirects and HTML fragments.

use crate::models::LocationRecord;
use crate::services::query::ProximityQuery;
use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use mongodb::bson::{Bson, Document};
use std::fmt::Write;

pub const NOTHING_FOUND: &str = "Nothing found";

const HOME_LINK: &str = r#"<p>&nbsp;|&nbsp;<a href="/">Home</a>&nbsp;|&nbsp;</p>"#;

/// Canonical proximity path for a coordinate.
pub fn proximity_path(latitude: f64, longitude: f64) -> String {
    format!(
        "/near/lat/{}/lon/{}",
        format_number(latitude),
        format_number(longitude)
    )
}

/// Redirect to the first record's coordinates, or home when nothing matched.
pub fn render_zip_result(records: &[LocationRecord]) -> Response {
    let location = match records.first() {
        Some(record) => proximity_path(record.latitude(), record.longitude()),
        None => "/".to_string(),
    };
    found(location)
}

/// HTML listing for a proximity lookup. `None` means the store produced no
/// result at all and renders as a bare `Nothing found`.
pub fn render_proximity_result(
    query: &ProximityQuery,
    records: Option<&[LocationRecord]>,
) -> Response {
    match records {
        Some(records) => Html(proximity_page(query, records)).into_response(),
        None => Html(NOTHING_FOUND).into_response(),
    }
}

pub fn proximity_page(query: &ProximityQuery, records: &[LocationRecord]) -> String {
    let mut page = String::new();
    page.push_str("<p>Query ");
    page.push_str(&filter_json(&query.filter()));
    page.push_str("</p>");
    page.push_str(HOME_LINK);
    page.push_str("<ol>");
    for record in records {
        // Writing into a String cannot fail.
        let _ = write!(
            page,
            "<li>{}, {}, {} ({}, {} )</li>",
            record.city,
            record.state,
            record.zip,
            format_number(record.latitude()),
            format_number(record.longitude()),
        );
    }
    page.push_str("</ol>");
    page
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Shortest round-trip text for a number. Integral values carry no
/// fractional part and `-0` prints as `0`. Magnitudes below `1e-6` or from
/// `1e21` upwards switch to exponent form (`1e-7`, `1.5e+21`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e-7`.
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Position of the decimal point relative to the start of `digits`.
    let n = exponent + 1;

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.push_str(&"0".repeat((n - k) as usize));
    } else if 0 < n && n <= 21 {
        out.push_str(&digits[..n as usize]);
        out.push('.');
        out.push_str(&digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat((-n) as usize));
        out.push_str(&digits);
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if n - 1 >= 0 { '+' } else { '-' });
        out.push_str(&(n - 1).abs().to_string());
    }
    out
}

/// Compact JSON text of a filter. Non-finite doubles become `null`.
pub fn filter_json(filter: &Document) -> String {
    let mut out = String::new();
    write_document(&mut out, filter);
    out
}

fn write_document(out: &mut String, document: &Document) {
    out.push('{');
    for (i, (key, value)) in document.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&serde_json::Value::from(key.as_str()).to_string());
        out.push(':');
        write_bson(out, value);
    }
    out.push('}');
}

fn write_bson(out: &mut String, value: &Bson) {
    match value {
        Bson::Double(v) if v.is_finite() => out.push_str(&format_number(*v)),
        Bson::Double(_) | Bson::Null => out.push_str("null"),
        Bson::Int32(v) => out.push_str(&v.to_string()),
        Bson::Int64(v) => out.push_str(&v.to_string()),
        Bson::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
        Bson::String(s) => out.push_str(&serde_json::Value::from(s.as_str()).to_string()),
        Bson::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_bson(out, item);
            }
            out.push(']');
        }
        Bson::Document(document) => write_document(out, document),
        other => out.push_str(&other.clone().into_relaxed_extjson().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::query::zip_filter;

    fn fuquay() -> LocationRecord {
        LocationRecord::new("27526", "FUQUAY VARINA", "NC", 35.579952, 78.780807)
    }

    fn location_header(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap()
    }

    #[test]
    fn zip_result_redirects_to_first_record() {
        let second = LocationRecord::new("27526", "ELSEWHERE", "NC", 1.0, 2.0);
        let response = render_zip_result(&[fuquay(), second]);

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location_header(&response),
            "/near/lat/35.579952/lon/78.780807"
        );
    }

    #[test]
    fn empty_zip_result_redirects_home() {
        let response = render_zip_result(&[]);
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location_header(&response), "/");
    }

    #[test]
    fn numbers_render_without_trailing_zero_fraction() {
        assert_eq!(format_number(78.0), "78");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-71.0123), "-71.0123");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(proximity_path(35.0, -78.5), "/near/lat/35/lon/-78.5");
    }

    #[test]
    fn numbers_switch_to_exponent_form_outside_plain_range() {
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-10), "1.5e-10");
        assert_eq!(format_number(-2.5e-8), "-2.5e-8");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e22), "1.5e+22");
        assert_eq!(format_number(123456789012345680000.0), "123456789012345680000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(0.0001234), "0.0001234");
        assert_eq!(format_number(35.579952), "35.579952");
        assert_eq!(format_number(1200.0), "1200");
    }

    #[test]
    fn tiny_and_huge_coordinates_use_exponent_form() {
        let query = ProximityQuery::from_path("0.0000001", "1e21");
        assert_eq!(
            filter_json(&query.filter()),
            r#"{"loc":{"$near":[1e-7,1e+21]}}"#
        );
        assert_eq!(
            proximity_path(0.0000001, 1e21),
            "/near/lat/1e-7/lon/1e+21"
        );
    }

    #[test]
    fn filter_json_is_compact() {
        let query = ProximityQuery::new(35.579952, 78.780807);
        assert_eq!(
            filter_json(&query.filter()),
            r#"{"loc":{"$near":[35.579952,78.780807]}}"#
        );
        assert_eq!(filter_json(&zip_filter("2\"7")), r#"{"zip":"2\"7"}"#);
    }

    #[test]
    fn filter_json_writes_nan_as_null() {
        let query = ProximityQuery::new(f64::NAN, 12.0);
        assert_eq!(filter_json(&query.filter()), r#"{"loc":{"$near":[null,12]}}"#);
    }

    #[test]
    fn proximity_page_lists_records_in_order() {
        let query = ProximityQuery::new(35.579952, 78.780807);
        let other = LocationRecord::new("27540", "HOLLY SPRINGS", "NC", 35.6, 78.8);
        let page = proximity_page(&query, &[fuquay(), other]);

        assert_eq!(
            page,
            concat!(
                r#"<p>Query {"loc":{"$near":[35.579952,78.780807]}}</p>"#,
                r#"<p>&nbsp;|&nbsp;<a href="/">Home</a>&nbsp;|&nbsp;</p>"#,
                "<ol>",
                "<li>FUQUAY VARINA, NC, 27526 (35.579952, 78.780807 )</li>",
                "<li>HOLLY SPRINGS, NC, 27540 (35.6, 78.8 )</li>",
                "</ol>"
            )
        );
    }

    #[test]
    fn empty_proximity_page_has_empty_list() {
        let query = ProximityQuery::new(0.0, 0.0);
        let page = proximity_page(&query, &[]);
        assert!(page.ends_with("<ol></ol>"));
        assert!(!page.contains(NOTHING_FOUND));
    }

    #[tokio::test]
    async fn missing_result_renders_nothing_found() {
        let query = ProximityQuery::new(0.0, 0.0);
        let response = render_proximity_result(&query, None);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .starts_with("text/html"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], NOTHING_FOUND.as_bytes());
    }
}
