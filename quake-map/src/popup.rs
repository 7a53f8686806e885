//! Popup content for earthquake markers.

use chrono::{TimeZone, Utc};

use crate::feed::Earthquake;

/// Formats an epoch-millisecond timestamp the way web maps show event times.
///
/// Epoch 0 formats as `Thu, 01 Jan 1970 00:00:00 GMT`. Timestamps outside the
/// representable range produce an empty string.
pub fn format_time(time_ms: i64) -> String {
    match Utc.timestamp_millis_opt(time_ms).single() {
        Some(time) => time.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        None => String::new(),
    }
}

/// Builds the HTML snippet describing an earthquake.
///
/// The markup shows the bold magnitude, a link to the event detail page labeled with
/// the place name and opening in a new context, and the event time in UTC. Place
/// names and URLs are escaped, so markup in feed data cannot leak into the output.
pub fn popup_html(quake: &Earthquake) -> String {
    format!(
        "<strong>Magnitude: {}</strong><br><a href=\"{}\" target=\"_blank\">{}</a><br>{}",
        quake.magnitude(),
        escape_html(quake.detail_url()),
        escape_html(quake.place()),
        format_time(quake.time_ms()),
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercalli::latlon;

    #[test]
    fn epoch_zero_formats_as_gmt() {
        assert_eq!(format_time(0), "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn times_are_utc() {
        // 2021-07-04 23:59:01 UTC
        assert_eq!(format_time(1625443141000), "Sun, 04 Jul 2021 23:59:01 GMT");
    }

    #[test]
    fn popup_contains_all_fields() {
        let quake = Earthquake::new(2.5, "10km N of Testville", 0, "http://x", latlon!(0.0, 0.0));

        let html = popup_html(&quake);
        assert_eq!(
            html,
            "<strong>Magnitude: 2.5</strong><br>\
             <a href=\"http://x\" target=\"_blank\">10km N of Testville</a><br>\
             Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }

    #[test]
    fn place_names_are_escaped() {
        let quake = Earthquake::new(
            1.0,
            "<script>alert('hi')</script> & Sons",
            0,
            "http://x\"onmouseover=\"y",
            latlon!(0.0, 0.0),
        );

        let html = popup_html(&quake);
        assert!(html.contains("&lt;script&gt;alert(&#39;hi&#39;)&lt;/script&gt; &amp; Sons"));
        assert!(html.contains("href=\"http://x&quot;onmouseover=&quot;y\""));
        assert!(!html.contains("<script>"));
    }
}
