use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Stored timestamps are naive UTC; render them as RFC 3339 with a `Z` suffix.
pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

pub(crate) fn format_optional(value: Option<PrimitiveDateTime>) -> Option<String> {
    value.map(format_primitive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(datetime!(2025-01-02 10:20:30)), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn format_optional_passes_none_through() {
        assert_eq!(format_optional(None), None);
        assert_eq!(
            format_optional(Some(datetime!(2024-12-31 23:59:59))).as_deref(),
            Some("2024-12-31T23:59:59Z")
        );
    }

    #[test]
    fn now_is_close_to_offset_now() {
        let now = primitive_now_utc().assume_utc();
        let delta = OffsetDateTime::now_utc() - now;
        assert!(delta.whole_seconds().abs() < 5);
    }
}
