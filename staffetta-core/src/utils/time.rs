use time::{error::Format, macros::format_description, OffsetDateTime};

/// Restituisce l'istante corrente in UTC nel formato del documento persistito
/// (es. "2025-11-02 12:34:56.123456").
pub fn now_timestamp() -> Result<String, Format> {
    format_timestamp(OffsetDateTime::now_utc())
}

/// "YYYY-MM-DD HH:MM:SS.ffffff", sempre sei cifre di microsecondi.
pub fn format_timestamp(t: OffsetDateTime) -> Result<String, Format> {
    t.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
    ))
}
