use jiff::{SignedDuration, Span, SpanRelativeTo};

fn parse_span(input: &str) -> Option<SignedDuration> {
    let span = input.parse::<Span>().ok()?;
    span.to_duration(SpanRelativeTo::days_are_24_hours()).ok()
}

/// Accepts `5s`/`30m`/`1d` style spans, ISO 8601 durations or plain seconds.
/// Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<SignedDuration, String> {
    let input = input.trim();

    let duration = input
        .parse::<SignedDuration>()
        .ok()
        .or_else(|| parse_span(input))
        .or_else(|| input.parse::<i64>().ok().map(SignedDuration::from_secs))
        .ok_or_else(|| format!("`{input}` is not a duration, try `5s`, `PT1M` or `30`"))?;

    if duration.is_negative() {
        return Err(format!("`{input}` is negative"));
    }

    Ok(duration)
}
