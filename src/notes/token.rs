use crate::models::{GpsPoint, WaypointRole};

pub const META_OPEN: &str = "[TRIPMETA:";
pub const META_CLOSE: char = ']';

/// What a single notes line is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineToken<'a> {
    /// `[TRIPMETA:...]`, carrying the text between the brackets.
    Meta(&'a str),
    /// `[Start] lat, lng` or `[End] lat, lng`.
    WaypointLabel { role: WaypointRole, point: GpsPoint },
    /// A map link: `<base>lat,lng` as written, or a URL whose `q=` holds the pair.
    WaypointLink(GpsPoint),
    FreeText(&'a str),
}

/// Splits on `\n`, leaving any `\r` on the line for `classify` to ignore.
pub fn lines(notes: &str) -> impl Iterator<Item = &str> {
    notes.split('\n')
}

pub fn classify(line: &str) -> LineToken<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if let Some(body) = meta_body(line) {
        return LineToken::Meta(body);
    }
    if let Some((role, point)) = waypoint_label(line) {
        return LineToken::WaypointLabel { role, point };
    }
    if let Some(point) = waypoint_link(line) {
        return LineToken::WaypointLink(point);
    }
    LineToken::FreeText(line)
}

fn meta_body(line: &str) -> Option<&str> {
    line.strip_prefix(META_OPEN)?.strip_suffix(META_CLOSE)
}

fn waypoint_label(line: &str) -> Option<(WaypointRole, GpsPoint)> {
    let line = line.trim();
    [WaypointRole::Start, WaypointRole::End]
        .into_iter()
        .find_map(|role| {
            let rest = line.strip_prefix(role.label())?;
            parse_pair(rest).map(|point| (role, point))
        })
}

fn waypoint_link(line: &str) -> Option<GpsPoint> {
    let line = line.trim();
    let (scheme, _) = line.split_once(':')?;
    if scheme.is_empty()
        || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        || line.chars().any(char::is_whitespace)
    {
        return None;
    }
    trailing_pair(line).or_else(|| query_pair(line))
}

/// `lat,lng` at the very end of the link, whatever base precedes it.
fn trailing_pair(link: &str) -> Option<GpsPoint> {
    let tail_start = link
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
        .last()
        .map(|(i, _)| i)?;
    let mut parts = link[tail_start..].rsplit(',');
    let lng = parts.next()?;
    let lat = parts.next()?;
    parse_pair(&format!("{},{}", lat, lng))
}

/// Hand-edited links: the pair sits in a `q=` parameter, possibly URL-encoded.
fn query_pair(link: &str) -> Option<GpsPoint> {
    let (_, query) = link.split_once('?')?;
    let value = query
        .split(['&', '#'])
        .find_map(|param| param.strip_prefix("q="))?;
    parse_pair(&value.replace("%2C", ",").replace("%2c", ","))
}

fn parse_pair(text: &str) -> Option<GpsPoint> {
    let (lat, lng) = text.split_once(',')?;
    let point = GpsPoint::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?);
    point.is_valid().then_some(point)
}
