use crate::types::{
    FormValue, TrainingRequest, FIELD_EPOCHS, FIELD_FORCE_DOWNLOAD, FIELD_LOOKBACK_DAYS,
    FIELD_MODEL, FIELD_THRESHOLD, MODEL_ID,
};

/// Builds the training payload from submitted form entries.
///
/// Entries arrive in submission order; a checkbox only appears when it is
/// checked, so `force_download` is `true` whenever it is present at all and
/// `false` otherwise. Later duplicates overwrite earlier ones.
pub fn serialize_form<K, V>(entries: &[(K, V)]) -> TrainingRequest
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut request = TrainingRequest::new();
    for (name, value) in entries {
        let name = name.as_ref();
        let value = value.as_ref();
        let coerced = match name {
            FIELD_FORCE_DOWNLOAD => FormValue::Flag(true),
            FIELD_LOOKBACK_DAYS | FIELD_EPOCHS => FormValue::Integer(parse_int_prefix(value)),
            FIELD_THRESHOLD => FormValue::Float(parse_float_prefix(value)),
            _ => FormValue::Text(value.to_string()),
        };
        request.insert(name, coerced);
    }

    if !request.contains(FIELD_FORCE_DOWNLOAD) {
        request.insert(FIELD_FORCE_DOWNLOAD, FormValue::Flag(false));
    }
    request.insert(FIELD_MODEL, FormValue::Text(MODEL_ID.to_string()));
    request
}

/// Leading base-10 integer of `input`, ignoring trailing garbage
/// (`"12 days"` is 12, `"3.9"` is 3). `None` when there are no leading digits.
///
/// Digit runs that overflow `i64` are also `None` and reach the backend as
/// `null`, which it rejects. A browser would send a huge float instead; no
/// lookback or epoch count that large is meaningful, so the difference is
/// accepted.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = split_sign(s);
    let digits: &str = &rest[..rest.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Longest decimal-literal prefix of `input` as an `f64`, NaN when there is
/// none. Accepts `Infinity` with an optional sign.
pub fn parse_float_prefix(input: &str) -> f64 {
    let s = input.trim_start();
    let (negative, rest) = split_sign(s);
    let sign = if negative { -1.0 } else { 1.0 };

    if rest.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let bytes = rest.as_bytes();
    let mut end = 0;
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    rest[..end]
        .parse::<f64>()
        .map(|v| sign * v)
        .unwrap_or(f64::NAN)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
