//! Canonical number formatting: plain decimal only, no exponent, no
//! trailing fraction zeros, signed zero collapsed to `0`.

use serde_json::Number;

/// `-0.0` becomes `+0.0`; every other value passes through.
#[inline]
pub fn normalize_signed_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

pub fn format_number(number: &Number) -> String {
    let mut out = String::with_capacity(24);
    append_number(&mut out, number);
    out
}

pub fn append_number(out: &mut String, number: &Number) {
    if let Some(value) = number.as_i64() {
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(value));
        return;
    }
    if let Some(value) = number.as_u64() {
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(value));
        return;
    }
    match number.as_f64() {
        Some(value) => append_f64(out, value),
        None => out.push_str("null"),
    }
}

pub fn append_f64(out: &mut String, value: f64) {
    if !value.is_finite() {
        out.push_str("null");
        return;
    }
    let value = normalize_signed_zero(value);
    if value == 0.0 {
        out.push('0');
        return;
    }
    let mut buffer = ryu::Buffer::new();
    let raw = buffer.format_finite(value);
    let start = out.len();
    if raw.contains('e') || raw.contains('E') {
        expand_exponent_into(out, raw);
    } else {
        out.push_str(raw);
    }
    trim_fraction_in_place(out, start);
}

/// Re-render ryu's exponent form as plain decimal by shifting the point.
fn expand_exponent_into(out: &mut String, raw: &str) {
    let bytes = raw.as_bytes();
    let mut i = 0;
    let negative = bytes.first() == Some(&b'-');
    if negative {
        i += 1;
    }

    let mut digits: Vec<u8> = Vec::with_capacity(24);
    let mut dot_pos = None;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => digits.push(bytes[i]),
            b'.' => dot_pos = Some(digits.len()),
            b'e' | b'E' => {
                i += 1;
                break;
            }
            _ => {}
        }
        i += 1;
    }

    let mut exp_sign = 1i32;
    if i < bytes.len() {
        if bytes[i] == b'-' {
            exp_sign = -1;
            i += 1;
        } else if bytes[i] == b'+' {
            i += 1;
        }
    }
    let mut exp = 0i32;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            exp = exp.saturating_mul(10).saturating_add((bytes[i] - b'0') as i32);
        }
        i += 1;
    }
    exp *= exp_sign;

    let dot_pos = dot_pos.unwrap_or(digits.len());
    let point = dot_pos as i32 + exp;
    if negative {
        out.push('-');
    }

    if point <= 0 {
        out.push_str("0.");
        for _ in 0..(-point) {
            out.push('0');
        }
        for digit in &digits {
            out.push(*digit as char);
        }
        return;
    }

    let point = point as usize;
    if point >= digits.len() {
        for digit in &digits {
            out.push(*digit as char);
        }
        for _ in 0..(point - digits.len()) {
            out.push('0');
        }
        return;
    }

    for digit in &digits[..point] {
        out.push(*digit as char);
    }
    out.push('.');
    for digit in &digits[point..] {
        out.push(*digit as char);
    }
}

/// Drop trailing fraction zeros and a dangling point from the number that
/// starts at `start`.
fn trim_fraction_in_place(out: &mut String, start: usize) {
    let rendered = &out.as_bytes()[start..];
    let Some(dot) = rendered.iter().position(|b| *b == b'.') else {
        return;
    };
    let dot = start + dot;
    let mut end = out.len();
    let bytes = out.as_bytes();
    while end > dot + 1 && bytes[end - 1] == b'0' {
        end -= 1;
    }
    if end == dot + 1 {
        end = dot;
    }
    out.truncate(end);
}
