//! Best-effort CSS color parsing.
//!
//! Only the handful of notations a configuration panel hands us are
//! understood: `rgb(r, g, b)`, `rgba(r, g, b, a)` and `#rgb` / `#rrggbb` /
//! `#rrggbbaa`. Anything else is painted black instead of failing the caller.

/// Normalized `[r, g, b]` channel intensities in `[0, 1]`.
pub type Rgb = [f32; 3];

pub const BLACK: Rgb = [0.0, 0.0, 0.0];

/// Parses `input` into normalized channels, falling back to [`BLACK`].
pub fn parse_color(input: &str) -> Rgb {
    let trimmed = input.trim();
    let parsed = match trimmed.strip_prefix('#') {
        Some(hex) => parse_hex(hex),
        None => parse_functional(trimmed),
    };
    match parsed {
        Some([r, g, b]) => [normalize(r), normalize(g), normalize(b)],
        None => {
            log::debug!("unrecognized color {input:?}, falling back to black");
            BLACK
        }
    }
}

fn normalize(channel: u8) -> f32 {
    f32::from(channel) / 255.0
}

fn parse_functional(input: &str) -> Option<[u8; 3]> {
    let lower = input.to_ascii_lowercase();
    let (args, arity) = if let Some(rest) = lower.strip_prefix("rgba") {
        (rest, 4)
    } else if let Some(rest) = lower.strip_prefix("rgb") {
        (rest, 3)
    } else {
        return None;
    };

    let inner = args
        .trim_start()
        .strip_prefix('(')?
        .trim_end()
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != arity {
        return None;
    }

    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        *slot = part.parse().ok()?;
    }
    // alpha is accepted for convenience but never rendered
    if arity == 4 {
        parts[3].parse::<f32>().ok()?;
    }
    Some(channels)
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some([digit(0)? * 17, digit(1)? * 17, digit(2)? * 17]),
        6 | 8 => Some([pair(0)?, pair(2)?, pair(4)?]),
        _ => None,
    }
}
