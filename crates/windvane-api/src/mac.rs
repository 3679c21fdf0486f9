// Hardware identifier handling (MAC / IMEI).
//
// Stations are addressed upstream by either a MAC address or an IMEI.
// These are pure string functions: validation never panics, normalization
// reports format problems through `Error::Parameter`.

use crate::error::Error;

const SEPARATORS: [char; 3] = [':', '-', ' '];

/// Error message for empty or missing addresses.
const MSG_EMPTY: &str = "MAC address must be a non-empty string";

/// Error message for inputs that do not reduce to 12 hex characters.
const MSG_FORMAT: &str = "Invalid MAC address format. Expected 12 hexadecimal characters.";

// ── Validation ───────────────────────────────────────────────────────

/// Strict MAC validation. Never panics or errors.
///
/// Accepts 12 hex characters, bare or grouped in pairs by one consistent
/// separator (colon, hyphen, or space). Mixed separators and doubled
/// separators are rejected, as is anything containing a non-hex,
/// non-separator character. Case-insensitive.
pub fn is_valid_address(input: &str) -> bool {
    if input.is_empty() {
        return false;
    }

    let mut separator: Option<char> = None;
    for c in input.chars() {
        if c.is_ascii_hexdigit() {
            continue;
        }
        if SEPARATORS.contains(&c) {
            match separator {
                None => separator = Some(c),
                Some(s) if s == c => {}
                Some(_) => return false, // mixed separator styles
            }
        } else {
            return false;
        }
    }

    match separator {
        None => input.len() == 12,
        // Grouped form: six pairs. Doubled, leading, or trailing
        // separators produce a group that is not two characters wide.
        Some(s) => {
            let mut groups = 0usize;
            for group in input.split(s) {
                if group.len() != 2 {
                    return false;
                }
                groups += 1;
            }
            groups == 6
        }
    }
}

// ── Normalization ────────────────────────────────────────────────────

/// Strip all separators and uppercase, yielding the compact 12-hex form.
///
/// Laxer than [`is_valid_address`]: any input that reduces to exactly
/// 12 hex characters is accepted, regardless of how it was grouped.
pub fn to_compact(input: &str) -> Result<String, Error> {
    if input.is_empty() {
        return Err(Error::Parameter {
            message: MSG_EMPTY.to_owned(),
        });
    }

    let compact: String = input
        .chars()
        .filter(|c| !SEPARATORS.contains(c))
        .collect::<String>()
        .to_uppercase();

    if compact.len() == 12 && compact.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(compact)
    } else {
        Err(Error::Parameter {
            message: MSG_FORMAT.to_owned(),
        })
    }
}

/// Canonical display form: a colon after every second character,
/// `AA:BB:CC:DD:EE:FF`. Same validation as [`to_compact`].
pub fn format_with_separators(input: &str) -> Result<String, Error> {
    let compact = to_compact(input)?;
    let mut out = String::with_capacity(17);
    for (i, c) in compact.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push(':');
        }
        out.push(c);
    }
    Ok(out)
}

// ── DeviceIdentifier ─────────────────────────────────────────────────

/// A device address as the upstream API expects it.
///
/// MAC addresses are carried in canonical colon form; IMEIs as bare digit
/// strings. The two map to different query parameters (`mac` vs `imei`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdentifier {
    Mac(String),
    Imei(String),
}

impl DeviceIdentifier {
    /// Parse a caller-supplied address.
    ///
    /// The MAC interpretation wins when the input is a valid MAC in any
    /// accepted grouping; otherwise an all-digit string is taken as an
    /// IMEI. Anything else is a parameter error, raised before any
    /// network traffic.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::Parameter {
                message: MSG_EMPTY.to_owned(),
            });
        }

        if is_valid_address(trimmed) {
            return Ok(Self::Mac(format_with_separators(trimmed)?));
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self::Imei(trimmed.to_owned()));
        }

        Err(Error::Parameter {
            message: MSG_FORMAT.to_owned(),
        })
    }

    /// The upstream query parameter for this identifier.
    pub fn query_param(&self) -> (&'static str, &str) {
        match self {
            Self::Mac(mac) => ("mac", mac.as_str()),
            Self::Imei(imei) => ("imei", imei.as_str()),
        }
    }

    /// Separator-free form, used when synthesizing resource URIs.
    pub fn compact(&self) -> String {
        match self {
            Self::Mac(mac) => mac.replace(':', ""),
            Self::Imei(imei) => imei.clone(),
        }
    }
}

impl std::fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mac(mac) => f.write_str(mac),
            Self::Imei(imei) => f.write_str(imei),
        }
    }
}
