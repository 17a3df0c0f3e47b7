//! Code 128 encoding with automatic code set selection.
//!
//! The barcoders crate expects its input to start with a code set marker
//! and switches sets wherever another marker appears:
//!
//! | Marker | Set | Covers |
//! |--------|-----|--------|
//! | `À` | A | control characters, uppercase, digits, punctuation |
//! | `Ɓ` | B | uppercase, lowercase, digits, punctuation (incl. `|`) |
//! | `Ć` | C | digit pairs |
//!
//! BOT barcode text needs more than one set: the leading `|` only exists in
//! set B and the CR delimiters only in set A. Long digit runs go to set C.

use barcoders::sym::code128::Code128;

use super::RenderError;

/// Digit runs at least this long are packed into set C.
const MIN_SET_C_RUN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    fn marker(self) -> char {
        match self {
            CodeSet::A => '\u{00C0}',
            CodeSet::B => '\u{0181}',
            CodeSet::C => '\u{0106}',
        }
    }

    /// The set a character forces, if only one of A/B can encode it.
    fn required_for(c: char) -> Option<CodeSet> {
        match c as u32 {
            0x00..=0x1F => Some(CodeSet::A),
            0x60..=0x7F => Some(CodeSet::B),
            _ => None,
        }
    }
}

/// Insert code set markers into `data` for the barcoders encoder.
pub fn with_code_sets(data: &str) -> Result<String, RenderError> {
    if let Some(c) = data.chars().find(|c| !c.is_ascii()) {
        return Err(RenderError::Unencodable(format!(
            "{:?} cannot be encoded in Code 128",
            c
        )));
    }

    let chars: Vec<char> = data.chars().collect();
    let mut out = String::with_capacity(data.len() + 8);
    let mut current: Option<CodeSet> = None;
    let mut i = 0;

    while i < chars.len() {
        let digits = chars[i..].iter().take_while(|c| c.is_ascii_digit()).count();
        if digits >= MIN_SET_C_RUN {
            let paired = digits - digits % 2;
            if current != Some(CodeSet::C) {
                out.push(CodeSet::C.marker());
                current = Some(CodeSet::C);
            }
            out.extend(&chars[i..i + paired]);
            i += paired;
            continue;
        }

        let c = chars[i];
        let set = match (CodeSet::required_for(c), current) {
            (Some(set), _) => set,
            (None, Some(CodeSet::A)) => CodeSet::A,
            (None, Some(CodeSet::B)) => CodeSet::B,
            // Pick whichever set the next set-specific character needs.
            (None, _) => chars[i..]
                .iter()
                .find_map(|&c| CodeSet::required_for(c))
                .unwrap_or(CodeSet::B),
        };
        if current != Some(set) {
            out.push(set.marker());
            current = Some(set);
        }
        out.push(c);
        i += 1;
    }

    Ok(out)
}

/// Encode data as Code 128 modules.
/// Returns a Vec<bool> where true = bar (black), false = space (white).
pub fn encode(data: &str) -> Result<Vec<bool>, RenderError> {
    if data.is_empty() {
        return Err(RenderError::EmptyPayload);
    }

    let prefixed = with_code_sets(data)?;
    let barcode = Code128::new(&prefixed).map_err(|e| RenderError::Unencodable(e.to_string()))?;

    Ok(barcode.encode().into_iter().map(|module| module == 1).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_uses_set_b() {
        assert_eq!(with_code_sets("Hello").unwrap(), "\u{0181}Hello");
    }

    #[test]
    fn test_digit_run_uses_set_c() {
        assert_eq!(with_code_sets("123456").unwrap(), "\u{0106}123456");
        // Odd run leaves one digit for set B
        assert_eq!(with_code_sets("12345").unwrap(), "\u{0106}1234\u{0181}5");
    }

    #[test]
    fn test_short_digit_run_stays() {
        assert_eq!(with_code_sets("AB12").unwrap(), "\u{0181}AB12");
    }

    #[test]
    fn test_control_chars_use_set_a() {
        assert_eq!(with_code_sets("A\rB").unwrap(), "\u{00C0}A\rB");
    }

    #[test]
    fn test_bot_text() {
        let text = "|099400016301108\r50A0230680100001\r0000000105542003108\r20000";
        let prefixed = with_code_sets(text).unwrap();
        assert_eq!(
            prefixed,
            "\u{0181}|\u{0106}09940001630110\u{00C0}8\r50A\u{0106}023068010000\u{00C0}1\
             \r\u{0106}000000010554200310\u{00C0}8\r\u{0106}2000\u{0181}0"
        );
    }

    #[test]
    fn test_rejects_non_ascii() {
        assert!(matches!(
            with_code_sets("บาท"),
            Err(RenderError::Unencodable(_))
        ));
    }

    #[test]
    fn test_encode() {
        let bars = encode("Hello").unwrap();
        assert!(!bars.is_empty());
        // Code 128 always starts with a bar
        assert!(bars[0]);
        assert!(bars.iter().any(|&b| !b));
    }

    #[test]
    fn test_encode_empty() {
        assert!(matches!(encode(""), Err(RenderError::EmptyPayload)));
    }
}
