//! RFC (Registro Federal de Contribuyentes) format checks.
//!
//! Personas físicas carry a 13 character RFC, personas morales 12. Both
//! embed a YYMMDD date after the name letters.

use regex::Regex;
use std::sync::LazyLock;

use super::models::ValidationResult;

static PERSONA_FISICA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-ZÑ&]{4}[0-9]{6}[A-Z0-9]{3}$").expect("Invalid regex pattern for RFC fisica")
});

static PERSONA_MORAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-ZÑ&]{3}[0-9]{6}[A-Z0-9]{3}$").expect("Invalid regex pattern for RFC moral")
});

/// Uppercase and drop all whitespace
pub fn normalize_rfc(rfc: &str) -> String {
    rfc.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

fn two_digits(chars: &[char], start: usize) -> u32 {
    chars[start..start + 2]
        .iter()
        .filter_map(|c| c.to_digit(10))
        .fold(0, |acc, d| acc * 10 + d)
}

pub fn validate_rfc(rfc: &str) -> ValidationResult {
    let clean = normalize_rfc(rfc);
    if clean.is_empty() {
        return ValidationResult::invalid("rfc", "RFC es requerido");
    }

    let chars: Vec<char> = clean.chars().collect();
    let pattern = match chars.len() {
        13 => &*PERSONA_FISICA,
        12 => &*PERSONA_MORAL,
        _ => return ValidationResult::invalid("rfc", "RFC debe tener 12 o 13 caracteres"),
    };

    if !pattern.is_match(&clean) {
        return ValidationResult::invalid("rfc", "Formato de RFC inválido");
    }

    // Pattern guarantees six digits here
    let date_start = chars.len() - 9;
    let month = two_digits(&chars, date_start + 2);
    let day = two_digits(&chars, date_start + 4);

    if !(1..=12).contains(&month) {
        return ValidationResult::invalid("rfc", "Mes inválido en RFC");
    }
    if !(1..=31).contains(&day) {
        return ValidationResult::invalid("rfc", "Día inválido en RFC");
    }

    ValidationResult::valid("rfc", "RFC válido")
}
