//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::{ColoredString, Colorize};

use crate::domain::{IntensityBand, IntensityLabel};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print dimmed hint line
pub fn hint(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().dimmed());
}

/// Print prompt without newline (cyan)
pub fn prompt(msg: &(impl std::fmt::Display + ?Sized)) {
    use std::io::Write;
    print!("{} ", msg.to_string().cyan());
    std::io::stdout().flush().ok();
}

/// Emotion name in its taxonomy color (`#RRGGBB`), bold.
///
/// Falls back to plain bold for color tokens that are not hex triples.
pub fn emotion(name: &str, color: &str) -> ColoredString {
    match parse_hex_color(color) {
        Some((r, g, b)) => name.truecolor(r, g, b).bold(),
        None => name.bold(),
    }
}

/// Intensity value with its label, colored by band.
pub fn intensity(value: u8) -> ColoredString {
    let text = format!("{}/10 {}", value, IntensityLabel::for_intensity(value));
    match IntensityBand::for_intensity(value) {
        IntensityBand::Low => text.green(),
        IntensityBand::Moderate => text.yellow(),
        IntensityBand::High => text.red(),
    }
}

fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_hex_token_when_parsing_then_returns_channels() {
        assert_eq!(parse_hex_color("#FFE066"), Some((0xFF, 0xE0, 0x66)));
    }

    #[test]
    fn given_non_hex_token_when_parsing_then_none() {
        assert_eq!(parse_hex_color("yellow"), None);
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }
}
