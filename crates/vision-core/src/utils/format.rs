use chrono::{DateTime, Local, TimeZone, Utc};
use reqwest::Url;

/// Host serving placeholder images for listings without photos
pub const PLACEHOLDER_BASE: &str = "https://via.placeholder.com";

/// Country prefix added to local phone numbers in WhatsApp links
const WHATSAPP_COUNTRY_CODE: &str = "55";

/// Extract just the digits of a phone number
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a Brazilian phone number for display
/// Normalizes to (XX) XXXXX-XXXX for mobiles and (XX) XXXX-XXXX for landlines
pub fn format_phone(phone: &str) -> String {
    let digits = phone_digits(phone);
    let local = match digits.len() {
        12 | 13 if digits.starts_with(WHATSAPP_COUNTRY_CODE) => &digits[2..],
        _ => digits.as_str(),
    };

    match local.len() {
        11 => format!("({}) {}-{}", &local[0..2], &local[2..7], &local[7..11]),
        10 => format!("({}) {}-{}", &local[0..2], &local[2..6], &local[6..10]),
        _ => phone.to_string(), // Return original if can't format
    }
}

/// Format a price in Brazilian reais, e.g. `R$ 1.250.000,00`
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return "R$ -".to_string();
    }

    let cents = (price.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

/// Format a timestamp as `dd/mm/yyyy HH:MM` in the timestamp's own zone
pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%d/%m/%Y %H:%M").to_string()
}

/// Format a backend timestamp in the machine's local time zone
pub fn format_local(dt: &DateTime<Utc>) -> String {
    format_datetime(&dt.with_timezone(&Local))
}

/// Resolve a listing image reference to something a client can load.
///
/// Absolute URLs (CDN uploads) pass through, server-relative paths are
/// prefixed with the asset origin, and a missing image becomes a placeholder
/// of the given size (e.g. `400x280`).
pub fn image_url(path: Option<&str>, asset_base: &str, placeholder_size: &str) -> String {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        None => format!("{}/{}?text=Sem+Imagem", PLACEHOLDER_BASE, placeholder_size),
        Some(p) if p.starts_with("http://") || p.starts_with("https://") => p.to_string(),
        Some(p) => {
            let base = asset_base.trim_end_matches('/');
            if p.starts_with('/') {
                format!("{}{}", base, p)
            } else {
                format!("{}/{}", base, p)
            }
        }
    }
}

/// WhatsApp click-to-chat link with a prefilled message.
/// Returns None when the phone number has no digits.
pub fn whatsapp_link(phone: &str, message: &str) -> Option<String> {
    let mut digits = phone_digits(phone);
    if digits.is_empty() {
        return None;
    }
    if digits.len() <= 11 {
        digits.insert_str(0, WHATSAPP_COUNTRY_CODE);
    }

    Url::parse_with_params(&format!("https://wa.me/{}", digits), &[("text", message)])
        .ok()
        .map(String::from)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None or empty
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("34998765432"), "(34) 99876-5432");
        assert_eq!(format_phone("3433334444"), "(34) 3333-4444");
        assert_eq!(format_phone("+55 34 99876-5432"), "(34) 99876-5432");
        assert_eq!(format_phone("(34) 99876-5432"), "(34) 99876-5432");
        assert_eq!(format_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1250000.0), "R$ 1.250.000,00");
        assert_eq!(format_price(450000.5), "R$ 450.000,50");
        assert_eq!(format_price(999.999), "R$ 1.000,00");
        assert_eq!(format_price(0.0), "R$ 0,00");
        assert_eq!(format_price(-35.1), "-R$ 35,10");
        assert_eq!(format_price(f64::NAN), "R$ -");
    }

    #[test]
    fn test_format_datetime() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(format_datetime(&dt), "05/03/2024 14:07");
    }

    #[test]
    fn test_image_url() {
        let base = "https://api.example.com/";
        assert_eq!(
            image_url(Some("https://cdn.example.com/a.jpg"), base, "400x280"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            image_url(Some("/uploads/a.jpg"), base, "400x280"),
            "https://api.example.com/uploads/a.jpg"
        );
        assert_eq!(
            image_url(Some("uploads/a.jpg"), base, "400x280"),
            "https://api.example.com/uploads/a.jpg"
        );
        assert_eq!(
            image_url(None, base, "1200x500"),
            "https://via.placeholder.com/1200x500?text=Sem+Imagem"
        );
        assert_eq!(
            image_url(Some("  "), base, "60"),
            "https://via.placeholder.com/60?text=Sem+Imagem"
        );
    }

    #[test]
    fn test_whatsapp_link() {
        let link = whatsapp_link("(34) 99768-3827", "Olá! Tenho interesse").unwrap();
        assert!(link.starts_with("https://wa.me/5534997683827?text="));
        assert!(!link.contains(' '));

        let link = whatsapp_link("+55 34 99768-3827", "Oi").unwrap();
        assert!(link.starts_with("https://wa.me/5534997683827?"));

        assert!(whatsapp_link("n/a", "Oi").is_none());
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Apartamento à venda", 10), "Apartam...");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some("x"), "-"), "x");
        assert_eq!(format_optional(Some(""), "-"), "-");
        assert_eq!(format_optional(None, "-"), "-");
    }
}
