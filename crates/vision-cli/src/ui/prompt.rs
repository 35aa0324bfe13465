use std::io::{self, BufRead, Write};

use anyhow::Result;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Ask for a line of input. An empty answer falls back to `default`.
pub fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => print!("{} [{}]: ", label, default),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let input = input.trim();

    Ok(match default {
        Some(default) if input.is_empty() => default.to_string(),
        _ => input.to_string(),
    })
}

pub fn prompt_username(default: Option<&str>) -> Result<String> {
    let username = prompt_line("Username", default)?;
    if !is_valid_username(&username) {
        anyhow::bail!("Username must be 1-{} characters", MAX_USERNAME_LENGTH);
    }
    Ok(username)
}

pub fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("{}: ", label))?;
    Ok(password)
}

/// Yes/no question. `default` is used for an empty answer.
pub fn confirm(question: &str, default: bool) -> Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    print!("{} [{}]: ", question, hint);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(parse_confirm(&input, default))
}

fn parse_confirm(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" | "s" | "sim" => true,
        _ => false,
    }
}

fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LENGTH
        && !username.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_confirm() {
        assert!(parse_confirm("\n", true));
        assert!(!parse_confirm("", false));
        assert!(parse_confirm("Y\n", false));
        assert!(parse_confirm("sim", false));
        assert!(!parse_confirm("n", true));
        assert!(!parse_confirm("whatever", true));
    }

    #[test]
    fn test_is_valid_username() {
        assert!(is_valid_username("ana"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("ana\u{7}"));
        assert!(!is_valid_username(&"a".repeat(MAX_USERNAME_LENGTH + 1)));
    }
}
