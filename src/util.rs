use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(&it))
}

#[cfg(feature = "validation-regex")]
pub fn email_valid(email: &str) -> bool {
    use std::sync::OnceLock;

    static EMAIL: OnceLock<regex::Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern must compile")
        })
        .is_match(email)
}

#[cfg(not(feature = "validation-regex"))]
pub fn email_valid(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(email_valid("student@example.com"));
        assert!(email_valid("a@x.com"));
    }

    #[test]
    fn rejects_addresses_without_both_sides() {
        assert!(!email_valid("nothing-here"));
        assert!(!email_valid("@example.com"));
        assert!(!email_valid("student@"));
    }
}
