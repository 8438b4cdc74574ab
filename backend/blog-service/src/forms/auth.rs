use super::{BoundForm, Field, FieldKind, FormErrors, FormInput};
use validator::{Validate, ValidationErrors};

/// Usernames that would shadow a top-level route.
pub const RESERVED_USERNAMES: &[&str] = &["new", "follow", "group", "about", "auth", "healthz"];

#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

impl LoginForm {
    pub fn fields() -> Vec<Field> {
        vec![
            Field {
                name: "username",
                label: "Username",
                help_text: "",
                kind: FieldKind::Text {
                    required: true,
                    multiline: false,
                },
            },
            Field {
                name: "password",
                label: "Password",
                help_text: "",
                kind: FieldKind::Password,
            },
        ]
    }

    pub fn blank() -> BoundForm {
        BoundForm::new(Self::fields())
    }

    pub fn from_input(input: &FormInput) -> Self {
        Self {
            username: input.text("username").unwrap_or_default().trim().to_string(),
            password: input.text("password").unwrap_or_default().to_string(),
        }
    }

    pub fn check(&self) -> Result<(), BoundForm> {
        self.validate()
            .map_err(|e| self.bound(collect_errors(&e)))
    }

    /// Re-render with the username kept and the password dropped.
    pub fn bound(&self, errors: FormErrors) -> BoundForm {
        let mut form = Self::blank().with_value("username", self.username.clone());
        form.errors = errors;
        form
    }
}

#[derive(Debug, Clone, Validate)]
pub struct SignupForm {
    #[validate(length(
        min = 1,
        max = 150,
        message = "Required. 150 characters or fewer."
    ))]
    pub username: String,
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password: String,
}

impl SignupForm {
    pub fn fields() -> Vec<Field> {
        vec![
            Field {
                name: "username",
                label: "Username",
                help_text: "Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.",
                kind: FieldKind::Text {
                    required: true,
                    multiline: false,
                },
            },
            Field {
                name: "password",
                label: "Password",
                help_text: "At least 8 characters.",
                kind: FieldKind::Password,
            },
        ]
    }

    pub fn blank() -> BoundForm {
        BoundForm::new(Self::fields())
    }

    pub fn from_input(input: &FormInput) -> Self {
        Self {
            username: input.text("username").unwrap_or_default().trim().to_string(),
            password: input.text("password").unwrap_or_default().to_string(),
        }
    }

    /// Length rules plus the username character set and reserved words.
    /// Whether the name is taken is checked against the store by the caller.
    pub fn check(&self) -> Result<(), BoundForm> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => collect_errors(&e),
        };

        if !self.username.is_empty() && !errors.has("username") {
            if let Err(message) = check_username(&self.username) {
                errors.add("username", message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(self.bound(errors))
        }
    }

    pub fn bound(&self, errors: FormErrors) -> BoundForm {
        let mut form = Self::blank().with_value("username", self.username.clone());
        form.errors = errors;
        form
    }
}

fn check_username(username: &str) -> Result<(), &'static str> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-');
    if !username.chars().all(allowed) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    if RESERVED_USERNAMES
        .iter()
        .any(|r| r.eq_ignore_ascii_case(username))
    {
        return Err("This username is reserved.");
    }
    Ok(())
}

fn collect_errors(errors: &ValidationErrors) -> FormErrors {
    let mut out = FormErrors::default();
    for (field, field_errors) in errors.field_errors() {
        for err in field_errors.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            out.add(field.to_string(), message);
        }
    }
    out
}
