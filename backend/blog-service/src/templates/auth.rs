use super::{escape, form_fields, page, Template};
use crate::forms::BoundForm;

pub fn login(form: &BoundForm, next: Option<&str>) -> String {
    let next = next
        .map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(n)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Log in</h1>
<form method="post" action="/auth/login/">
{fields}
{next}
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/auth/signup/">Sign up</a></p>"#,
        fields = form_fields(form),
    );
    page(Template::Login, "Log in", None, &body)
}

pub fn signup(form: &BoundForm) -> String {
    let body = format!(
        r#"<h1>Sign up</h1>
<form method="post" action="/auth/signup/">
{fields}
<button type="submit">Create account</button>
</form>"#,
        fields = form_fields(form),
    );
    page(Template::Signup, "Sign up", None, &body)
}

pub fn logged_out() -> String {
    let body = r#"<h1>You have logged out</h1>
<p><a href="/auth/login/">Log in again</a></p>"#;
    page(Template::LoggedOut, "Logged out", None, body)
}
