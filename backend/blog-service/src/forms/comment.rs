use super::{validate_text, BoundForm, Field, FieldKind, FormErrors, FormInput};

/// Only the text is submitted; author and post come from the request.
pub struct CommentForm;

impl CommentForm {
    pub fn fields() -> Vec<Field> {
        vec![Field {
            name: "text",
            label: "Text",
            help_text: "Text of the comment",
            kind: FieldKind::Text {
                required: true,
                multiline: true,
            },
        }]
    }

    pub fn blank() -> BoundForm {
        BoundForm::new(Self::fields())
    }

    pub fn validate(input: &FormInput) -> Result<String, FormErrors> {
        input
            .field("text")
            .and_then(|raw| validate_text(raw, true))
            .map_err(|e| {
                let mut errors = FormErrors::default();
                errors.add("text", e);
                errors
            })
    }
}
