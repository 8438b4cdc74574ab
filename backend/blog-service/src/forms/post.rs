use super::{
    group_choices, validate_group_choice, validate_image, validate_text, BoundForm, Field,
    FieldKind, FormErrors, FormInput, Upload,
};
use crate::models::{Group, PostView};

pub const IMAGE_CLEAR_FIELD: &str = "image-clear";

/// What a submission does to the post's image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    /// No upload: a new post has no image, an edited one keeps its own.
    Keep,
    Clear,
    Replace(Upload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: ImageChange,
}

pub struct PostForm;

impl PostForm {
    pub fn fields(groups: &[Group]) -> Vec<Field> {
        vec![
            Field {
                name: "group",
                label: "Group",
                help_text: "Group the post belongs to",
                kind: FieldKind::Choice {
                    choices: group_choices(groups),
                },
            },
            Field {
                name: "text",
                label: "Text",
                help_text: "Text of the post",
                kind: FieldKind::Text {
                    required: true,
                    multiline: true,
                },
            },
            Field {
                name: "image",
                label: "Image",
                help_text: "Picture attached to the post",
                kind: FieldKind::Image,
            },
        ]
    }

    pub fn blank(groups: &[Group]) -> BoundForm {
        BoundForm::new(Self::fields(groups))
    }

    /// The edit form, pre-filled from an existing post.
    pub fn for_post(groups: &[Group], post: &PostView) -> BoundForm {
        Self::blank(groups)
            .with_value("text", post.text.clone())
            .with_value(
                "group",
                post.group_id.map(|id| id.to_string()).unwrap_or_default(),
            )
            .with_value("image", post.image.clone().unwrap_or_default())
    }

    /// Clean a submission, or return the form bound to it with errors.
    pub fn validate(
        input: &FormInput,
        groups: &[Group],
        max_upload_bytes: usize,
    ) -> Result<CleanPost, BoundForm> {
        let mut errors = FormErrors::default();

        let text = input
            .field("text")
            .and_then(|raw| validate_text(raw, true))
            .map_err(|e| errors.add("text", e))
            .ok();
        let group_id = input
            .field("group")
            .and_then(|raw| validate_group_choice(raw, groups))
            .map_err(|e| errors.add("group", e))
            .ok()
            .flatten();
        let upload = validate_image(input.file("image"), max_upload_bytes)
            .map_err(|e| errors.add("image", e))
            .ok()
            .flatten();

        let clear = input.checked(IMAGE_CLEAR_FIELD);
        if clear && upload.is_some() {
            errors.add(
                "image",
                "Please either submit a file or check the clear checkbox, not both.",
            );
        }

        match text {
            Some(text) if errors.is_empty() => Ok(CleanPost {
                text,
                group_id,
                image: match (upload, clear) {
                    (Some(upload), _) => ImageChange::Replace(upload),
                    (None, true) => ImageChange::Clear,
                    (None, false) => ImageChange::Keep,
                },
            }),
            _ => {
                let mut form = Self::blank(groups)
                    .with_value("text", input.text("text").unwrap_or_default())
                    .with_value("group", input.text("group").unwrap_or_default());
                form.errors = errors;
                Err(form)
            }
        }
    }
}
