//! Submitted forms and their field-level validation.
//!
//! Every form is deserialized with missing fields defaulted to blank, so an
//! incomplete submission comes back as field errors rather than a parse
//! failure. `clean` trims text input, runs the field validators and returns
//! the cleaned form. Checks that need the store (existence, uniqueness) are
//! added by the caller through [`FormErrors::add`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::domain::{Comment, Post, User};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Field name to error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Fold `other` into these errors, keeping message order per field.
    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(())` when no errors were collected.
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", err.code));
                form_errors.add(field.to_string(), message);
            }
        }
        form_errors
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", REQUIRED));
    }
    Ok(())
}

/// Required; letters, digits and `@ . + - _` only.
fn validate_username(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    let valid = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '@' | '.' | '+' | '-'));
    if !valid {
        return Err(error(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

fn blank_or_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        return Ok(());
    }
    Err(error("email", "Enter a valid email address."))
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Create/edit form for posts. Author and creation time are never submitted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 256, message = "Ensure this value has at most 256 characters.")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    #[validate(required(message = "This field is required."))]
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: bool,
    #[validate(required(message = "This field is required."))]
    pub category: Option<Uuid>,
    pub location: Option<Uuid>,
    #[validate(length(max = 512, message = "Ensure this value has at most 512 characters."))]
    pub image: Option<String>,
}

impl Default for PostForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            pub_date: None,
            is_published: true,
            category: None,
            location: None,
            image: None,
        }
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: Some(post.pub_date),
            is_published: post.is_published,
            category: post.category_id,
            location: post.location_id,
            image: post.image.clone(),
        }
    }
}

impl PostForm {
    pub fn clean(mut self) -> Result<Self, FormErrors> {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.text);
        self.image = self
            .image
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        self.validate()?;
        Ok(self)
    }

    /// Build a new post authored by `author_id` from a cleaned form.
    pub fn into_post(self, author_id: Uuid) -> Post {
        let mut post = Post::new(
            author_id,
            String::new(),
            String::new(),
            self.pub_date.unwrap_or_else(Utc::now),
        );
        self.apply_to(&mut post);
        post
    }

    /// Copy the cleaned fields onto an existing post.
    pub fn apply_to(self, post: &mut Post) {
        post.title = self.title;
        post.text = self.text;
        if let Some(pub_date) = self.pub_date {
            post.pub_date = pub_date;
        }
        post.is_published = self.is_published;
        post.category_id = self.category;
        post.location_id = self.location;
        post.image = self.image;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

impl From<&Comment> for CommentForm {
    fn from(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
        }
    }
}

impl CommentForm {
    pub fn clean(mut self) -> Result<Self, FormErrors> {
        trim_in_place(&mut self.text);
        self.validate()?;
        Ok(self)
    }
}

/// Profile edit form. Username uniqueness is checked by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[validate(custom(function = "blank_or_email"))]
    pub email: String,
    #[validate(
        custom(function = "validate_username"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub username: String,
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}

impl ProfileForm {
    pub fn clean(mut self) -> Result<Self, FormErrors> {
        trim_in_place(&mut self.first_name);
        trim_in_place(&mut self.last_name);
        trim_in_place(&mut self.email);
        trim_in_place(&mut self.username);
        self.validate()?;
        Ok(self)
    }

    pub fn apply_to(self, user: &mut User) {
        user.first_name = self.first_name;
        user.last_name = self.last_name;
        user.email = self.email;
        user.username = self.username;
        user.updated_at = Utc::now();
    }
}

/// Sign-up form. Username uniqueness is checked by the caller.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegistrationForm {
    #[validate(
        custom(function = "validate_username"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub username: String,
    #[validate(custom(function = "blank_or_email"))]
    pub email: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
}

impl RegistrationForm {
    pub fn clean(mut self) -> Result<Self, FormErrors> {
        trim_in_place(&mut self.username);
        trim_in_place(&mut self.email);
        trim_in_place(&mut self.first_name);
        trim_in_place(&mut self.last_name);
        self.validate()?;
        Ok(self)
    }

    /// Build the user record once the password has been hashed.
    pub fn into_user(self, password_hash: String) -> User {
        let mut user = User::new(self.username, self.email, password_hash);
        user.first_name = self.first_name;
        user.last_name = self.last_name;
        user
    }
}
