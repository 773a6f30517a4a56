//! Request bodies of the HTML forms and the REST sub-API, with their checks.
//!
//! Handlers call `form.validate()?`; failures become
//! [`crate::error::Error::Validation`] and answer 400 with the field errors.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Actor and director `sex` values: male, female or unspecified.
pub fn validate_sex(sex: &str) -> Result<(), ValidationError> {
    match sex {
        "M" | "F" | "" => Ok(()),
        _ => {
            let mut err = ValidationError::new("choice");
            err.message = Some("Select M, F or leave blank.".into());
            Err(err)
        }
    }
}

/// Email that may be left blank.
fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || validator::validate_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RatingForm {
    #[validate(range(min = 0.0, max = 10.0))]
    pub value: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListForm {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
}

/// "Add to list" on the movie page. `0` means no list was picked.
#[derive(Debug, Deserialize)]
pub struct AddToListForm {
    pub list_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MessageForm {
    pub addressee: i32,
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplyForm {
    pub message_id: i32,
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ActorForm {
    #[validate(length(min = 1, max = 25))]
    pub first_name: String,
    #[validate(length(min = 1, max = 25))]
    pub last_name: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    #[validate(custom = "validate_sex")]
    pub sex: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AccountForm {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 8, max = 1000), must_match = "password2")]
    pub password1: String,
    pub password2: String,
    #[validate(length(min = 1, max = 150))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(max = 150))]
    pub first_name: String,
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    #[validate(custom = "validate_optional_email")]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    /// Absent on the bare page; an empty submission lists everything.
    pub pattern: Option<String>,
}

/// `PUT /api/directors/{id}/`
#[derive(Debug, Deserialize, Validate)]
pub struct DirectorForm {
    #[validate(length(min = 1, max = 25))]
    pub first_name: String,
    #[validate(length(min = 1, max = 25))]
    pub last_name: String,
    #[serde(default)]
    #[validate(custom = "validate_sex")]
    pub sex: String,
    pub birth_date: NaiveDate,
}

/// `POST /api/comments/`, authored by the requester.
#[derive(Debug, Deserialize, Validate)]
pub struct ApiCommentForm {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
    pub movie: i32,
}

/// `POST /api/admin/comments/`, with an explicit author.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCommentForm {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
    pub movie: i32,
    pub author: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApiMessageForm {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
    pub addressee: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApiListForm {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(RatingForm { value: 0.0 }.validate().is_ok());
        assert!(RatingForm { value: 10.0 }.validate().is_ok());
        assert!(RatingForm { value: 10.5 }.validate().is_err());
        assert!(RatingForm { value: -1.0 }.validate().is_err());
    }

    #[test]
    fn test_actor_form() {
        let form = ActorForm {
            first_name: "Keanu".to_owned(),
            last_name: "Reeves".to_owned(),
            birth_date: NaiveDate::from_ymd_opt(1964, 9, 2).unwrap(),
            sex: "M".to_owned(),
        };
        assert!(form.validate().is_ok());

        let form = ActorForm {
            first_name: "x".repeat(26),
            sex: "X".to_owned(),
            ..form
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("sex"));
    }

    #[test]
    fn test_account_passwords_must_match() {
        let form = AccountForm {
            username: "neo".to_owned(),
            password1: "followthewhiterabbit".to_owned(),
            password2: "followthewhiterabbit".to_owned(),
            first_name: "Thomas".to_owned(),
            last_name: "Anderson".to_owned(),
        };
        assert!(form.validate().is_ok());

        let form = AccountForm {
            password2: "bluepill".to_owned(),
            ..form
        };
        assert!(form.validate().unwrap_err().field_errors().contains_key("password1"));
    }

    #[test]
    fn test_profile_email_may_be_blank() {
        let mut form = ProfileForm {
            first_name: "Trinity".to_owned(),
            last_name: String::new(),
            email: String::new(),
        };
        assert!(form.validate().is_ok());
        form.email = "not-an-email".to_owned();
        assert!(form.validate().is_err());
        form.email = "trinity@example.com".to_owned();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_list_name_length() {
        assert!(ListForm { name: String::new() }.validate().is_err());
        assert!(ListForm { name: "x".repeat(61) }.validate().is_err());
        assert!(ListForm { name: "Sunday".to_owned() }.validate().is_ok());
    }
}
