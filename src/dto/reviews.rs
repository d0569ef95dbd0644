use sea_orm::Set;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    entity::reviews,
    error::AppResult,
    validation::{clean_note, validate_rating},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub note: Option<String>,
}

impl CreateReviewRequest {
    pub fn validate(self) -> AppResult<(i32, Option<String>)> {
        Ok((validate_rating(self.rating)?, clean_note(self.note)))
    }
}

/// Absent fields are kept; an empty `note` clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub note: Option<String>,
}

impl ReviewPatch {
    pub fn apply(self, active: &mut reviews::ActiveModel) -> AppResult<()> {
        if let Some(rating) = self.rating {
            active.rating = Set(validate_rating(rating)?);
        }
        if let Some(note) = self.note {
            active.note = Set(clean_note(Some(note)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn out_of_range_rating_is_rejected_before_any_write() {
        let mut active = reviews::ActiveModel::default();
        let err = ReviewPatch { rating: Some(6), note: Some("great".into()) }.apply(&mut active);
        assert!(err.is_err());
        assert!(matches!(active.rating, ActiveValue::NotSet));
    }

    #[test]
    fn empty_note_clears() {
        let mut active = reviews::ActiveModel::default();
        ReviewPatch { rating: None, note: Some(String::new()) }
            .apply(&mut active)
            .unwrap();
        assert_eq!(active.note, ActiveValue::Set(None));
        assert!(matches!(active.rating, ActiveValue::NotSet));
    }

    #[test]
    fn create_validates_rating() {
        assert!(CreateReviewRequest { rating: 0, note: None }.validate().is_err());
        let (rating, note) = CreateReviewRequest { rating: 4, note: Some(" ok ".into()) }
            .validate()
            .unwrap();
        assert_eq!((rating, note.as_deref()), (4, Some("ok")));
    }
}
