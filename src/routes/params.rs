use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, default 1
    pub page: Option<i64>,
    /// Items per page, default 20, at most 100
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Returns `(page, per_page, offset)`. The offset saturates at `i64::MAX`,
    /// which simply yields an empty page.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

// Query strings do not survive `#[serde(flatten)]` with numeric fields, so the
// paging fields are repeated here instead of nesting `Pagination`.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive match on name or brands
    pub q: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Pagination::new(0, 1000).normalize(), (1, 100, 0));
        assert_eq!(Pagination::new(3, 0).normalize(), (3, 1, 2));
    }

    #[test]
    fn huge_page_saturates_offset() {
        assert_eq!(
            Pagination::new(i64::MAX, 100).normalize(),
            (i64::MAX, 100, i64::MAX)
        );
        let (_, _, offset) = Pagination::new(i64::MAX / 50, 100).normalize();
        assert_eq!(offset, i64::MAX);
        assert_eq!(Pagination::new(i64::MIN, 20).normalize(), (1, 20, 0));
    }
}
