use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::AnnouncementId;

/// A dated notice on the library board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub body: String,
    pub published_on: NaiveDate,
}

impl Announcement {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        published_on: NaiveDate,
    ) -> Self {
        Self {
            id: AnnouncementId::new(),
            title: title.into(),
            body: body.into(),
            published_on,
        }
    }
}
