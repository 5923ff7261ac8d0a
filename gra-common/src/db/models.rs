//! Database models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub year: i64,
    pub winner: bool,
}

/// Fields accepted when creating a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub year: i64,
    #[serde(default)]
    pub winner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Studio {
    pub id: Uuid,
    pub name: String,
}

/// Movie with optionally expanded relations
///
/// A relation that was not requested serializes as `null`, an expanded
/// relation with no rows as `[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub producers: Option<Vec<Producer>>,
    pub studios: Option<Vec<Studio>>,
}

/// Which relations to attach when listing movies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expand {
    pub producers: bool,
    pub studios: bool,
}

impl Expand {
    /// Parse a comma-separated relation list such as `producers,studios`
    ///
    /// Unknown names are ignored.
    pub fn from_list(list: &str) -> Self {
        let mut expand = Self::default();
        for part in list.split(',').map(|p| p.trim().to_ascii_lowercase()) {
            match part.as_str() {
                "producers" => expand.producers = true,
                "studios" => expand.studios = true,
                _ => {}
            }
        }
        expand
    }
}

/// A winning movie as read by the award interval engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningMovie {
    pub title: String,
    pub year: i64,
    /// Names of credited producers, possibly empty
    pub producers: Vec<String>,
}

/// Parse a TEXT guid column
pub(crate) fn parse_guid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Corrupt guid '{}': {}", value, e)))
}

/// Trim a unique name and reject blanks
pub(crate) fn normalize_name(kind: &str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} name cannot be empty", kind)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_from_list() {
        assert_eq!(Expand::from_list(""), Expand::default());
        assert_eq!(
            Expand::from_list("producers"),
            Expand { producers: true, studios: false }
        );
        assert_eq!(
            Expand::from_list(" Studios , producers,unknown"),
            Expand { producers: true, studios: true }
        );
    }

    #[test]
    fn test_normalize_name_rejects_blank() {
        assert_eq!(normalize_name("Producer", "  Allan Carr ").unwrap(), "Allan Carr");
        assert!(matches!(
            normalize_name("Producer", "   "),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_movie_detail_serializes_flat() {
        let detail = MovieDetail {
            movie: Movie {
                id: Uuid::nil(),
                title: "Can't Stop the Music".to_string(),
                year: 1980,
                winner: true,
            },
            producers: Some(vec![]),
            studios: None,
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Can't Stop the Music");
        assert_eq!(json["year"], 1980);
        assert_eq!(json["producers"], serde_json::json!([]));
        assert!(json["studios"].is_null());
    }
}
