//! Wire-level DTOs for the IGDB API and its Twitch OAuth endpoint.

use serde::Deserialize;

use crate::domain::ports::CatalogGameRecord;

/// Twitch OAuth client-credentials response.
#[derive(Debug, Clone, Deserialize)]
pub struct OauthTokenDto {
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token lifetime in seconds; IGDB defaults to one hour.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// One genre row from `POST /genres`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenreDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Nested cover object on game rows.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverDto {
    #[serde(default)]
    pub url: Option<String>,
}

/// One game row from `POST /games` with full fields.
#[derive(Debug, Clone, Deserialize)]
pub struct GameDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub first_release_date: Option<i64>,
    #[serde(default)]
    pub genres: Option<Vec<i64>>,
    #[serde(default)]
    pub cover: Option<CoverDto>,
}

impl GameDto {
    /// Convert to the port record.
    pub fn into_record(self) -> CatalogGameRecord {
        CatalogGameRecord {
            name: self.name.unwrap_or_else(|| "Unknown".to_owned()),
            rating: self.rating,
            first_release_date: self.first_release_date,
            genre_ids: self.genres.unwrap_or_default(),
            cover_url: self.cover.and_then(|cover| cover.url),
        }
    }
}

/// One game row from `POST /games` with only the genres field.
#[derive(Debug, Clone, Deserialize)]
pub struct GameGenresDto {
    #[serde(default)]
    pub genres: Option<Vec<i64>>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn game_decodes_with_nested_cover() {
        let dto: GameDto = serde_json::from_str(
            r#"{
                "name": "Portal",
                "rating": 89.5,
                "first_release_date": 1191974400,
                "genres": [5, 8],
                "cover": { "url": "//images.igdb.com/p.jpg" }
            }"#,
        )
        .expect("game decodes");

        let record = dto.into_record();
        assert_eq!(record.name, "Portal");
        assert_eq!(record.genre_ids, vec![5, 8]);
        assert_eq!(record.cover_url.as_deref(), Some("//images.igdb.com/p.jpg"));
    }

    #[test]
    fn game_tolerates_sparse_rows() {
        let dto: GameDto = serde_json::from_str(r"{}").expect("game decodes");
        let record = dto.into_record();
        assert_eq!(record.name, "Unknown");
        assert!(record.genre_ids.is_empty());
        assert!(record.cover_url.is_none());
    }

    #[test]
    fn token_response_decodes() {
        let dto: OauthTokenDto =
            serde_json::from_str(r#"{ "access_token": "abc", "expires_in": 5000 }"#)
                .expect("token decodes");
        assert_eq!(dto.access_token.as_deref(), Some("abc"));
        assert_eq!(dto.expires_in, Some(5000));
    }
}
