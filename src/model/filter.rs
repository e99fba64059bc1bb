//! Declarative album filtering.
//!
//! Filters are evaluated client-side so that every provider offers the same
//! query semantics, regardless of what the server can filter natively.

use serde::{Deserialize, Serialize};

use super::Album;

/// Album query.
///
/// The default value is the nil filter, which matches every album.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumFilter {
    /// Lowest accepted release year (0 = unbounded)
    pub min_year: i32,
    /// Highest accepted release year (0 = unbounded)
    pub max_year: i32,
    /// Accepted genres, compared case-insensitively (empty = any genre)
    pub genres: Vec<String>,
    /// Reject favorited albums. Mutually exclusive with `exclude_unfavorited`.
    pub exclude_favorited: bool,
    /// Reject albums that are not favorited. Mutually exclusive with `exclude_favorited`.
    pub exclude_unfavorited: bool,
}

impl AlbumFilter {
    /// True if this is the nil filter, i.e. it matches everything.
    pub fn is_nil(&self) -> bool {
        self.min_year == 0
            && self.max_year == 0
            && self.genres.is_empty()
            && !self.exclude_favorited
            && !self.exclude_unfavorited
    }

    /// Evaluate the filter against an album. `None` never matches.
    pub fn matches(&self, album: Option<&Album>) -> bool {
        let Some(album) = album else {
            return false;
        };
        if self.exclude_favorited && album.favorite {
            return false;
        }
        if self.exclude_unfavorited && !album.favorite {
            return false;
        }
        if album.year < self.min_year || (self.max_year > 0 && album.year > self.max_year) {
            return false;
        }
        if self.genres.is_empty() {
            return true;
        }
        genres_match(&self.genres, &album.genres)
    }
}

/// Any filter genre equal (ignoring case) to any album genre.
fn genres_match(filter_genres: &[String], album_genres: &[String]) -> bool {
    filter_genres
        .iter()
        .any(|wanted| album_genres.iter().any(|g| eq_ignore_case(wanted, g)))
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arbitrary_album() -> impl Strategy<Value = Album> {
        (
            0i32..3000,
            prop::collection::vec("[A-Za-z]{1,10}", 0..4),
            any::<bool>(),
        )
            .prop_map(|(year, genres, favorite)| Album {
                year,
                genres,
                favorite,
                ..Default::default()
            })
    }

    proptest! {
        /// The nil filter accepts every album
        #[test]
        fn nil_filter_matches_everything(album in arbitrary_album()) {
            prop_assert!(AlbumFilter::default().matches(Some(&album)));
        }

        /// Changing the case of a filter genre never changes the outcome
        #[test]
        fn genre_case_does_not_matter(album in arbitrary_album(), genre in "[A-Za-z]{1,10}") {
            let lower = AlbumFilter { genres: vec![genre.to_lowercase()], ..Default::default() };
            let upper = AlbumFilter { genres: vec![genre.to_uppercase()], ..Default::default() };
            prop_assert_eq!(lower.matches(Some(&album)), upper.matches(Some(&album)));
        }

        /// Adding a genre to the filter can only widen the match
        #[test]
        fn extra_genre_only_widens(album in arbitrary_album(), a in "[A-Za-z]{1,10}", b in "[A-Za-z]{1,10}") {
            let narrow = AlbumFilter { genres: vec![a.clone()], ..Default::default() };
            let wide = AlbumFilter { genres: vec![a, b], ..Default::default() };
            if narrow.matches(Some(&album)) {
                prop_assert!(wide.matches(Some(&album)));
            }
        }
    }
}
