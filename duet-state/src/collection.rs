use crate::{Normalizer, db};

/// A named set of backend records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// The artists themselves.
    Artist,
    /// Dated public appearances and events.
    Calendar,
    /// Film and series work.
    Filmography,
    /// Released songs and albums.
    Discography,
    /// Live performances.
    Performance,
    /// Magazine covers and features.
    Magazines,
    /// Brand endorsements.
    Endorsements,
    /// Online content.
    Contents,
    /// Award nominations and wins.
    Awards,
    /// Per-episode details of filmography entries.
    FilmographyDetail,
}
impl Collection {
    /// Every collection, in navigation order.
    pub const ALL: [Collection; 10] = [
        Collection::Artist,
        Collection::Calendar,
        Collection::Filmography,
        Collection::Discography,
        Collection::Performance,
        Collection::Magazines,
        Collection::Endorsements,
        Collection::Contents,
        Collection::Awards,
        Collection::FilmographyDetail,
    ];

    /// The backend table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Artist => "artist",
            Collection::Calendar => "calendar",
            Collection::Filmography => "filmography",
            Collection::Discography => "discography",
            Collection::Performance => "performance",
            Collection::Magazines => "magazines",
            Collection::Endorsements => "endorsements",
            Collection::Contents => "contents",
            Collection::Awards => "awards",
            Collection::FilmographyDetail => "filmographydetail",
        }
    }

    /// The joined relation whose `name` is shown alongside each record, if any.
    pub fn relation(&self) -> Option<&'static str> {
        match self {
            Collection::Artist | Collection::FilmographyDetail => None,
            _ => Some("artist"),
        }
    }

    /// The column list to request, including the relation join.
    pub fn select_columns(&self) -> String {
        match self.relation() {
            Some(relation) => format!("*, {relation}(name)"),
            None => "*".to_string(),
        }
    }

    /// The server-side ordering applied when fetching.
    pub fn default_order(&self) -> (&'static str, db::Direction) {
        match self {
            Collection::Artist => ("name", db::Direction::Ascending),
            Collection::FilmographyDetail => ("id", db::Direction::Ascending),
            Collection::Calendar | Collection::Performance => ("date", db::Direction::Ascending),
            _ => ("date", db::Direction::Descending),
        }
    }

    /// The field used to label this collection's records in relation pickers.
    pub fn label_field(&self) -> &'static str {
        match self {
            Collection::Artist => "name",
            _ => "title",
        }
    }

    /// The columns offered when creating a record and no sample row exists to copy.
    pub fn important_columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Artist => &["name", "full_name", "birth_date", "image", "instagram_url"],
            Collection::Calendar => &[
                "date", "time", "title", "type", "location", "artist_id", "image", "url",
                "is_public",
            ],
            Collection::Filmography => &[
                "date", "title", "role", "type", "channel", "artist_id", "image", "url",
                "description",
            ],
            Collection::Discography => &[
                "date", "title", "type", "album", "artist_id", "image", "youtube_url",
                "spotify_url",
            ],
            Collection::Performance => &[
                "date", "time", "title", "venue", "artist_id", "image", "url",
            ],
            Collection::Magazines => &["date", "title", "issue", "artist_id", "image", "url"],
            Collection::Endorsements => &[
                "date", "brand", "title", "type", "artist_id", "image", "url", "is_active",
            ],
            Collection::Contents => &[
                "date", "title", "platform", "type", "artist_id", "image", "url",
            ],
            Collection::Awards => &[
                "date", "title", "category", "result", "artist_id", "image", "url",
            ],
            Collection::FilmographyDetail => &[
                "filmography_id", "episode", "title", "air_date", "image", "url", "description",
            ],
        }
    }

    /// A normalizer configured for this collection's relation.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.relation())
    }

    /// A query that fetches every row of this collection with its relation joined.
    pub fn query<'a>(&self, client: &'a db::Client) -> db::Query<'a> {
        let (field, direction) = self.default_order();
        client
            .from(self.as_str())
            .select(self.select_columns())
            .order(field, direction)
    }

    /// The collection whose rows a `<entity>_id` foreign key points at.
    pub fn for_foreign_key(key: &str) -> Option<Collection> {
        let entity = key.strip_suffix("_id")?;
        entity.parse().ok()
    }
}
impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when parsing a name that is not a known collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCollection(pub String);
impl std::fmt::Display for UnknownCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown collection `{}`", self.0)
    }
}
impl std::error::Error for UnknownCollection {}

impl std::str::FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}
