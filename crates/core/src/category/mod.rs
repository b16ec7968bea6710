//! Canonical categories and per-site category mapping.
//!
//! Canonical categories follow the Torznab numbering: parents are multiples
//! of 1000 (2000 Movies, 5000 TV, ...) and subcategories share the parent's
//! thousand (2040 Movies/HD).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Site-agnostic content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Console,
    Movies,
    MoviesForeign,
    MoviesOther,
    MoviesSd,
    MoviesHd,
    MoviesUhd,
    #[serde(rename = "movies_3d")]
    Movies3d,
    MoviesBluRay,
    MoviesDvd,
    MoviesWebDl,
    Audio,
    AudioMp3,
    AudioVideo,
    AudioAudiobook,
    AudioLossless,
    AudioOther,
    Pc,
    #[serde(rename = "pc_0day")]
    Pc0day,
    PcIso,
    PcMac,
    PcGames,
    Tv,
    TvWebDl,
    TvForeign,
    TvSd,
    TvHd,
    TvUhd,
    TvOther,
    TvSport,
    TvAnime,
    TvDocumentary,
    Xxx,
    Books,
    BooksMags,
    BooksEbook,
    BooksComics,
    BooksTechnical,
    Other,
    OtherMisc,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Console,
        Category::Movies,
        Category::MoviesForeign,
        Category::MoviesOther,
        Category::MoviesSd,
        Category::MoviesHd,
        Category::MoviesUhd,
        Category::Movies3d,
        Category::MoviesBluRay,
        Category::MoviesDvd,
        Category::MoviesWebDl,
        Category::Audio,
        Category::AudioMp3,
        Category::AudioVideo,
        Category::AudioAudiobook,
        Category::AudioLossless,
        Category::AudioOther,
        Category::Pc,
        Category::Pc0day,
        Category::PcIso,
        Category::PcMac,
        Category::PcGames,
        Category::Tv,
        Category::TvWebDl,
        Category::TvForeign,
        Category::TvSd,
        Category::TvHd,
        Category::TvUhd,
        Category::TvOther,
        Category::TvSport,
        Category::TvAnime,
        Category::TvDocumentary,
        Category::Xxx,
        Category::Books,
        Category::BooksMags,
        Category::BooksEbook,
        Category::BooksComics,
        Category::BooksTechnical,
        Category::Other,
        Category::OtherMisc,
    ];

    /// Torznab numeric id.
    pub fn id(self) -> u32 {
        match self {
            Category::Console => 1000,
            Category::Movies => 2000,
            Category::MoviesForeign => 2010,
            Category::MoviesOther => 2020,
            Category::MoviesSd => 2030,
            Category::MoviesHd => 2040,
            Category::MoviesUhd => 2045,
            Category::Movies3d => 2050,
            Category::MoviesBluRay => 2060,
            Category::MoviesDvd => 2070,
            Category::MoviesWebDl => 2080,
            Category::Audio => 3000,
            Category::AudioMp3 => 3010,
            Category::AudioVideo => 3020,
            Category::AudioAudiobook => 3030,
            Category::AudioLossless => 3040,
            Category::AudioOther => 3050,
            Category::Pc => 4000,
            Category::Pc0day => 4010,
            Category::PcIso => 4020,
            Category::PcMac => 4030,
            Category::PcGames => 4050,
            Category::Tv => 5000,
            Category::TvWebDl => 5010,
            Category::TvForeign => 5020,
            Category::TvSd => 5030,
            Category::TvHd => 5040,
            Category::TvUhd => 5045,
            Category::TvOther => 5050,
            Category::TvSport => 5060,
            Category::TvAnime => 5070,
            Category::TvDocumentary => 5080,
            Category::Xxx => 6000,
            Category::Books => 7000,
            Category::BooksMags => 7010,
            Category::BooksEbook => 7020,
            Category::BooksComics => 7030,
            Category::BooksTechnical => 7040,
            Category::Other => 8000,
            Category::OtherMisc => 8010,
        }
    }

    /// Human readable name, e.g. `Movies/HD`.
    pub fn name(self) -> &'static str {
        match self {
            Category::Console => "Console",
            Category::Movies => "Movies",
            Category::MoviesForeign => "Movies/Foreign",
            Category::MoviesOther => "Movies/Other",
            Category::MoviesSd => "Movies/SD",
            Category::MoviesHd => "Movies/HD",
            Category::MoviesUhd => "Movies/UHD",
            Category::Movies3d => "Movies/3D",
            Category::MoviesBluRay => "Movies/BluRay",
            Category::MoviesDvd => "Movies/DVD",
            Category::MoviesWebDl => "Movies/WEB-DL",
            Category::Audio => "Audio",
            Category::AudioMp3 => "Audio/MP3",
            Category::AudioVideo => "Audio/Video",
            Category::AudioAudiobook => "Audio/Audiobook",
            Category::AudioLossless => "Audio/Lossless",
            Category::AudioOther => "Audio/Other",
            Category::Pc => "PC",
            Category::Pc0day => "PC/0day",
            Category::PcIso => "PC/ISO",
            Category::PcMac => "PC/Mac",
            Category::PcGames => "PC/Games",
            Category::Tv => "TV",
            Category::TvWebDl => "TV/WEB-DL",
            Category::TvForeign => "TV/Foreign",
            Category::TvSd => "TV/SD",
            Category::TvHd => "TV/HD",
            Category::TvUhd => "TV/UHD",
            Category::TvOther => "TV/Other",
            Category::TvSport => "TV/Sport",
            Category::TvAnime => "TV/Anime",
            Category::TvDocumentary => "TV/Documentary",
            Category::Xxx => "XXX",
            Category::Books => "Books",
            Category::BooksMags => "Books/Mags",
            Category::BooksEbook => "Books/EBook",
            Category::BooksComics => "Books/Comics",
            Category::BooksTechnical => "Books/Technical",
            Category::Other => "Other",
            Category::OtherMisc => "Other/Misc",
        }
    }

    pub fn from_id(id: u32) -> Option<Category> {
        Self::ALL.iter().copied().find(|c| c.id() == id)
    }

    /// Top-level category this one belongs to (itself for top-level ones).
    pub fn parent(self) -> Category {
        Self::from_id(self.id() / 1000 * 1000).unwrap_or(self)
    }

    pub fn is_top_level(self) -> bool {
        self.id() % 1000 == 0
    }

    /// Whether a filter on `self` should include `other`.
    pub fn includes(self, other: Category) -> bool {
        self == other || (self.is_top_level() && other.parent() == self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One site category code and the canonical category it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub code: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
}

impl CategoryMapping {
    pub fn new(code: impl Into<String>, category: Category, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            category,
            description: description.into(),
        }
    }
}

/// Bidirectional translation between site codes and canonical categories.
pub trait CategoryMap: Send + Sync {
    /// Canonical categories for a site code; empty when unknown.
    fn categories_for(&self, site_code: &str) -> Vec<Category>;

    /// Site codes matching a canonical category (parents match their children).
    fn site_codes_for(&self, category: Category) -> Vec<String>;

    /// Canonical categories the site can return.
    fn categories(&self) -> Vec<Category>;
}

/// [`CategoryMap`] backed by a list of mappings.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    mappings: Vec<CategoryMapping>,
}

impl CategoryTable {
    pub fn new(mappings: Vec<CategoryMapping>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[CategoryMapping] {
        &self.mappings
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl CategoryMap for CategoryTable {
    fn categories_for(&self, site_code: &str) -> Vec<Category> {
        let mut out = Vec::new();
        for m in self.mappings.iter().filter(|m| m.code == site_code) {
            if !out.contains(&m.category) {
                out.push(m.category);
            }
        }
        out
    }

    fn site_codes_for(&self, category: Category) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for m in self.mappings.iter().filter(|m| category.includes(m.category)) {
            if !out.contains(&m.code) {
                out.push(m.code.clone());
            }
        }
        out
    }

    fn categories(&self) -> Vec<Category> {
        let mut out = Vec::new();
        for m in &self.mappings {
            if !out.contains(&m.category) {
                out.push(m.category);
            }
        }
        out
    }
}
