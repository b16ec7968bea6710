//! Built-in category table.

use crate::category::{Category, CategoryMapping, CategoryTable};

const DEFAULT_MAPPINGS: &[(&str, Category, &str)] = &[
    ("1", Category::MoviesSd, "Filme SD"),
    ("2", Category::MoviesDvd, "Filme DVD"),
    ("3", Category::MoviesHd, "Filme HD"),
    ("4", Category::MoviesUhd, "Filme 4K"),
    ("5", Category::MoviesBluRay, "Filme Blu-Ray"),
    ("6", Category::Movies3d, "Filme 3D"),
    ("7", Category::TvSd, "Seriale SD"),
    ("8", Category::TvHd, "Seriale HD"),
    ("9", Category::TvUhd, "Seriale 4K"),
    ("10", Category::TvAnime, "Anime"),
    ("11", Category::TvDocumentary, "Documentare"),
    ("12", Category::TvSport, "Sport"),
    ("13", Category::AudioMp3, "Muzica MP3"),
    ("14", Category::AudioLossless, "Muzica FLAC"),
    ("15", Category::AudioVideo, "Videoclipuri"),
    ("16", Category::PcGames, "Jocuri PC"),
    ("17", Category::Console, "Jocuri Console"),
    ("18", Category::Pc0day, "Programe"),
    ("19", Category::PcIso, "Programe ISO"),
    ("20", Category::BooksEbook, "eBooks"),
    ("21", Category::AudioAudiobook, "Audiobooks"),
    ("22", Category::Xxx, "XXX"),
    ("23", Category::OtherMisc, "Diverse"),
];

/// The category table used when the configuration does not override it.
pub fn default_categories() -> CategoryTable {
    CategoryTable::new(
        DEFAULT_MAPPINGS
            .iter()
            .map(|(code, category, description)| CategoryMapping::new(*code, *category, *description))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryMap;

    #[test]
    fn test_default_table_codes_are_unique() {
        let table = default_categories();
        let mut codes: Vec<_> = table.mappings().iter().map(|m| m.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), DEFAULT_MAPPINGS.len());
    }

    #[test]
    fn test_default_table_lookups() {
        let table = default_categories();
        assert_eq!(table.categories_for("3"), vec![Category::MoviesHd]);
        assert_eq!(table.site_codes_for(Category::TvHd), vec!["8".to_string()]);
        assert!(table.categories_for("999").is_empty());
    }
}
