use serde::Deserialize;

/// One catalog item: a name plus the address of its detail record.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
}

impl CatalogEntry {
    /// Pokédex id taken from the entry address, e.g. `.../pokemon/25/` -> `25`.
    pub fn id(&self) -> Option<&str> {
        thumbnail_id(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDetail {
    pub name: String,
    pub primary_image_url: String,
    pub types: Vec<String>,
    pub height_decimeters: u32,
    pub weight_decigrams: u32,
    pub abilities: Vec<String>,
    pub base_experience: u32,
    pub stats: Vec<Stat>,
}

impl EntryDetail {
    pub fn height_display(&self) -> String {
        format!("{} m", tenths(self.height_decimeters))
    }

    pub fn weight_display(&self) -> String {
        format!("{} kg", tenths(self.weight_decigrams))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub name: String,
    pub value: u32,
}

/// Where the list view sends the user when an entry is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub address: String,
    pub display_name: String,
}

impl From<&CatalogEntry> for NavigationTarget {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            address: entry.url.clone(),
            display_name: entry.name.clone(),
        }
    }
}

/// Second-to-last `/`-delimited segment of `url`.
///
/// Catalog addresses end with a slash, so for `.../pokemon/25/` this is `25`.
/// The shape is not validated: an address without a trailing slash yields
/// the wrong segment.
pub fn thumbnail_id(url: &str) -> Option<&str> {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 2 {
        return None;
    }
    Some(parts[parts.len() - 2])
}

/// Sprite address for an entry id on the sprite host.
pub fn thumbnail_url(sprite_host: &str, id: &str) -> String {
    format!(
        "{}/sprites/pokemon/{}.png",
        sprite_host.trim_end_matches('/'),
        id
    )
}

/// Render an integer count of tenths as a decimal, dropping a `.0` suffix.
fn tenths(v: u32) -> String {
    if v % 10 == 0 {
        (v / 10).to_string()
    } else {
        format!("{}.{}", v / 10, v % 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(height: u32, weight: u32) -> EntryDetail {
        EntryDetail {
            name: "pikachu".to_string(),
            primary_image_url: String::new(),
            types: vec![],
            height_decimeters: height,
            weight_decigrams: weight,
            abilities: vec![],
            base_experience: 0,
            stats: vec![],
        }
    }

    #[test]
    fn test_thumbnail_id_from_entry_url() {
        assert_eq!(
            thumbnail_id("https://pokeapi.co/api/v2/pokemon/25/"),
            Some("25")
        );
        assert_eq!(
            thumbnail_id("https://pokeapi.co/api/v2/pokemon/1/"),
            Some("1")
        );
    }

    #[test]
    fn test_thumbnail_id_without_trailing_slash_is_not_validated() {
        // no trailing slash: the derivation silently picks the collection segment
        assert_eq!(
            thumbnail_id("https://pokeapi.co/api/v2/pokemon/25"),
            Some("pokemon")
        );
        assert_eq!(thumbnail_id("25"), None);
    }

    #[test]
    fn test_thumbnail_url() {
        let host = "https://raw.githubusercontent.com/PokeAPI/sprites/master/";
        assert_eq!(
            thumbnail_url(host, "25"),
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/25.png"
        );
    }

    #[test]
    fn test_height_and_weight_display() {
        let d = detail(100, 69);
        assert_eq!(d.height_display(), "10 m");
        assert_eq!(d.weight_display(), "6.9 kg");

        let d = detail(4, 60);
        assert_eq!(d.height_display(), "0.4 m");
        assert_eq!(d.weight_display(), "6 kg");
    }

    #[test]
    fn test_navigation_target_from_entry() {
        let entry = CatalogEntry {
            name: "pikachu".to_string(),
            url: "https://pokeapi.co/api/v2/pokemon/25/".to_string(),
        };
        let target = NavigationTarget::from(&entry);
        assert_eq!(target.address, entry.url);
        assert_eq!(target.display_name, "pikachu");
        assert_eq!(entry.id(), Some("25"));
    }
}
