use serde::{Deserialize, Serialize};

use super::common::{ExternalUrls, Image, Restrictions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumePoint {
    pub fully_played: bool,
    pub resume_position_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedShow {
    pub id: String,
    pub name: String,
    pub publisher: String,
    pub description: Option<String>,
    pub explicit: Option<bool>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub href: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub media_type: Option<String>,
    pub total_episodes: Option<u32>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub audio_preview_url: Option<String>,
    #[serde(default)]
    pub description: String,
    pub html_description: Option<String>,
    pub duration_ms: u64,
    pub explicit: bool,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub href: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub is_externally_hosted: bool,
    pub is_playable: Option<bool>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
    pub restrictions: Option<Restrictions>,
    pub resume_point: Option<ResumePoint>,
    pub show: Option<SimplifiedShow>,
    pub uri: String,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_decodes_with_nested_show() {
        let episode: Episode = serde_json::from_value(fixtures::episode_json("e1")).unwrap();
        assert_eq!(episode.id, "e1");
        assert_eq!(episode.show.unwrap().name, "Systems Talk");
        assert_eq!(episode.resume_point.unwrap().resume_position_ms, 120000);
    }
}
