use std::fmt::Display;

use crate::regions::Region;

const IMAGERY_BASE_URL: &str = "https://api.sat24.com/mostrecent";

/// Imagery presentation style requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Normal,
    Infrared,
    Rain,
    Snow,
}

impl ViewMode {
    pub const fn all() -> &'static [ViewMode] {
        &[
            ViewMode::Normal,
            ViewMode::Infrared,
            ViewMode::Rain,
            ViewMode::Snow,
        ]
    }

    /// Intent name that selects this mode.
    pub fn intent_name(&self) -> &'static str {
        match self {
            ViewMode::Normal => "normal",
            ViewMode::Infrared => "infrared",
            ViewMode::Rain => "rain",
            ViewMode::Snow => "snow",
        }
    }

    pub fn from_intent_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|mode| mode.intent_name() == name)
    }

    /// Provider path segment for this mode's imagery.
    pub fn endpoint_segment(&self) -> &'static str {
        match self {
            ViewMode::Normal => "visual5hdcomplete",
            ViewMode::Infrared => "infraPolair",
            ViewMode::Rain => "rainTMC",
            ViewMode::Snow => "snow",
        }
    }

    pub fn image_url(&self, region: &Region) -> String {
        format!(
            "{IMAGERY_BASE_URL}/{}/{}",
            region.code,
            self.endpoint_segment()
        )
    }

    /// Introductory sentence spoken before the images are shown.
    pub fn phrase(&self) -> &'static str {
        match self {
            ViewMode::Normal => "Ecco le ultime immagini dal satellite meteosàt",
            ViewMode::Infrared => "Ecco le ultime immagini all' infraross dal satellite meteosàt",
            ViewMode::Rain => "Ecco le ultime immagini del radar pioggia dal satellite meteosàt",
            ViewMode::Snow => {
                "Ecco le ultime immagini della copertura nevosa dal satellite meteosàt"
            }
        }
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.intent_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::REGIONS;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("normal", Some(ViewMode::Normal))]
    #[case("infrared", Some(ViewMode::Infrared))]
    #[case("rain", Some(ViewMode::Rain))]
    #[case("snow", Some(ViewMode::Snow))]
    #[case("Snow", None)]
    #[case("AMAZON.HelpIntent", None)]
    fn test_from_intent_name(#[case] name: &str, #[case] expected: Option<ViewMode>) {
        assert_eq!(ViewMode::from_intent_name(name), expected);
    }

    #[rstest]
    #[case(ViewMode::Normal, "https://api.sat24.com/mostrecent/IT/visual5hdcomplete")]
    #[case(ViewMode::Infrared, "https://api.sat24.com/mostrecent/IT/infraPolair")]
    #[case(ViewMode::Rain, "https://api.sat24.com/mostrecent/IT/rainTMC")]
    #[case(ViewMode::Snow, "https://api.sat24.com/mostrecent/IT/snow")]
    fn test_image_url(#[case] mode: ViewMode, #[case] expected: &str) {
        assert_eq!(mode.image_url(&REGIONS[0]), expected);
    }

    #[test]
    fn test_phrases_and_segments_are_distinct() {
        let phrases: HashSet<_> = ViewMode::all().iter().map(ViewMode::phrase).collect();
        let segments: HashSet<_> = ViewMode::all()
            .iter()
            .map(ViewMode::endpoint_segment)
            .collect();
        assert_eq!(phrases.len(), 4);
        assert_eq!(segments.len(), 4);
    }

    #[test]
    fn test_every_phrase_shares_the_normal_prefix() {
        for mode in ViewMode::all() {
            assert!(mode.phrase().starts_with("Ecco le ultime immagini"));
        }
    }
}
