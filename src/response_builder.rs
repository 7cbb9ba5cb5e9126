//! Turns a routed action into the response envelope.

use crate::models::response::{
    ImageSource, ListItem, ListTemplate, TemplateImage, TemplateText, TextContent,
};
use crate::models::{Card, Directive, SkillResponse};
use crate::regions::{self, Region};
use crate::router::{ResponseAction, ScrollDirection};
use crate::view_mode::ViewMode;

pub const IMAGE_WIDTH: u32 = 845;
pub const IMAGE_HEIGHT: u32 = 615;
pub const LIST_TITLE: &str = "Immagini meteosat";

pub const DISPLAY_REQUIRED_TEXT: &str =
    "Mi spiace, questa skill é supportata solo da dispositivi muniti di schermo.";
pub const HELP_TITLE: &str = "Aiuto";
pub const HELP_TEXT: &str = "Puoi dire 'normale' per la visione diurna, 'infrarosso' per le immagini all'infrarosso, 'pioggia' per il radar delle precipitazioni oppure 'neve' per la copertura nevosa.";
pub const GOODBYE_TEXT: &str = "Arrivederci!";
pub const SCROLL_FORWARD_TEXT: &str =
    "Fai scorrere lo schermo verso sinistra per l'immagine successiva";
pub const SCROLL_BACKWARD_TEXT: &str =
    "Fai scorrere lo schermo verso destra per l'immagine precedente";

/// One captioned satellite image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub caption: &'static str,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl ImageItem {
    pub fn new(mode: ViewMode, region: &Region) -> Self {
        Self {
            caption: region.name,
            url: mode.image_url(region),
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
        }
    }

    fn into_list_item(self, token: String) -> ListItem {
        ListItem {
            token,
            image: TemplateImage {
                content_description: format!("Vista {}", self.caption),
                sources: vec![ImageSource {
                    url: self.url,
                    width_pixels: self.width,
                    height_pixels: self.height,
                }],
            },
            text_content: TextContent {
                primary_text: TemplateText::plain(self.caption),
            },
        }
    }
}

pub fn build(action: ResponseAction) -> SkillResponse {
    match action {
        ResponseAction::DisplayRequired => SkillResponse::tell(DISPLAY_REQUIRED_TEXT, true),
        ResponseAction::ShowImages(mode) => show_images(mode),
        ResponseAction::Help => SkillResponse::tell(HELP_TEXT, false).with_card(Card::Simple {
            title: HELP_TITLE.to_string(),
            content: HELP_TEXT.to_string(),
        }),
        ResponseAction::Goodbye => SkillResponse::tell(GOODBYE_TEXT, true),
        ResponseAction::Scroll(ScrollDirection::Forward) => {
            SkillResponse::tell(SCROLL_FORWARD_TEXT, false)
        }
        ResponseAction::Scroll(ScrollDirection::Backward) => {
            SkillResponse::tell(SCROLL_BACKWARD_TEXT, false)
        }
        ResponseAction::Unrecognized => SkillResponse::empty(),
    }
}

fn show_images(mode: ViewMode) -> SkillResponse {
    let list_items = regions::all()
        .map(|region| {
            let token = format!("{mode}-{}", region.code.to_lowercase());
            ImageItem::new(mode, region).into_list_item(token)
        })
        .collect();

    let template = ListTemplate {
        template_type: "ListTemplate2".to_string(),
        token: mode.to_string(),
        back_button: "HIDDEN".to_string(),
        title: LIST_TITLE.to_string(),
        list_items,
    };

    SkillResponse::tell(mode.phrase(), false).with_directive(Directive::RenderTemplate { template })
}
