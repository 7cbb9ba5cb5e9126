//! Outbound skill response envelope

use serde::{Deserialize, Serialize};

pub const RESPONSE_VERSION: &str = "1.0";

/// Skill response returned to the voice platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillResponse {
    pub version: String,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    PlainText { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Card {
    Simple { title: String, content: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Directive {
    #[serde(rename = "Display.RenderTemplate")]
    RenderTemplate { template: ListTemplate },
}

/// Horizontal image list (`ListTemplate2`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTemplate {
    #[serde(rename = "type")]
    pub template_type: String,
    pub token: String,
    pub back_button: String,
    pub title: String,
    pub list_items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub token: String,
    pub image: TemplateImage,
    pub text_content: TextContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateImage {
    pub content_description: String,
    pub sources: Vec<ImageSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub url: String,
    pub width_pixels: u32,
    pub height_pixels: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub primary_text: TemplateText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateText {
    #[serde(rename = "type")]
    pub text_type: String,
    pub text: String,
}

impl TemplateText {
    pub fn plain<S: Into<String>>(text: S) -> Self {
        Self {
            text_type: "PlainText".to_string(),
            text: text.into(),
        }
    }
}

impl SkillResponse {
    /// Speech-only response.
    pub fn tell<S: Into<String>>(text: S, should_end_session: bool) -> Self {
        Self {
            version: RESPONSE_VERSION.to_string(),
            response: ResponseBody {
                output_speech: Some(OutputSpeech::PlainText { text: text.into() }),
                should_end_session: Some(should_end_session),
                ..ResponseBody::default()
            },
        }
    }

    /// No speech, no card; the session stays open.
    pub fn empty() -> Self {
        Self {
            version: RESPONSE_VERSION.to_string(),
            response: ResponseBody {
                should_end_session: Some(false),
                ..ResponseBody::default()
            },
        }
    }

    #[must_use]
    pub fn with_card(mut self, card: Card) -> Self {
        self.response.card = Some(card);
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.response.directives.push(directive);
        self
    }

    pub fn speech_text(&self) -> Option<&str> {
        match &self.response.output_speech {
            Some(OutputSpeech::PlainText { text }) => Some(text),
            None => None,
        }
    }

    pub fn ends_session(&self) -> bool {
        self.response.should_end_session.unwrap_or(false)
    }

    /// Items of the first list template, if any.
    pub fn list_items(&self) -> &[ListItem] {
        self.response
            .directives
            .iter()
            .map(|d| match d {
                Directive::RenderTemplate { template } => template.list_items.as_slice(),
            })
            .next()
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tell_serialization() {
        let response = SkillResponse::tell("Arrivederci!", true);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(
            value,
            json!({
                "version": "1.0",
                "response": {
                    "outputSpeech": { "type": "PlainText", "text": "Arrivederci!" },
                    "shouldEndSession": true
                }
            })
        );
    }

    #[test]
    fn test_empty_keeps_session_open() {
        let value = serde_json::to_value(SkillResponse::empty()).unwrap();
        assert_eq!(value["response"], json!({ "shouldEndSession": false }));
    }

    #[test]
    fn test_directive_serialization() {
        let template = ListTemplate {
            template_type: "ListTemplate2".to_string(),
            token: "normal".to_string(),
            back_button: "HIDDEN".to_string(),
            title: "Immagini meteosat".to_string(),
            list_items: vec![ListItem {
                token: "normal-it".to_string(),
                image: TemplateImage {
                    content_description: "Vista Italia".to_string(),
                    sources: vec![ImageSource {
                        url: "https://example.org/it".to_string(),
                        width_pixels: 845,
                        height_pixels: 615,
                    }],
                },
                text_content: TextContent {
                    primary_text: TemplateText::plain("Italia"),
                },
            }],
        };
        let response = SkillResponse::tell("x", false)
            .with_directive(Directive::RenderTemplate { template });
        let value = serde_json::to_value(&response).unwrap();
        let directive = &value["response"]["directives"][0];

        assert_eq!(directive["type"], "Display.RenderTemplate");
        assert_eq!(directive["template"]["type"], "ListTemplate2");
        assert_eq!(directive["template"]["backButton"], "HIDDEN");
        let item = &directive["template"]["listItems"][0];
        assert_eq!(item["image"]["sources"][0]["widthPixels"], 845);
        assert_eq!(item["textContent"]["primaryText"]["type"], "PlainText");
        assert_eq!(response.list_items().len(), 1);
    }
}
