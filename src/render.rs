//! Render-time view of a display entry.
//!
//! Turns a message into a flat list of segments the UI can lay out: prose,
//! fenced code blocks and images. Images are the segments the UI may offer to
//! mint.

use crate::types::{ChatMessage, Content, ContentPart, MessageKind};

const FENCE: &str = "```";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Code { language: String, code: String },
    Image { source: String },
}

impl Segment {
    /// Source handed to the mint hook for image segments.
    pub fn image_source(&self) -> Option<&str> {
        match self {
            Segment::Image { source } => Some(source),
            _ => None,
        }
    }
}

/// Whether a string-content entry should be shown as an image.
pub fn is_image_entry(message: &ChatMessage) -> bool {
    match &message.content {
        Content::Text(text) => message.kind == Some(MessageKind::Image) || text.starts_with('/'),
        Content::Parts(_) => false,
    }
}

pub fn render_message(message: &ChatMessage) -> Vec<Segment> {
    match &message.content {
        Content::Parts(parts) => parts
            .iter()
            .flat_map(|part| match part {
                ContentPart::Text { text } => split_fenced(text),
                ContentPart::ImageUrl { image_url } => vec![Segment::Image {
                    source: image_url.url.clone(),
                }],
            })
            .collect(),
        Content::Text(text) if is_image_entry(message) => vec![Segment::Image {
            source: text.clone(),
        }],
        Content::Text(text) => split_fenced(text),
    }
}

/// Split prose on ``` fences. Odd pieces are code; the first line of a code
/// piece names its language.
pub fn split_fenced(text: &str) -> Vec<Segment> {
    text.split(FENCE)
        .enumerate()
        .filter_map(|(index, piece)| {
            let piece = piece.trim();
            if index % 2 == 0 {
                return (!piece.is_empty()).then(|| Segment::Text(piece.to_string()));
            }
            let (language, code) = piece.split_once('\n').unwrap_or((piece, ""));
            Some(Segment::Code {
                language: language.trim().to_string(),
                code: code.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_code_fences() {
        let segments = split_fenced("Here you go:\n```rust\nfn main() {}\n```\nDone.");
        assert_eq!(
            segments,
            vec![
                Segment::Text("Here you go:".into()),
                Segment::Code {
                    language: "rust".into(),
                    code: "fn main() {}".into()
                },
                Segment::Text("Done.".into()),
            ]
        );
    }

    #[test]
    fn fence_without_body_has_empty_code() {
        assert_eq!(
            split_fenced("```json```"),
            vec![Segment::Code {
                language: "json".into(),
                code: String::new()
            }]
        );
    }

    #[test]
    fn path_content_renders_as_image() {
        let msg = ChatMessage::assistant("/img/result.png", MessageKind::Text);
        assert_eq!(
            render_message(&msg),
            vec![Segment::Image {
                source: "/img/result.png".into()
            }]
        );
    }

    #[test]
    fn image_kind_renders_as_image() {
        let msg = ChatMessage::assistant("https://cdn/x.png", MessageKind::Image);
        assert_eq!(
            render_message(&msg)[0].image_source(),
            Some("https://cdn/x.png")
        );
    }

    #[test]
    fn parts_render_in_order() {
        let msg = ChatMessage::user(vec![
            ContentPart::text("caption"),
            ContentPart::image("data:image/png;base64,AA=="),
        ]);
        let segments = render_message(&msg);
        assert_eq!(segments[0], Segment::Text("caption".into()));
        assert_eq!(segments[1].image_source(), Some("data:image/png;base64,AA=="));
    }
}
