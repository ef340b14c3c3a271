//! Turns raw form input into a validated [`GenerationRequest`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::types::GenerationPayload;

/// Who writes the slide text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    #[default]
    Ai,
    Manual,
}

impl ContentMode {
    pub fn toggle(self) -> Self {
        match self {
            ContentMode::Ai => ContentMode::Manual,
            ContentMode::Manual => ContentMode::Ai,
        }
    }
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentMode::Ai => f.write_str("Use AI"),
            ContentMode::Manual => f.write_str("Enter content manually"),
        }
    }
}

/// Illustration style requested for AI-authored decks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    #[default]
    Realistic,
    Anime,
    StudioGhibli,
}

impl ImageStyle {
    pub const ALL: [ImageStyle; 3] = [
        ImageStyle::Realistic,
        ImageStyle::Anime,
        ImageStyle::StudioGhibli,
    ];

    /// Value sent as `image_style` on the wire.
    pub fn as_wire(self) -> &'static str {
        match self {
            ImageStyle::Realistic => "realistic",
            ImageStyle::Anime => "anime",
            ImageStyle::StudioGhibli => "studio_ghibli",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ImageStyle::Realistic => ImageStyle::Anime,
            ImageStyle::Anime => ImageStyle::StudioGhibli,
            ImageStyle::StudioGhibli => ImageStyle::Realistic,
        }
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageStyle::Realistic => f.write_str("Realistic"),
            ImageStyle::Anime => f.write_str("Anime"),
            ImageStyle::StudioGhibli => f.write_str("Studio Ghibli"),
        }
    }
}

impl FromStr for ImageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        ImageStyle::ALL
            .into_iter()
            .find(|style| style.as_wire() == normalized)
            .ok_or_else(|| {
                format!("unknown image style '{s}' (expected realistic, anime or studio_ghibli)")
            })
    }
}

/// Required text fields checked for emptiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Author,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Title => f.write_str("title"),
            FormField::Author => f.write_str("author"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The {field} must not be empty")]
    EmptyField { field: FormField },

    #[error("Number of slides must be a positive whole number, got '{input}'")]
    InvalidSlideCount { input: String },

    #[error("A description is required when entering content manually")]
    MissingDescription,
}

/// Raw form state exactly as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub title: String,
    pub author: String,
    pub num_slides: String,
    pub content_mode: ContentMode,
    pub description: String,
    pub image_style: Option<ImageStyle>,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            num_slides: "5".to_string(),
            content_mode: ContentMode::Ai,
            description: String::new(),
            image_style: None,
        }
    }
}

/// Where the slide text comes from. Only the manual variant carries text,
/// so an AI request can never smuggle a description along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideContent {
    Ai { image_style: ImageStyle },
    Manual { description: String },
}

/// A canonical request, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    title: String,
    author: String,
    slide_count: u32,
    content: SlideContent,
}

impl GenerationRequest {
    /// Validate and normalise form input. Pure; performs no I/O.
    pub fn build(fields: &FormFields) -> Result<Self, ValidationError> {
        let title = required(&fields.title, FormField::Title)?;
        let author = required(&fields.author, FormField::Author)?;
        let slide_count = parse_slide_count(&fields.num_slides)?;

        let content = match fields.content_mode {
            ContentMode::Ai => SlideContent::Ai {
                image_style: fields.image_style.unwrap_or_default(),
            },
            ContentMode::Manual => {
                let description = fields.description.trim();
                if description.is_empty() {
                    return Err(ValidationError::MissingDescription);
                }
                SlideContent::Manual {
                    description: description.to_string(),
                }
            }
        };

        Ok(Self {
            title,
            author,
            slide_count,
            content,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn slide_count(&self) -> u32 {
        self.slide_count
    }

    pub fn content_mode(&self) -> ContentMode {
        match self.content {
            SlideContent::Ai { .. } => ContentMode::Ai,
            SlideContent::Manual { .. } => ContentMode::Manual,
        }
    }

    /// Always empty for AI-authored requests.
    pub fn description(&self) -> &str {
        match &self.content {
            SlideContent::Ai { .. } => "",
            SlideContent::Manual { description } => description,
        }
    }

    pub fn image_style(&self) -> Option<ImageStyle> {
        match self.content {
            SlideContent::Ai { image_style } => Some(image_style),
            SlideContent::Manual { .. } => None,
        }
    }

    pub fn to_payload(&self) -> GenerationPayload {
        GenerationPayload {
            title: self.title.clone(),
            author: self.author.clone(),
            num_slides: self.slide_count,
            description: self.description().to_string(),
            use_ai: self.content_mode() == ContentMode::Ai,
            image_style: self.image_style().map(|style| style.as_wire().to_string()),
        }
    }
}

fn required(value: &str, field: FormField) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

fn parse_slide_count(input: &str) -> Result<u32, ValidationError> {
    match input.trim().parse::<u32>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(ValidationError::InvalidSlideCount {
            input: input.to_string(),
        }),
    }
}
