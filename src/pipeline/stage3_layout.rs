use std::path::PathBuf;

use thiserror::Error;

use crate::input::Narrative;
use crate::model::{ScoreRecord, Trait, TraitMap};
use crate::report::format_score;
use crate::report::layout::{Block, Page, Rect, ReportLayout};
use crate::report::pdf::{CELL_MARGIN_MM, FONT_SIZE, PdfError};
use crate::report::text::{unmappable_chars, wrap_text};
use crate::scratch::ArtifactSet;

pub const TEXT_X_MM: f64 = 25.4;
pub const TEXT_WIDTH_MM: f64 = 159.2;
pub const LINE_HEIGHT_MM: f64 = 6.0;
pub const SALUTATION_Y_MM: f64 = 25.4;
pub const SALUTATION_HEIGHT_MM: f64 = 8.0;
pub const NARRATIVE_Y_MM: f64 = 35.4;

pub const IMAGE_X_MM: f64 = 12.0;
pub const IMAGE_WIDTH_MM: f64 = 177.8;
pub const IMAGE_HEIGHT_MM: f64 = 101.6;
/// Image top relative to its block's heading.
pub const IMAGE_OFFSET_MM: f64 = 13.0;

/// Trait blocks per page with the y anchor of each block's heading.
pub const PAGE_PLAN: [&[(Trait, f64)]; 3] = [
    &[(Trait::Extraversion, 121.4)],
    &[(Trait::Agreeableness, 25.4), (Trait::Conscientiousness, 144.4)],
    &[(Trait::Neuroticism, 25.4), (Trait::Openness, 144.4)],
];

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("missing {trait_name} distribution image for {name}")]
    MissingArtifact {
        name: String,
        trait_name: &'static str,
    },
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub record: &'a ScoreRecord,
    pub percentiles: &'a TraitMap<f64>,
    pub artifacts: &'a ArtifactSet,
    pub narrative: &'a Narrative,
}

pub fn opening_blocks(name: &str, narrative: &Narrative) -> Vec<Block> {
    vec![
        Block::Text {
            at: Rect::new(TEXT_X_MM, SALUTATION_Y_MM, TEXT_WIDTH_MM, SALUTATION_HEIGHT_MM),
            text: format!("Dear {name},"),
        },
        Block::Text {
            at: Rect::new(TEXT_X_MM, NARRATIVE_Y_MM, TEXT_WIDTH_MM, LINE_HEIGHT_MM),
            text: narrative.text().to_string(),
        },
    ]
}

/// Heading, score line, percentile line and image for one trait, all placed
/// relative to `anchor_y`.
pub fn trait_block(
    t: Trait,
    anchor_y: f64,
    score: f64,
    percentile: f64,
    image: PathBuf,
) -> Vec<Block> {
    let line = |row: f64| Rect::new(TEXT_X_MM, anchor_y + row * LINE_HEIGHT_MM, TEXT_WIDTH_MM, LINE_HEIGHT_MM);
    vec![
        Block::Heading {
            at: line(0.0),
            text: format!("{}:", t.name()),
        },
        Block::Text {
            at: line(1.0),
            text: format!("Your score for {}: {}", t.lower_name(), format_score(score)),
        },
        Block::Text {
            at: line(2.0),
            text: format!(
                "Your percentile among students for {}: {}",
                t.lower_name(),
                format_score(percentile)
            ),
        },
        Block::Image {
            at: Rect::new(
                IMAGE_X_MM,
                anchor_y + IMAGE_OFFSET_MM,
                IMAGE_WIDTH_MM,
                IMAGE_HEIGHT_MM,
            ),
            path: image,
        },
    ]
}

/// True when the wrapped narrative runs into the first trait block.
pub fn narrative_overflows(narrative: &Narrative) -> bool {
    let lines = wrap_text(narrative.text(), TEXT_WIDTH_MM - 2.0 * CELL_MARGIN_MM, FONT_SIZE);
    let bottom = NARRATIVE_Y_MM + lines.len() as f64 * LINE_HEIGHT_MM;
    bottom > PAGE_PLAN[0][0].1
}

/// Builds the three-page layout for one individual. Every trait must have its
/// artifact; a gap is an error rather than an omitted block.
pub fn compose_report(input: &ReportInput<'_>) -> Result<ReportLayout, ComposeError> {
    let mut pages = Vec::with_capacity(PAGE_PLAN.len());
    for (page_no, plan) in PAGE_PLAN.iter().enumerate() {
        let mut blocks = Vec::new();
        if page_no == 0 {
            blocks.extend(opening_blocks(&input.record.name, input.narrative));
        }
        for &(t, anchor_y) in plan.iter() {
            let image = input
                .artifacts
                .get(t)
                .ok_or_else(|| ComposeError::MissingArtifact {
                    name: input.record.name.clone(),
                    trait_name: t.name(),
                })?;
            blocks.extend(trait_block(
                t,
                anchor_y,
                input.record.raw[t],
                input.percentiles[t],
                image.to_path_buf(),
            ));
        }
        pages.push(Page { blocks });
    }
    let layout = ReportLayout { pages };

    let lost = layout_unmappable(&layout);
    if !lost.is_empty() {
        let chars: String = lost.iter().collect();
        tracing::warn!(
            name = %input.record.name,
            chars = %chars,
            "characters outside the report font's encoding will print as '?'"
        );
    }
    Ok(layout)
}

/// Characters in any text block that the report fonts cannot encode.
pub fn layout_unmappable(layout: &ReportLayout) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();
    for block in layout.pages.iter().flat_map(|p| &p.blocks) {
        if let Block::Heading { text, .. } | Block::Text { text, .. } = block {
            for c in unmappable_chars(text) {
                if !out.contains(&c) {
                    out.push(c);
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_layout.rs"]
mod tests;
