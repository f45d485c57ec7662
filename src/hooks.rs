//! Boundaries to collaborators that live outside the engine.
//!
//! Minting and file saving are supplied by the surrounding application;
//! the engine only hands them data.

use crate::render::Segment;
use async_trait::async_trait;

/// Mints an NFT from a generated image (inline base64 data or a URL).
#[async_trait]
pub trait ImageMinter: Send + Sync {
    /// Returns a link to the minted asset.
    async fn mint_from_image(&self, image: &str) -> anyhow::Result<String>;
}

/// Persists an exported document, typically behind a save dialog.
#[async_trait]
pub trait ProofSink: Send + Sync {
    async fn save(&self, suggested_name: &str, document: &str) -> anyhow::Result<()>;
}

/// Mint the image behind a rendered segment. Non-image segments yield `None`.
pub async fn mint_segment(
    minter: &dyn ImageMinter,
    segment: &Segment,
) -> Option<anyhow::Result<String>> {
    let source = segment.image_source()?;
    Some(minter.mint_from_image(source).await)
}
