//! roadmap-deck - Excel roadmap to PowerPoint deck converter
//!
//! Reads an Excel workbook with "Objectives" and "Roadmap" sheets and
//! produces a branded .pptx presentation: a title slide, paginated
//! objectives slides, a timeline overview and per-timeline roadmap detail
//! slides.
//!
//! # Example
//!
//! ```no_run
//! use roadmap_deck::compose::generate_presentation;
//! use roadmap_deck::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let output = generate_presentation("roadmap.xlsx".as_ref(), None, &config)?;
//! println!("saved to {}", output.display());
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod layout;
pub mod pptx;
pub mod sheet;

pub use compose::generate_presentation;
pub use config::Config;
pub use error::{DeckError, Result};
