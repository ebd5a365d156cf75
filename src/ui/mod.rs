//! The upload-detect-analyze flow, for the browser page and the terminal.

mod orchestrator;
mod page;
mod render;
pub mod state;

pub use orchestrator::{AcneApi, ClientError, HttpApi, Orchestrator, sniff_image_type};
pub use page::index;
pub use render::{Page, render};
pub use state::{Phase, SelectedImage, UiEvent, UiState};
