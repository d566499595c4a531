//! Draw detection boxes and labels over images.
//!
//! Object boxes come from normalized vertices scaled to the image size and
//! are filtered by score. Face boxes use absolute vertices and carry an
//! emotion label.

pub mod draw;
pub mod error;
pub mod overlay;
pub mod palette;
pub mod renderer;

pub use draw::{draw_overlay, label_layout, load_font, LabelLayout, LabelStyle};
pub use error::{RenderError, RenderResult};
pub use overlay::{Overlay, OverlayBox, DEFAULT_SCORE_THRESHOLD};
pub use palette::Palette;
pub use renderer::{open_image, save_image, Renderer};
