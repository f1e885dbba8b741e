// Library exports for notewidget

pub mod config;
pub mod inline;
pub mod links;
pub mod note;
pub mod pager;
pub mod render;
pub mod segments;
pub mod style;
pub mod terminal;
pub mod theme;

pub use render::{RenderOptions, render, render_line, render_mapped};
pub use segments::{DisplayRow, render_paragraphs, split_paragraphs, split_rows};
pub use style::{Attr, Color, StyledBuffer, StyledRun};
