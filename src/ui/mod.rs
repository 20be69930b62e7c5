pub mod grid_text;

pub use grid_text::render_day_grid;
