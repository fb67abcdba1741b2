mod renderer;

pub use renderer::{Notice, NoticeLevel, RenderedChart, Selection, TabRenderer, TabView};
