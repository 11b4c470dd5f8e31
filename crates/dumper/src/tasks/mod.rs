mod render;

pub(crate) use render::{RenderTask, RenderUnit, RenderedType};
