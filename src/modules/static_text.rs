use super::{Context, Sample};

pub const PLACEHOLDERS: &[&str] = &["title"];

/// Fixed text; `%title` is the order entry's title.
pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    Sample::new(ctx.option("format", "%title"), vec![ctx.title_placeholder()])
}
