//! `path_exists` and `run_watch`: a yes/no module per watched thing.

use std::path::Path;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;

pub const PLACEHOLDERS: &[&str] = &["title", "status"];

const DEFAULT_FORMAT: &str = "%title: %status";

fn yes_no<'a>(ctx: &Context<'a>, ok: bool) -> Sample<'a> {
    let format = ctx.option("format", DEFAULT_FORMAT);
    let (template, color) = if ok {
        (format, ColorTag::Good)
    } else {
        (ctx.option("format_down", format), ColorTag::Bad)
    };
    Sample::new(
        template,
        vec![
            ctx.title_placeholder(),
            Placeholder::new("status", if ok { "yes" } else { "no" }),
        ],
    )
    .with_color(color)
}

/// `path` defaults to the title.
pub fn collect_path_exists<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let path = ctx.option("path", ctx.title());
    yes_no(ctx, ctx.system.path_exists(Path::new(path)))
}

/// `pidfile` defaults to the title.
pub fn collect_run_watch<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let pidfile = ctx.option("pidfile", ctx.title());
    yes_no(ctx, ctx.system.process_running(Path::new(pidfile)))
}
