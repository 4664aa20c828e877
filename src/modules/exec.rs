use log::warn;

use super::{Context, Sample};
use crate::color::ColorTag;
use crate::placeholders::Placeholder;

pub const PLACEHOLDERS: &[&str] = &["title", "output", "status"];

const DEFAULT_FORMAT: &str = "%output";
const DEFAULT_FORMAT_ERROR: &str = "%title: error %status";

/// First line of a shell command's output. `%output` is untrusted.
///
/// The command runs synchronously inside the cycle, so it should be quick.
pub fn collect<'a>(ctx: &Context<'a>) -> Sample<'a> {
    let Some(command) = ctx.config.str("command") else {
        warn!("exec {}: no command configured", ctx.title());
        return ctx.failure("no command");
    };

    let (ok, output, status) = match ctx.system.run_command(command) {
        Ok(out) => {
            let first_line = out.stdout.lines().next().unwrap_or_default().to_string();
            let status = out
                .status
                .map(|code| code.to_string())
                .unwrap_or_else(|| "?".to_string());
            (out.success(), first_line, status)
        }
        Err(e) => {
            warn!("exec {}: cannot run \"{}\": {}", ctx.title(), command, e);
            (false, String::new(), "?".to_string())
        }
    };

    let template = if ok {
        ctx.option("format", DEFAULT_FORMAT)
    } else {
        ctx.option("format_error", DEFAULT_FORMAT_ERROR)
    };
    Sample::new(
        template,
        vec![
            ctx.title_placeholder(),
            Placeholder::untrusted("output", output),
            Placeholder::new("status", status),
        ],
    )
    .with_color_if(!ok, ColorTag::Bad)
}
