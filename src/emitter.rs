//! Protocol emitters.
//!
//! One [`Emitter`] per wire protocol, chosen once at startup:
//!
//! - [`TextEmitter`]: the text dialects (term, dzen2, xmobar, lemonbar,
//!   none). One line per cycle, modules joined by the separator.
//! - [`JsonEmitter`]: the i3bar protocol. A `{"version":1}` header, then an
//!   endless JSON array whose elements are one array of blocks per cycle,
//!   each followed by a comma and a newline. The outer array is never closed.
//!
//! Every cycle is assembled completely in memory and written with a single
//! `write_all` followed by a flush, so a reader never sees half a cycle.

use serde::Serialize;
use std::io::Write;

use crate::block::{Align, MinWidth, ModuleOutput};
use crate::error::{BarlineError, Result};
use crate::markup::MarkupMode;
use crate::output::{OutputFormat, ProtocolState};
use crate::separator;

/// Header line of the i3bar protocol.
pub const I3BAR_HEADER: &str = "{\"version\":1}";

const TERM_SAVE_CURSOR_HIDE: &str = "\x1b[s\x1b[?25l";
const TERM_RESTORE_CLEAR_LINE: &str = "\x1b[u\x1b[K";
const TERM_SHOW_CURSOR: &str = "\x1b[?25h";

/// Serializes module outputs for one protocol.
pub trait Emitter {
    /// Write whatever the protocol needs before the first cycle.
    fn begin(&mut self, out: &mut dyn Write) -> Result<()>;

    /// Write one complete cycle.
    fn emit(&mut self, out: &mut dyn Write, outputs: &[ModuleOutput]) -> Result<()>;

    /// Undo terminal state on exit.
    fn end(&mut self, out: &mut dyn Write) -> Result<()>;
}

/// Create the emitter for the configured output format.
pub fn for_state(state: &ProtocolState) -> Box<dyn Emitter> {
    if state.format.is_json() {
        Box::new(JsonEmitter::new(state))
    } else {
        Box::new(TextEmitter::new(state))
    }
}

fn write_unit(out: &mut dyn Write, unit: &[u8]) -> Result<()> {
    out.write_all(unit)
        .and_then(|_| out.flush())
        .map_err(BarlineError::output)
}

/// Line-per-cycle emitter for the text dialects.
pub struct TextEmitter {
    format: OutputFormat,
    separator: String,
}

impl TextEmitter {
    pub fn new(state: &ProtocolState) -> Self {
        Self {
            format: state.format,
            separator: separator::decorated_separator(state),
        }
    }

    /// The line for one cycle, newline included.
    pub fn line(&self, outputs: &[ModuleOutput]) -> String {
        let mut line = String::new();
        if self.format == OutputFormat::Term {
            line.push_str(TERM_RESTORE_CLEAR_LINE);
        }
        line.push_str(&separator::join(
            outputs.iter().map(|o| o.full_text.as_str()),
            &self.separator,
        ));
        line.push('\n');
        line
    }
}

impl Emitter for TextEmitter {
    fn begin(&mut self, out: &mut dyn Write) -> Result<()> {
        if self.format == OutputFormat::Term {
            write_unit(out, TERM_SAVE_CURSOR_HIDE.as_bytes())?;
        }
        Ok(())
    }

    fn emit(&mut self, out: &mut dyn Write, outputs: &[ModuleOutput]) -> Result<()> {
        write_unit(out, self.line(outputs).as_bytes())
    }

    fn end(&mut self, out: &mut dyn Write) -> Result<()> {
        if self.format == OutputFormat::Term {
            write_unit(out, TERM_SHOW_CURSOR.as_bytes())?;
        }
        Ok(())
    }
}

/// One block as it appears on the wire.
#[derive(Debug, Serialize)]
struct JsonBlock<'a> {
    full_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    separator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    separator_block_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_width: Option<&'a MinWidth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    align: Option<Align>,
    markup: MarkupMode,
}

/// Streaming emitter for the i3bar JSON protocol.
pub struct JsonEmitter {
    markup: MarkupMode,
    separator: String,
}

impl JsonEmitter {
    pub fn new(state: &ProtocolState) -> Self {
        Self {
            markup: state.markup,
            separator: state.separator.clone(),
        }
    }

    /// The serialized cycle, trailing comma and newline included.
    pub fn cycle(&self, outputs: &[ModuleOutput]) -> Result<String> {
        let blocks: Vec<JsonBlock<'_>> = outputs
            .iter()
            .map(|output| JsonBlock {
                full_text: &output.full_text,
                color: output.color.as_deref(),
                name: &output.name,
                instance: output.instance.as_deref(),
                separator: separator::json_attribute(output, &self.separator),
                separator_block_width: output.separator_block_width,
                min_width: output.min_width.as_ref(),
                align: output.align,
                markup: self.markup,
            })
            .collect();

        let mut unit = serde_json::to_string(&blocks)?;
        unit.push_str(",\n");
        Ok(unit)
    }
}

impl Emitter for JsonEmitter {
    fn begin(&mut self, out: &mut dyn Write) -> Result<()> {
        write_unit(out, format!("{}\n[\n", I3BAR_HEADER).as_bytes())
    }

    fn emit(&mut self, out: &mut dyn Write, outputs: &[ModuleOutput]) -> Result<()> {
        let unit = self.cycle(outputs)?;
        write_unit(out, unit.as_bytes())
    }

    fn end(&mut self, _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}
