//! Record builders
//!
//! Rendering a record always runs the same sequence of steps; the text and
//! JSON builders differ only in how each step writes into the buffer.

mod base;
pub mod json;
pub mod text;

use crate::core::attr::Attr;
use crate::core::error::Result;
use crate::core::handler::FormatHandler;
use crate::core::output_format::OutputFormat;
use crate::core::pool::{Buffer, Pooled};
use crate::core::record::Record;
use json::{JsonBuilder, JsonEncoder};
use text::{TextBuilder, TextEncoder};

/// One rendering pass over a record.
///
/// The buffer and group tracker a builder holds go back to their pools when
/// it is dropped, whether or not rendering finished.
pub(crate) trait RecordBuilder<'a> {
    fn start(&mut self) -> Result<()>;
    fn append_time(&mut self) -> Result<()>;
    fn append_level(&mut self) -> Result<()>;
    fn append_caller(&mut self) -> Result<()>;
    fn append_prefix(&mut self) -> Result<()>;
    fn append_message(&mut self) -> Result<()>;
    fn append_attrs(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    /// Terminate the line and hand back the finished buffer
    fn output(self) -> Result<Pooled<'a, Buffer>>;
}

fn render<'a, B: RecordBuilder<'a>>(mut builder: B) -> Result<Pooled<'a, Buffer>> {
    builder.start()?;
    builder.append_time()?;
    builder.append_level()?;
    builder.append_caller()?;
    builder.append_prefix()?;
    builder.append_message()?;
    builder.append_attrs()?;
    builder.close()?;
    builder.output()
}

/// Render `record` into a pooled buffer
pub(crate) fn build_record<'a>(handler: &'a FormatHandler, record: &'a Record) -> Result<Pooled<'a, Buffer>> {
    let buf = handler.shared.pools.buffers.acquire();
    match handler.config.format {
        OutputFormat::Text => render(TextBuilder::new(handler, record, buf)),
        OutputFormat::Json => render(JsonBuilder::new(handler, record, buf)),
    }
}

/// Render `attrs` after the handler's existing pre-rendered attributes.
///
/// Returns `None` when none of `attrs` produces output. For JSON, groups
/// bound since the last call are opened first and left open.
pub(crate) fn preformat_attrs(handler: &FormatHandler, attrs: &[Attr]) -> Result<Option<Vec<u8>>> {
    let mut buf = handler.shared.pools.buffers.acquire();
    buf.write_bytes(&handler.preformatted);

    let rendered = match handler.config.format {
        OutputFormat::Text => {
            let mut enc = TextEncoder::new(handler, buf);
            enc.append_attrs(attrs).then(|| enc.base.buf.as_bytes().to_vec())
        }
        OutputFormat::Json => {
            let mut enc = JsonEncoder::new(handler, buf);
            for name in &handler.groups[handler.n_open_groups..] {
                enc.open_group(name)?;
            }
            enc.append_attrs(attrs)?
                .then(|| enc.base.buf.as_bytes().to_vec())
        }
    };
    Ok(rendered)
}
