//! Text rendering
//!
//! A line is made of space separated sections followed by ` key=value`
//! attributes:
//!
//! ```text
//! 3:04PM INFO <server::accept:42> [api]: Request processed request.id=7 status=200
//! ```
//!
//! Group nesting is flattened into dotted keys. The dotted prefix lives in a
//! pooled buffer that grows by `name.` when a group is entered and shrinks by
//! exactly that many bytes when it is left.

use super::base::BaseBuilder;
use super::RecordBuilder;
use crate::core::attr::{Attr, Value};
use crate::core::error::Result;
use crate::core::format::append_text_value;
use crate::core::handler::FormatHandler;
use crate::core::log_level::Level;
use crate::core::pool::{Buffer, Pooled};
use crate::core::quoting::{needs_quoting, quote};
use crate::core::record::Record;
use crate::core::theme::ThemeRole;

const SECTION_SEP: u8 = b' ';
const ATTR_SEP: u8 = b' ';
const KEY_VALUE_SEP: u8 = b'=';
const GROUP_KEY_SEP: u8 = b'.';

/// Flattens attributes into ` key=value` pairs
pub(crate) struct TextEncoder<'a> {
    pub(crate) base: BaseBuilder<'a>,
    group_prefix: Pooled<'a, Buffer>,
}

impl<'a> TextEncoder<'a> {
    pub(crate) fn new(handler: &'a FormatHandler, buf: Pooled<'a, Buffer>) -> Self {
        let mut group_prefix = handler.shared.pools.buffers.acquire();
        for name in &handler.groups {
            group_prefix.write_str(name);
            group_prefix.write_byte(GROUP_KEY_SEP);
        }
        Self {
            base: BaseBuilder::new(handler, buf),
            group_prefix,
        }
    }

    /// Append every attribute, returning whether any pair was written.
    pub(crate) fn append_attrs(&mut self, attrs: &[Attr]) -> bool {
        let mut wrote = false;
        for attr in attrs {
            wrote |= self.append_attr(attr);
        }
        wrote
    }

    fn append_attr(&mut self, attr: &Attr) -> bool {
        let attr = self.base.resolve(attr);
        if attr.is_empty() {
            return false;
        }

        if let Value::Group(members) = &attr.value {
            if members.is_empty() {
                return false;
            }
            if attr.key.is_empty() {
                return self.append_attrs(members);
            }

            self.group_prefix.write_str(&attr.key);
            self.group_prefix.write_byte(GROUP_KEY_SEP);
            self.base.push_group(&attr.key);

            let wrote = self.append_attrs(members);

            self.base.pop_group();
            let len = self.group_prefix.len() - (attr.key.len() + 1);
            self.group_prefix.truncate(len);
            return wrote;
        }

        self.base.buf.write_byte(ATTR_SEP);
        self.write_key(&attr.key);
        self.base.buf.write_byte(KEY_VALUE_SEP);
        append_text_value(&mut self.base.buf, &attr.value);
        true
    }

    fn write_key(&mut self, key: &str) {
        let themed = self.base.begin_theme(ThemeRole::Key);
        self.base.buf.write_bytes(self.group_prefix.as_bytes());
        if !key.is_empty() && needs_quoting(key) {
            self.base.buf.write_str(&quote(key));
        } else {
            self.base.buf.write_str(key);
        }
        self.base.end_theme(themed);
    }
}

pub(crate) struct TextBuilder<'a> {
    enc: TextEncoder<'a>,
    record: &'a Record,
}

impl<'a> TextBuilder<'a> {
    pub(crate) fn new(handler: &'a FormatHandler, record: &'a Record, buf: Pooled<'a, Buffer>) -> Self {
        Self {
            enc: TextEncoder::new(handler, buf),
            record,
        }
    }

    fn section_sep(&mut self) {
        if !self.enc.base.buf.is_empty() {
            self.enc.base.buf.write_byte(SECTION_SEP);
        }
    }
}

impl<'a> RecordBuilder<'a> for TextBuilder<'a> {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn append_time(&mut self) -> Result<()> {
        if let Some(time) = self.record.time {
            let formatted = self.enc.base.handler.config.time_format.format(&time);
            self.enc.base.paint(ThemeRole::Time, &formatted);
        }
        Ok(())
    }

    fn append_level(&mut self) -> Result<()> {
        self.section_sep();
        let handler = self.enc.base.handler;
        let level = self.record.level;
        match handler.config.level_names.get(&level) {
            Some(name) => {
                let label = format!("{:<4.4}", name);
                match handler.custom_level_theme() {
                    Some(theme) => theme.render_into(&mut self.enc.base.buf, &label),
                    None => self.enc.base.buf.write_str(&label),
                }
            }
            None => self.enc.base.paint(level_role(level), level.label()),
        }
        Ok(())
    }

    fn append_caller(&mut self) -> Result<()> {
        let handler = self.enc.base.handler;
        if let Some(caller) = handler.caller_label(self.record) {
            self.section_sep();
            self.enc.base.paint(ThemeRole::Caller, &caller);
        }
        Ok(())
    }

    fn append_prefix(&mut self) -> Result<()> {
        let handler = self.enc.base.handler;
        if !handler.prefix.is_empty() {
            self.section_sep();
            let section = format!("[{}]:", handler.prefix);
            self.enc.base.paint(ThemeRole::Prefix, &section);
        }
        Ok(())
    }

    fn append_message(&mut self) -> Result<()> {
        if !self.record.message.is_empty() {
            self.section_sep();
            self.enc.base.buf.write_str(&self.record.message);
        }
        Ok(())
    }

    fn append_attrs(&mut self) -> Result<()> {
        let handler = self.enc.base.handler;
        self.enc.base.buf.write_bytes(&handler.preformatted);
        self.enc.append_attrs(&self.record.attrs);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn output(mut self) -> Result<Pooled<'a, Buffer>> {
        self.enc.base.buf.write_byte(b'\n');
        Ok(self.enc.base.buf)
    }
}

pub(crate) fn level_role(level: Level) -> ThemeRole {
    match level.category() {
        Level::DEBUG => ThemeRole::Debug,
        Level::INFO => ThemeRole::Info,
        Level::WARN => ThemeRole::Warn,
        _ => ThemeRole::Error,
    }
}
