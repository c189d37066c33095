//! JSON rendering
//!
//! Records become one object per line. Groups become nested objects, and a
//! group that ends up with no members is rolled back so it never appears as
//! `{}` in the output.

use super::base::BaseBuilder;
use super::text::level_role;
use super::RecordBuilder;
use crate::core::attr::{Attr, Value};
use crate::core::error::Result;
use crate::core::format::{append_json_string, append_json_value};
use crate::core::handler::FormatHandler;
use crate::core::pool::{Buffer, Pooled};
use crate::core::record::Record;
use crate::core::theme::ThemeRole;

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const CALLER_KEY: &str = "caller";
pub const PREFIX_KEY: &str = "prefix";
pub const MESSAGE_KEY: &str = "msg";

/// Writes object members, tracking where a separator is due
pub(crate) struct JsonEncoder<'a> {
    pub(crate) base: BaseBuilder<'a>,
    need_comma: bool,
}

impl<'a> JsonEncoder<'a> {
    pub(crate) fn new(handler: &'a FormatHandler, buf: Pooled<'a, Buffer>) -> Self {
        // A non-empty buffer holds previously rendered members.
        let need_comma = !buf.is_empty();
        Self {
            base: BaseBuilder::new(handler, buf),
            need_comma,
        }
    }

    /// Append every attribute, returning whether any member was written.
    pub(crate) fn append_attrs(&mut self, attrs: &[Attr]) -> Result<bool> {
        let mut wrote = false;
        for attr in attrs {
            wrote |= self.append_attr(attr)?;
        }
        Ok(wrote)
    }

    fn append_attr(&mut self, attr: &Attr) -> Result<bool> {
        let attr = self.base.resolve(attr);
        if attr.is_empty() {
            return Ok(false);
        }

        if let Value::Group(members) = &attr.value {
            if members.is_empty() {
                return Ok(false);
            }
            if attr.key.is_empty() {
                return self.append_attrs(members);
            }

            let mark = self.mark();
            self.open_group(&attr.key)?;
            self.base.push_group(&attr.key);
            let wrote = self.append_attrs(members)?;
            self.base.pop_group();

            if !wrote {
                self.rollback(mark);
                return Ok(false);
            }
            self.close_group();
            return Ok(true);
        }

        self.begin_member(&attr.key)?;
        append_json_value(&mut self.base.buf, &attr.value)?;
        Ok(true)
    }

    /// Write the separator and `"key":`
    pub(crate) fn begin_member(&mut self, key: &str) -> Result<()> {
        if self.need_comma {
            self.base.buf.write_byte(b',');
        }
        let themed = self.base.begin_theme(ThemeRole::Key);
        append_json_string(&mut self.base.buf, key)?;
        self.base.end_theme(themed);
        self.base.buf.write_byte(b':');
        self.need_comma = true;
        Ok(())
    }

    /// A string member whose value carries a theme
    fn themed_member(&mut self, key: &str, role: ThemeRole, value: &str) -> Result<()> {
        self.begin_member(key)?;
        let themed = self.base.begin_theme(role);
        append_json_string(&mut self.base.buf, value)?;
        self.base.end_theme(themed);
        Ok(())
    }

    pub(crate) fn open_group(&mut self, key: &str) -> Result<()> {
        self.begin_member(key)?;
        self.open_brace();
        Ok(())
    }

    pub(crate) fn close_group(&mut self) {
        self.close_brace();
    }

    fn open_brace(&mut self) {
        self.base.paint(ThemeRole::Bracket, "{");
        self.need_comma = false;
    }

    fn close_brace(&mut self) {
        self.base.paint(ThemeRole::Bracket, "}");
        self.need_comma = true;
    }

    pub(crate) fn mark(&self) -> (usize, bool) {
        (self.base.buf.len(), self.need_comma)
    }

    pub(crate) fn rollback(&mut self, (len, need_comma): (usize, bool)) {
        self.base.buf.truncate(len);
        self.need_comma = need_comma;
    }

    /// Append pre-rendered members. They always end with a complete member.
    fn append_raw(&mut self, members: &[u8]) {
        if members.is_empty() {
            return;
        }
        if self.need_comma {
            self.base.buf.write_byte(b',');
        }
        self.base.buf.write_bytes(members);
        self.need_comma = true;
    }
}

pub(crate) struct JsonBuilder<'a> {
    enc: JsonEncoder<'a>,
    record: &'a Record,
    /// Handler groups opened during this render
    opened: usize,
}

impl<'a> JsonBuilder<'a> {
    pub(crate) fn new(handler: &'a FormatHandler, record: &'a Record, buf: Pooled<'a, Buffer>) -> Self {
        Self {
            enc: JsonEncoder::new(handler, buf),
            record,
            opened: 0,
        }
    }
}

impl<'a> RecordBuilder<'a> for JsonBuilder<'a> {
    fn start(&mut self) -> Result<()> {
        self.enc.open_brace();
        Ok(())
    }

    fn append_time(&mut self) -> Result<()> {
        let Some(time) = self.record.time else {
            return Ok(());
        };
        let format = &self.enc.base.handler.config.time_format;
        let formatted = format.format(&time);
        if format.is_numeric() {
            self.enc.begin_member(TIME_KEY)?;
            self.enc.base.paint(ThemeRole::Time, &formatted);
            Ok(())
        } else {
            self.enc.themed_member(TIME_KEY, ThemeRole::Time, &formatted)
        }
    }

    fn append_level(&mut self) -> Result<()> {
        let handler = self.enc.base.handler;
        let level = self.record.level;
        match handler.config.level_names.get(&level) {
            Some(name) => {
                self.enc.begin_member(LEVEL_KEY)?;
                match handler.custom_level_theme() {
                    Some(theme) => {
                        self.enc.base.buf.write_str(theme.prefix());
                        append_json_string(&mut self.enc.base.buf, name)?;
                        self.enc.base.end_theme(true);
                    }
                    None => append_json_string(&mut self.enc.base.buf, name)?,
                }
                Ok(())
            }
            None => self.enc.themed_member(LEVEL_KEY, level_role(level), level.label()),
        }
    }

    fn append_caller(&mut self) -> Result<()> {
        let handler = self.enc.base.handler;
        match handler.caller_label(self.record) {
            Some(caller) => self.enc.themed_member(CALLER_KEY, ThemeRole::Caller, &caller),
            None => Ok(()),
        }
    }

    fn append_prefix(&mut self) -> Result<()> {
        let handler = self.enc.base.handler;
        if handler.prefix.is_empty() {
            return Ok(());
        }
        self.enc.themed_member(PREFIX_KEY, ThemeRole::Prefix, &handler.prefix)
    }

    fn append_message(&mut self) -> Result<()> {
        if self.record.message.is_empty() {
            return Ok(());
        }
        self.enc.begin_member(MESSAGE_KEY)?;
        append_json_string(&mut self.enc.base.buf, &self.record.message)?;
        Ok(())
    }

    fn append_attrs(&mut self) -> Result<()> {
        let handler = self.enc.base.handler;
        self.enc.append_raw(&handler.preformatted);

        let mark = self.enc.mark();
        let pending = &handler.groups[handler.n_open_groups..];
        for name in pending {
            self.enc.open_group(name)?;
        }
        if self.enc.append_attrs(&self.record.attrs)? {
            self.opened = pending.len();
        } else {
            self.enc.rollback(mark);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let open = self.enc.base.handler.n_open_groups + self.opened;
        for _ in 0..open {
            self.enc.close_group();
        }
        self.enc.close_brace();
        Ok(())
    }

    fn output(mut self) -> Result<Pooled<'a, Buffer>> {
        self.enc.base.buf.write_byte(b'\n');
        Ok(self.enc.base.buf)
    }
}
