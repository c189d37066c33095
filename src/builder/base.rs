//! State shared by the text and JSON builders

use crate::core::attr::{Attr, Value};
use crate::core::handler::FormatHandler;
use crate::core::pool::{Buffer, GroupTracker, Pooled};
use crate::core::theme::{ThemeRole, RESET};
use std::borrow::Cow;

pub(crate) struct BaseBuilder<'a> {
    pub(crate) handler: &'a FormatHandler,
    pub(crate) buf: Pooled<'a, Buffer>,
    /// Open group names, only tracked when a resolver needs them
    groups: Option<Pooled<'a, GroupTracker>>,
}

impl<'a> BaseBuilder<'a> {
    pub(crate) fn new(handler: &'a FormatHandler, buf: Pooled<'a, Buffer>) -> Self {
        let groups = handler.config.resolver.as_ref().map(|_| {
            let mut groups = handler.shared.pools.groups.acquire();
            groups.extend(handler.groups.iter().cloned());
            groups
        });
        Self {
            handler,
            buf,
            groups,
        }
    }

    /// Force lazy values, then run the resolver on non-group attributes.
    ///
    /// The resolver's output is forced again, so it may return a lazy value.
    pub(crate) fn resolve<'v>(&self, attr: &'v Attr) -> Cow<'v, Attr> {
        let attr = if matches!(attr.value, Value::Lazy(_)) {
            Cow::Owned(Attr {
                key: attr.key.clone(),
                value: attr.value.clone().resolve(),
            })
        } else {
            Cow::Borrowed(attr)
        };

        match &self.handler.config.resolver {
            Some(resolver) if !attr.value.is_group() => {
                let groups = self.groups.as_deref().map(Vec::as_slice).unwrap_or(&[]);
                let mut resolved = resolver(groups, attr.into_owned());
                resolved.value = resolved.value.resolve();
                Cow::Owned(resolved)
            }
            _ => attr,
        }
    }

    pub(crate) fn push_group(&mut self, name: &str) {
        if let Some(groups) = self.groups.as_mut() {
            groups.push(name.to_string());
        }
    }

    pub(crate) fn pop_group(&mut self) {
        if let Some(groups) = self.groups.as_mut() {
            groups.pop();
        }
    }

    /// Write `text` wrapped in the role's theme, or plain when unthemed
    pub(crate) fn paint(&mut self, role: ThemeRole, text: &str) {
        let handler = self.handler;
        match handler.theme_for(role) {
            Some(theme) => theme.render_into(&mut self.buf, text),
            None => self.buf.write_str(text),
        }
    }

    /// Open a themed span; pass the result to [`BaseBuilder::end_theme`]
    pub(crate) fn begin_theme(&mut self, role: ThemeRole) -> bool {
        let handler = self.handler;
        match handler.theme_for(role) {
            Some(theme) => {
                self.buf.write_str(theme.prefix());
                true
            }
            None => false,
        }
    }

    pub(crate) fn end_theme(&mut self, themed: bool) {
        if themed {
            self.buf.write_str(RESET);
        }
    }
}
