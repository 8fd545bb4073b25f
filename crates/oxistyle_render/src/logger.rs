use log::{debug, trace};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use oxistyle_core::{LocatedWarning, Logger, SourceSpan, WarnOptions, Warning, WarningDetail};

/// Logger handed to the compiler for one render. Buffers every warning
/// instead of printing it. A configured override also receives each
/// diagnostic; the buffer is kept either way.
pub struct WarningCollector {
    entry: PathBuf,
    warnings: Mutex<Vec<Warning>>,
    forward: Option<Arc<dyn Logger>>,
}

impl WarningCollector {
    /// Spans without a URL are attributed to `entry`.
    pub fn new(entry: impl Into<PathBuf>, forward: Option<Arc<dyn Logger>>) -> Self {
        Self { entry: entry.into(), warnings: Mutex::new(Vec::new()), forward }
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn span_file(&self, span: &SourceSpan) -> PathBuf {
        span.url
            .as_ref()
            .and_then(|url| url.to_file_path().ok())
            .unwrap_or_else(|| self.entry.clone())
    }
}

impl Logger for WarningCollector {
    fn warn(&self, message: &str, options: &WarnOptions) {
        if let Some(forward) = &self.forward {
            forward.warn(message, options);
        }

        let warning = match &options.span {
            Some(span) => Warning::Located(LocatedWarning {
                text: message.to_string(),
                file: self.span_file(span),
                line: span.line + 1,
                column: span.column,
                line_text: span.context.clone(),
                detail: WarningDetail {
                    deprecation: options.deprecation,
                    stack: options.stack.clone(),
                },
            }),
            None => Warning::Message(message.to_string()),
        };
        trace!("Buffered warning: {}", warning.text());
        self.warnings.lock().unwrap_or_else(PoisonError::into_inner).push(warning);
    }

    fn debug(&self, message: &str, span: Option<&SourceSpan>) {
        if let Some(forward) = &self.forward {
            forward.debug(message, span);
        }
        debug!("{}", message);
    }
}
