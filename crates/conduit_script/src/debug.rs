//! The script log sink

use conduit_core::types::Severity;
use conduit_core::NativeApi;

#[derive(Clone, Copy)]
pub struct Debug<'a> {
    api: &'a dyn NativeApi,
}

impl<'a> Debug<'a> {
    pub(crate) fn new(api: &'a dyn NativeApi) -> Self {
        Self { api }
    }

    pub fn log(&self, severity: Severity, message: &str) {
        self.api.log(severity, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }

    pub fn critical(&self, message: &str) {
        self.log(Severity::Critical, message);
    }
}
