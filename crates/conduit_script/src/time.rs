//! Frame timing

use conduit_core::NativeApi;

#[derive(Clone, Copy)]
pub struct Time<'a> {
    api: &'a dyn NativeApi,
}

impl<'a> Time<'a> {
    pub(crate) fn new(api: &'a dyn NativeApi) -> Self {
        Self { api }
    }

    /// Seconds since the previous frame.
    pub fn delta_time(&self) -> f32 {
        self.api.time_delta()
    }

    /// Seconds since the runtime started.
    pub fn current_time(&self) -> f32 {
        self.api.time_current()
    }
}
