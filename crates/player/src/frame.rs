/// Handle for one requested animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// Bookkeeping for a single self-rescheduling frame callback.
///
/// At most one frame is in flight. Requesting a new frame supersedes the old
/// one and cancelling invalidates it, so a host delivering a stale token after
/// stop or teardown is ignored.
#[derive(Debug, Default)]
pub struct FrameLoop {
    generation: u64,
    pending: Option<FrameToken>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) -> FrameToken {
        self.generation += 1;
        let token = FrameToken(self.generation);
        self.pending = Some(token);
        token
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Consumes `token` if it is the pending frame.
    pub fn accept(&mut self, token: FrameToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
