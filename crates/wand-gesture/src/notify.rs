use crate::types::GestureResult;

/// Receives the outcome of every evaluated window.
pub trait GestureNotifier: Send {
    fn notify(&mut self, result: GestureResult);
}

impl<F> GestureNotifier for F
where
    F: FnMut(GestureResult) + Send,
{
    fn notify(&mut self, result: GestureResult) {
        self(result)
    }
}

/// Logs twists at info and quiet windows at trace.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    twists: u64,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn twists(&self) -> u64 {
        self.twists
    }
}

impl GestureNotifier for TracingNotifier {
    fn notify(&mut self, result: GestureResult) {
        match result {
            GestureResult::ArmTwisted => {
                self.twists += 1;
                tracing::info!(twists = self.twists, "{result}");
            }
            GestureResult::NoGesture => tracing::trace!("{result}"),
        }
    }
}
