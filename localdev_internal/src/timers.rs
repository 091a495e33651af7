use std::time::Duration;

/// The page's timer service.
///
/// Both calls return immediately; callbacks run later on the same thread.  Nothing is
/// ever cancelled.
pub trait Timers: 'static {
    /// `setTimeout`.
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>);

    /// `setInterval`.
    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>);
}
