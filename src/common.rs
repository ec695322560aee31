//! Traits shared among components.

/// Components with a power-on / reset lifecycle.
///
/// `reset` corresponds to pressing the console's reset button while
/// `power_cycle` emulates pulling the power plug.
pub trait Powered {
    fn reset(&mut self) {}
    fn power_cycle(&mut self) {
        self.reset();
    }
}
