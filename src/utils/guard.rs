/// Runs a cleanup closure when dropped, including during a panic unwind.
///
/// `main` uses it to restore the terminal however the app exits.
///
/// # Examples
///
/// ```
/// use rusty_console::utils::guard::ExitGuard;
///
/// let _restore = ExitGuard::with(|| println!("terminal restored"));
/// ```
pub struct ExitGuard<F: FnOnce()> {
    on_exit: Option<F>,
}

impl<F: FnOnce()> ExitGuard<F> {
    pub fn with(f: F) -> Self {
        Self { on_exit: Some(f) }
    }
}

impl<F: FnOnce()> Drop for ExitGuard<F> {
    fn drop(&mut self) {
        if let Some(f) = self.on_exit.take() {
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_runs_on_drop() {
        let ran = Cell::new(false);
        {
            let _guard = ExitGuard::with(|| ran.set(true));
        }
        assert!(ran.get());
    }

    #[test]
    fn test_runs_during_unwind() {
        let ran = Cell::new(false);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ExitGuard::with(|| ran.set(true));
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(ran.get());
    }
}
