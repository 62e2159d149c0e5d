use crate::domain::ports::Clipboard;
use crate::utils::error::{GenError, Result};

/// Holds a clipboard handle for the duration of one copy and releases it on drop.
pub struct ClipboardGuard<C: Clipboard> {
    inner: Option<C>,
}

impl<C: Clipboard> ClipboardGuard<C> {
    pub fn acquire(clipboard: C) -> Self {
        tracing::debug!("Clipboard acquired");
        Self {
            inner: Some(clipboard),
        }
    }

    pub fn set_text(&mut self, text: &str) -> Result<()> {
        match self.inner.as_mut() {
            Some(clipboard) => clipboard.set_text(text),
            None => Err(GenError::Clipboard {
                message: "clipboard already released".to_string(),
            }),
        }
    }
}

impl<C: Clipboard> Drop for ClipboardGuard<C> {
    fn drop(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!("Clipboard released");
        }
    }
}

/// Best-effort copy. Failures are logged and reported as `false`, never raised.
pub fn copy_with<C: Clipboard>(clipboard: C, text: &str) -> bool {
    let mut guard = ClipboardGuard::acquire(clipboard);
    match guard.set_text(text) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Copy to clipboard failed: {}", e);
            false
        }
    }
}

#[cfg(feature = "cli")]
pub struct SystemClipboard(arboard::Clipboard);

#[cfg(feature = "cli")]
impl SystemClipboard {
    pub fn open() -> Result<Self> {
        arboard::Clipboard::new()
            .map(Self)
            .map_err(|e| GenError::Clipboard {
                message: e.to_string(),
            })
    }
}

#[cfg(feature = "cli")]
impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.0
            .set_text(text.to_owned())
            .map_err(|e| GenError::Clipboard {
                message: e.to_string(),
            })
    }
}

/// Copy to the system clipboard, if one is available.
#[cfg(feature = "cli")]
pub fn copy_text(text: &str) -> bool {
    match SystemClipboard::open() {
        Ok(clipboard) => copy_with(clipboard, text),
        Err(e) => {
            tracing::warn!("Clipboard unavailable: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeClipboard {
        contents: Arc<Mutex<Option<String>>>,
        released: Arc<AtomicBool>,
        fail: bool,
    }

    impl Clipboard for FakeClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(GenError::Clipboard {
                    message: "no display".to_string(),
                });
            }
            *self.contents.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    impl Drop for FakeClipboard {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn fake(fail: bool) -> (FakeClipboard, Arc<Mutex<Option<String>>>, Arc<AtomicBool>) {
        let contents = Arc::new(Mutex::new(None));
        let released = Arc::new(AtomicBool::new(false));
        let clipboard = FakeClipboard {
            contents: contents.clone(),
            released: released.clone(),
            fail,
        };
        (clipboard, contents, released)
    }

    #[test]
    fn test_copy_success_releases_clipboard() {
        let (clipboard, contents, released) = fake(false);

        assert!(copy_with(clipboard, "T\n\nBody"));
        assert_eq!(contents.lock().unwrap().as_deref(), Some("T\n\nBody"));
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_copy_failure_is_swallowed_and_releases() {
        let (clipboard, contents, released) = fake(true);

        assert!(!copy_with(clipboard, "text"));
        assert!(contents.lock().unwrap().is_none());
        assert!(released.load(Ordering::SeqCst));
    }
}
