//! The shared rendering device and its exclusive-access discipline.
//!
//! A [`Device`] owns the single hidden rendering surface behind a mutex.
//! [`Device::acquire`] blocks until the mutex is free, makes the surface
//! current on the calling thread and returns a [`ContextGuard`]; dropping
//! the guard makes the surface not-current again and unlocks, on every exit
//! path including early `?` returns. All GPU work anywhere in the crate
//! happens while holding a guard.
//!
//! The thread that creates the device owns it: [`Device::shutdown`] is only
//! honored on that thread.

use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::thread::{self, ThreadId};

use crate::ledger::ResourceLedger;

/// A rendering surface whose context can be made current on one thread.
///
/// `Api` is the handle GPU calls are issued through (`glow::Context` for
/// the GLFW surface). Implementations only need to be `Send`: the device
/// guarantees that at most one thread touches the surface at a time.
pub trait Surface: Send {
    type Api;

    /// Makes the surface's context current on the calling thread.
    fn make_current(&mut self);

    /// Detaches the surface's context from the calling thread.
    fn release_current(&mut self);

    /// The API handle for issuing GPU calls while current.
    fn api(&self) -> &Self::Api;
}

/// The process-wide rendering device shared by all transition instances.
pub struct Device<S: Surface> {
    surface: Mutex<S>,
    owner: ThreadId,
    ledger: ResourceLedger,
}

impl<S: Surface> Device<S> {
    /// Wraps a freshly created surface. The calling thread becomes the owner.
    ///
    /// The surface must not be current on any thread when handed over.
    pub fn new(surface: S) -> Self {
        let owner = thread::current().id();
        tracing::debug!(?owner, "render device created");
        Self {
            surface: Mutex::new(surface),
            owner,
            ledger: ResourceLedger::new(),
        }
    }

    /// Blocks until the surface is free, then makes it current here.
    pub fn acquire(&self) -> ContextGuard<'_, S> {
        let mut surface = self.surface.lock();
        surface.make_current();
        ContextGuard {
            surface,
            ledger: &self.ledger,
        }
    }

    /// Live GPU object counters for everything created through this device.
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// The thread that created the device and alone may tear it down.
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Destroys the device on its owner thread.
    ///
    /// Off the owner thread the device is handed back untouched in `Err`.
    /// On success the surface is made current one last time and dropped
    /// here, so its destructor runs with its own context current.
    pub fn shutdown(self) -> Result<(), Self> {
        if !self.is_owner_thread() {
            tracing::warn!(owner = ?self.owner, "device teardown refused off the owner thread");
            return Err(self);
        }

        let live = self.ledger.snapshot().total();
        if live > 0 {
            tracing::warn!(live, "tearing down device with live GPU objects");
        }

        let mut surface = self.surface.into_inner();
        surface.make_current();
        drop(surface);
        tracing::debug!("render device destroyed");
        Ok(())
    }
}

impl<S: Surface> fmt::Debug for Device<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("owner", &self.owner)
            .field("ledger", &self.ledger.snapshot())
            .finish_non_exhaustive()
    }
}

/// Exclusive, current access to the device's surface.
///
/// Holding a guard means the calling thread owns the lock and the surface
/// is current on it. Dropping the guard releases both.
pub struct ContextGuard<'a, S: Surface> {
    surface: MutexGuard<'a, S>,
    ledger: &'a ResourceLedger,
}

impl<S: Surface> ContextGuard<'_, S> {
    /// The API handle for GPU calls.
    pub fn api(&self) -> &S::Api {
        self.surface.api()
    }

    pub fn ledger(&self) -> &ResourceLedger {
        self.ledger
    }
}

impl<S: Surface> Drop for ContextGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.release_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Records make-current transitions and flags any overlap.
    #[derive(Default)]
    struct Probe {
        current: AtomicBool,
        overlaps: AtomicUsize,
        acquisitions: AtomicUsize,
        destroyed_on: Mutex<Option<ThreadId>>,
    }

    struct FakeSurface {
        probe: Arc<Probe>,
    }

    impl Surface for FakeSurface {
        type Api = Arc<Probe>;

        fn make_current(&mut self) {
            if self.probe.current.swap(true, Ordering::SeqCst) {
                self.probe.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            self.probe.acquisitions.fetch_add(1, Ordering::SeqCst);
        }

        fn release_current(&mut self) {
            self.probe.current.store(false, Ordering::SeqCst);
        }

        fn api(&self) -> &Arc<Probe> {
            &self.probe
        }
    }

    impl Drop for FakeSurface {
        fn drop(&mut self) {
            *self.probe.destroyed_on.lock() = Some(thread::current().id());
        }
    }

    fn device() -> (Device<FakeSurface>, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let device = Device::new(FakeSurface {
            probe: Arc::clone(&probe),
        });
        (device, probe)
    }

    #[test]
    fn guard_makes_current_and_releases_on_drop() {
        let (device, probe) = device();
        {
            let guard = device.acquire();
            assert!(guard.api().current.load(Ordering::SeqCst));
        }
        assert!(!probe.current.load(Ordering::SeqCst));
        assert_eq!(probe.acquisitions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guard_releases_on_early_return() {
        fn fails(device: &Device<FakeSurface>) -> Result<(), &'static str> {
            let _guard = device.acquire();
            let step: Result<(), &'static str> = Err("step failed");
            step?;
            Ok(())
        }

        let (device, probe) = device();
        assert!(fails(&device).is_err());
        assert!(!probe.current.load(Ordering::SeqCst));
        // The lock was released too: acquiring again does not deadlock.
        drop(device.acquire());
    }

    #[test]
    fn guard_exposes_device_ledger() {
        let (device, _probe) = device();
        let guard = device.acquire();
        guard.ledger().allocated(crate::ledger::GpuResource::Texture);
        drop(guard);
        assert_eq!(device.ledger().live(crate::ledger::GpuResource::Texture), 1);
    }

    #[test]
    fn creating_thread_owns_the_device() {
        let (device, _probe) = device();
        assert!(device.is_owner_thread());
        assert_eq!(device.owner(), thread::current().id());
    }

    #[test]
    fn shutdown_on_owner_thread_destroys_surface_here() {
        let (device, probe) = device();
        assert!(device.shutdown().is_ok());
        assert_eq!(*probe.destroyed_on.lock(), Some(thread::current().id()));
    }

    #[test]
    fn shutdown_off_owner_thread_hands_device_back() {
        let (device, probe) = device();
        let returned = thread::spawn(move || device.shutdown().err())
            .join()
            .unwrap()
            .expect("teardown must be refused off the owner thread");
        assert!(probe.destroyed_on.lock().is_none());
        assert!(returned.shutdown().is_ok());
    }

    #[test]
    fn surface_is_never_current_on_two_threads() {
        let (device, probe) = device();
        let device = Arc::new(device);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let device = Arc::clone(&device);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let guard = device.acquire();
                        assert!(guard.api().current.load(Ordering::SeqCst));
                        thread::yield_now();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(probe.overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(probe.acquisitions.load(Ordering::SeqCst), 8 * 500);
        assert!(!probe.current.load(Ordering::SeqCst));
    }
}
