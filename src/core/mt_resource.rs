use std::sync::{Arc, Mutex, MutexGuard};

/// A thread-safe, reference-counted resource container with exclusive locking.
///
/// `MtResource` provides synchronized access to a value of type `T` that is
/// shared between the main tick loop and background threads. Every access
/// holds the single lock for the duration of the guard, so a read-modify-write
/// performed through one guard can never be partially observed.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send`
///
/// # Examples
///
/// ```
/// use voxel_streaming::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = std::thread::spawn(move || {
///     *counter_clone.lock() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.lock(), 1);
/// ```
///
/// # Performance Considerations
/// - All access is exclusive; keep guards short-lived
/// - Never hold a guard across a sleep or another blocking call
pub struct MtResource<T: Send> {
    resource: Arc<Mutex<T>>,
}

impl<T: Send> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(Mutex::new(resource)),
        }
    }

    /// Acquires the lock and returns a guard over the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned. A poisoned lock means another thread
    /// panicked halfway through a mutation, so the contents can no longer be
    /// trusted.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.resource
            .lock()
            .expect("MtResource lock has been poisoned!")
    }

    /// Number of handles currently sharing this resource.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.resource)
    }
}

impl<T: Send> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
