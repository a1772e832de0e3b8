use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` is how chunks are shared between the render thread and the
/// meshing workers. It wraps an `Arc<RwLock<T>>` so that any number of workers
/// can read a chunk (and its neighbors) to snapshot it, and the render thread
/// can take exclusive access when it edits blocks.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ```
/// use voxel_mesher::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = std::thread::spawn(move || {
///     *counter_clone.get_mut() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Performance Considerations
/// - Read operations (`get()`) can occur concurrently
/// - Write operations (`get_mut()`) are exclusive and will block other operations
/// - `parking_lot` locks do not poison, so a panicking worker never wedges the
///   render thread
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard that allows reading the contained value.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read()
    }

    /// Returns a mutable guard that allows modifying the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write()
    }

    /// Returns `true` if both handles point at the same underlying resource.
    ///
    /// Mesh results are matched back to their chunk with this, since a chunk
    /// can be removed and replaced at the same coordinate while a job is in
    /// flight.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_resource() {
        let resource = MtResource::new(vec![1, 2, 3]);
        let clone = resource.clone();

        clone.get_mut().push(4);

        assert_eq!(resource.get().len(), 4);
        assert!(resource.ptr_eq(&clone));
    }

    #[test]
    fn test_distinct_resources_are_not_ptr_eq() {
        let a = MtResource::new(1u8);
        let b = MtResource::new(1u8);
        assert!(!a.ptr_eq(&b));
    }
}
