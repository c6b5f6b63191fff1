//! Allocation adapters.
//!
//! Everything the keyboard session allocates (work memory, the filesystem
//! client block, UTF-16 option strings) goes through one [`Heap`], so the
//! whole subsystem's footprint can be accounted for and released together.
//! Allocation failure is reported as [`CafeError::Alloc`] instead of
//! aborting.

use std::alloc::Layout;
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::rc::Rc;

use cafe_types::error::{CafeError, Result};

/// A source of raw memory blocks.
///
/// Layouts passed in are never zero-sized.
pub trait RawAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// # Safety
    ///
    /// `ptr` must have been returned by [`allocate`](Self::allocate) on this
    /// allocator with the same `layout`, and not freed since.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl RawAllocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() != 0);
        // SAFETY: the layout is non-zero-sized per the trait contract.
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// Wraps another allocator and keeps live/peak byte counts.
///
/// An optional limit makes allocations fail once the live total would
/// exceed it, which is how out-of-memory paths are exercised.
#[derive(Debug)]
pub struct TrackingAllocator<A: RawAllocator = SystemAllocator> {
    inner: A,
    live_bytes: Cell<usize>,
    live_blocks: Cell<usize>,
    peak_bytes: Cell<usize>,
    limit: Cell<Option<usize>>,
}

impl TrackingAllocator {
    pub fn new() -> Self {
        Self::wrap(SystemAllocator)
    }
}

impl Default for TrackingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: RawAllocator> TrackingAllocator<A> {
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            live_bytes: Cell::new(0),
            live_blocks: Cell::new(0),
            peak_bytes: Cell::new(0),
            limit: Cell::new(None),
        }
    }

    /// Bytes currently allocated and not yet freed.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }

    pub fn live_blocks(&self) -> usize {
        self.live_blocks.get()
    }

    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes.get()
    }

    /// Fail allocations that would push live bytes above `limit`.
    pub fn set_limit(&self, limit: Option<usize>) {
        self.limit.set(limit);
    }
}

impl<A: RawAllocator> RawAllocator for TrackingAllocator<A> {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        let next = self.live_bytes.get().checked_add(layout.size())?;
        if let Some(limit) = self.limit.get() {
            if next > limit {
                return None;
            }
        }
        let ptr = self.inner.allocate(layout)?;
        self.live_bytes.set(next);
        self.live_blocks.set(self.live_blocks.get() + 1);
        self.peak_bytes.set(self.peak_bytes.get().max(next));
        Some(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller.
        unsafe { self.inner.deallocate(ptr, layout) };
        self.live_bytes.set(self.live_bytes.get() - layout.size());
        self.live_blocks.set(self.live_blocks.get() - 1);
    }
}

/// Shared handle to the library allocator.
#[derive(Clone)]
pub struct Heap {
    raw: Rc<dyn RawAllocator>,
}

impl Heap {
    /// Heap backed by the process allocator.
    pub fn system() -> Self {
        Self::from_rc(Rc::new(SystemAllocator))
    }

    pub fn from_rc(raw: Rc<dyn RawAllocator>) -> Self {
        Self { raw }
    }

    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>> {
        debug_assert!(layout.size() != 0);
        self.raw.allocate(layout).ok_or(CafeError::Alloc {
            requested: layout.size(),
        })
    }

    /// # Safety
    ///
    /// Same contract as [`RawAllocator::deallocate`]; zero-sized layouts
    /// are ignored.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: forwarded from the caller.
            unsafe { self.raw.deallocate(ptr, layout) }
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Heap { .. }")
    }
}

// ---------------------------------------------------------------------------
// Single objects
// ---------------------------------------------------------------------------

/// A single heap object with a stable address, freed through its [`Heap`].
pub struct HeapBox<T> {
    ptr: NonNull<T>,
    heap: Heap,
    _owns: PhantomData<T>,
}

impl<T> HeapBox<T> {
    /// Move `value` into a new allocation. Fails instead of aborting when
    /// the heap is exhausted.
    pub fn new_in(value: T, heap: &Heap) -> Result<Self> {
        let layout = Layout::new::<T>();
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            heap.alloc(layout)?.cast::<T>()
        };
        // SAFETY: `ptr` is valid and aligned for one `T`.
        unsafe { ptr.as_ptr().write(value) };
        Ok(Self {
            ptr,
            heap: heap.clone(),
            _owns: PhantomData,
        })
    }

    /// Address handed to platform calls. Valid until the box is dropped.
    pub fn as_non_null(&self) -> NonNull<T> {
        self.ptr
    }
}

impl<T> Deref for HeapBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the box owns an initialized `T`.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for HeapBox<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the box owns an initialized `T` and we hold `&mut self`.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T> Drop for HeapBox<T> {
    fn drop(&mut self) {
        // SAFETY: the value was written in `new_in` and is dropped once;
        // the block came from `self.heap` with this layout.
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
            self.heap.free(self.ptr.cast(), Layout::new::<T>());
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HeapBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

// ---------------------------------------------------------------------------
// Growable buffers
// ---------------------------------------------------------------------------

/// Growable buffer of plain values allocated from a [`Heap`].
///
/// Used for the keyboard work memory (`u8`) and for UTF-16 strings (`u16`).
pub struct HeapVec<T: Copy> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    heap: Heap,
}

impl<T: Copy> HeapVec<T> {
    /// Empty buffer; allocates nothing.
    pub fn new_in(heap: &Heap) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            heap: heap.clone(),
        }
    }

    pub fn from_slice_in(items: &[T], heap: &Heap) -> Result<Self> {
        let mut out = Self::new_in(heap);
        out.reserve_exact(items.len())?;
        // SAFETY: capacity covers `items.len()` and the regions are distinct.
        unsafe { ptr::copy_nonoverlapping(items.as_ptr(), out.ptr.as_ptr(), items.len()) };
        out.len = items.len();
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` elements are initialized; for an empty
        // buffer the dangling pointer is aligned and never read.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, with exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Start of the allocation, or `None` when nothing is allocated.
    pub fn as_non_null(&self) -> Option<NonNull<T>> {
        (self.cap != 0).then_some(self.ptr)
    }

    /// Make room for exactly `additional` more elements.
    pub fn reserve_exact(&mut self, additional: usize) -> Result<()> {
        let needed = self.len.checked_add(additional).ok_or(CafeError::Alloc {
            requested: usize::MAX,
        })?;
        if needed <= self.cap {
            return Ok(());
        }
        self.reallocate(needed)
    }

    pub fn try_push(&mut self, value: T) -> Result<()> {
        if self.len == self.cap {
            let grown = self.cap.saturating_mul(2).max(4);
            self.reallocate(grown)?;
        }
        // SAFETY: `len < cap` after the growth above.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Grow or shrink to `new_len`, filling new slots with `value`.
    pub fn resize(&mut self, new_len: usize, value: T) -> Result<()> {
        if new_len > self.len {
            self.reserve_exact(new_len - self.len)?;
            // SAFETY: capacity covers `new_len`.
            unsafe {
                for i in self.len..new_len {
                    self.ptr.as_ptr().add(i).write(value);
                }
            }
        }
        self.len = new_len;
        Ok(())
    }

    /// Forget the contents; keeps the allocation.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Drop excess capacity. An empty buffer frees its allocation.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if self.cap > self.len {
            self.reallocate(self.len)?;
        }
        Ok(())
    }

    /// Clear and free the allocation. Never fails.
    pub fn release(&mut self) {
        self.len = 0;
        self.free_buffer();
    }

    fn reallocate(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap >= self.len);
        let layout = Layout::array::<T>(new_cap).map_err(|_| CafeError::Alloc {
            requested: usize::MAX,
        })?;
        let new_ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            self.heap.alloc(layout)?.cast::<T>()
        };
        // SAFETY: both regions hold at least `len` elements and are
        // distinct allocations (or the copy is empty).
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len) };
        let len = self.len;
        self.free_buffer();
        self.ptr = new_ptr;
        self.cap = new_cap;
        self.len = len;
        Ok(())
    }

    fn free_buffer(&mut self) {
        if self.cap != 0 {
            if let Ok(layout) = Layout::array::<T>(self.cap) {
                // SAFETY: the buffer was allocated from `self.heap` with
                // this exact layout.
                unsafe { self.heap.free(self.ptr.cast(), layout) };
            }
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }
}

impl<T: Copy> Deref for HeapVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy> DerefMut for HeapVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Copy> Drop for HeapVec<T> {
    fn drop(&mut self) {
        self.free_buffer();
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for HeapVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
