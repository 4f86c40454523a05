//! Scene object capability and a reference implementation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Minimal capability a rendering-library object must offer so that tree
/// operations can be mirrored into its native child list.
///
/// Implementors are expected to be handles: `child` is another handle to an
/// object owned elsewhere, and adding it must not take ownership away from
/// the caller.
pub trait SceneObject {
    /// Append `child` to this object's native child list.
    fn add(&mut self, child: &Self);

    /// Remove `child` from this object's native child list.
    fn remove(&mut self, child: &Self);
}

#[derive(Default)]
struct ObjectData {
    name: String,
    children: Vec<Object3D>,
}

// Deep hierarchies would otherwise be freed by one nested drop per level.
impl Drop for ObjectData {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(child) = stack.pop() {
            if let Ok(cell) = Rc::try_unwrap(child.inner) {
                let mut data = cell.into_inner();
                stack.append(&mut data.children);
            }
        }
    }
}

/// Shared handle to a named scene object with its own child list.
///
/// Cloning yields another handle to the same object, like object references
/// in a retained-mode scene graph. Not `Send`: scene graphs are built on one
/// thread.
#[derive(Clone, Default)]
pub struct Object3D {
    inner: Rc<RefCell<ObjectData>>,
}

impl Object3D {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectData {
                name: name.into(),
                children: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Snapshot of the native child list, in insertion order.
    pub fn children(&self) -> Vec<Object3D> {
        self.inner.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// True when both handles point at the same object.
    pub fn ptr_eq(&self, other: &Object3D) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stable identity of the underlying object, shared by all its handles.
    pub(crate) fn key(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    pub fn contains(&self, child: &Object3D) -> bool {
        self.inner.borrow().children.iter().any(|c| c.ptr_eq(child))
    }
}

impl SceneObject for Object3D {
    fn add(&mut self, child: &Self) {
        self.inner.borrow_mut().children.push(child.clone());
    }

    fn remove(&mut self, child: &Self) {
        self.inner
            .borrow_mut()
            .children
            .retain(|c| !c.ptr_eq(child));
    }
}

// Children are summarized: a parent cycle would otherwise recurse forever.
impl fmt::Debug for Object3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Object3D")
            .field("name", &data.name)
            .field("children", &data.children.len())
            .finish()
    }
}

impl fmt::Display for Object3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.borrow().name)
    }
}
