//! Typed views onto the objects of a [`Model`].
use super::{Model, RemovedObject};
use crate::handle::Handle;
use crate::idd::{IddField, IddObject};
use crate::idf::IdfObject;
use anyhow::{Context, Result, ensure};
use std::borrow::{Borrow, BorrowMut};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// A kind of object with typed accessors, tied to one IDD object type
pub trait ModelObjectKind: Sized {
    /// The IDD object type of objects of this kind
    const IDD_OBJECT_TYPE: &'static str;

    /// Set the values a newly constructed object starts with
    fn initialize(object: &mut ModelObject<&mut Model, Self>) -> Result<()> {
        let _ = object;
        Ok(())
    }
}

/// A kind of object of which a model holds at most one
pub trait UniqueModelObjectKind: ModelObjectKind {}

/// Marker for a view which does not know the type of its object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generic;

/// A view onto one object of a model.
///
/// `M` is either `&Model` or `&mut Model`; setters are only available on mutable views. `K` is
/// the kind of object, which selects the typed accessors. A view can only be made for an object
/// which is present in the model and of the right type, so lookups through a view cannot fail.
pub struct ModelObject<M, K = Generic> {
    model: M,
    handle: Handle,
    kind: PhantomData<K>,
}

impl<M: Borrow<Model>, K> fmt::Debug for ModelObject<M, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelObject")
            .field("handle", &self.handle)
            .field("type", &self.idd_object_type())
            .field("name", &self.name())
            .finish()
    }
}

impl<M: Borrow<Model>, K> ModelObject<M, K> {
    /// Create a view. The caller must have checked that the object is present and of type `K`.
    pub(super) fn new(model: M, handle: Handle) -> Self {
        debug_assert!(model.borrow().contains(handle));
        Self {
            model,
            handle,
            kind: PhantomData,
        }
    }

    /// The object's handle
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// The model the object belongs to
    pub fn model(&self) -> &Model {
        self.model.borrow()
    }

    /// The object's underlying data record
    pub fn idf_object(&self) -> &IdfObject {
        self.model().idf(self.handle)
    }

    /// The description of the object's type
    pub fn idd_object(&self) -> &'static IddObject {
        self.idf_object().idd_object()
    }

    /// The name of the object's IDD type
    pub fn idd_object_type(&self) -> &'static str {
        self.idd_object().name.as_str()
    }

    /// The object's name, if its type has one
    pub fn name(&self) -> Option<&str> {
        self.idf_object().name()
    }

    /// The comment printed above the object
    pub fn comment(&self) -> Option<&str> {
        self.idf_object().comment()
    }

    /// The raw value of a field
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.idf_object().get_string(index)
    }

    /// The raw value of a field, or the IDD default
    pub fn get_string_or_default(&self, index: usize) -> Option<&str> {
        self.idf_object().get_string_or_default(index)
    }

    /// The numeric value of a field
    pub fn get_double(&self, index: usize) -> Option<f64> {
        self.idf_object().get_double(index)
    }

    /// The numeric value of a field, or the IDD default
    pub fn get_double_or_default(&self, index: usize) -> Option<f64> {
        self.idf_object().get_double_or_default(index)
    }

    /// The integer value of a field
    pub fn get_int(&self, index: usize) -> Option<i32> {
        self.idf_object().get_int(index)
    }

    /// The integer value of a field, or the IDD default
    pub fn get_int_or_default(&self, index: usize) -> Option<i32> {
        self.idf_object().get_int_or_default(index)
    }

    /// Whether a field is empty
    pub fn is_empty(&self, index: usize) -> bool {
        self.idf_object().is_empty(index)
    }

    /// Parse a choice field (or its default) into an enum
    pub(crate) fn get_choice<T: FromStr>(&self, index: usize) -> Option<T> {
        self.get_string_or_default(index)?.parse().ok()
    }

    /// Read a `Yes`/`No` choice field (or its default)
    pub(crate) fn get_yes_no(&self, index: usize) -> bool {
        self.get_string_or_default(index)
            .is_some_and(|value| value.eq_ignore_ascii_case("Yes"))
    }

    /// The object a pointer field refers to. Empty and dangling pointers give `None`.
    pub fn pointer(&self, index: usize) -> Option<Handle> {
        let handle = self.get_string(index)?.parse().ok()?;
        self.model().contains(handle).then_some(handle)
    }

    /// Whether the object is of kind `T`
    pub fn is_kind<T: ModelObjectKind>(&self) -> bool {
        self.idd_object().is_type(T::IDD_OBJECT_TYPE)
    }

    /// Convert into a view of kind `T`, if the object is of that kind
    pub fn cast<T: ModelObjectKind>(self) -> Option<ModelObject<M, T>> {
        self.is_kind::<T>()
            .then(|| ModelObject::new(self.model, self.handle))
    }

    /// Forget the object's kind
    pub fn into_generic(self) -> ModelObject<M> {
        ModelObject::new(self.model, self.handle)
    }
}

impl<M: BorrowMut<Model>, K> ModelObject<M, K> {
    fn idf_object_mut(&mut self) -> &mut IdfObject {
        self.model.borrow_mut().idf_mut(self.handle)
    }

    /// Reborrow a mutable view as a read-only one
    pub fn view(&self) -> ModelObject<&Model, K> {
        ModelObject::new(self.model.borrow(), self.handle)
    }

    /// Set the object's name, returning the name actually stored. A suffix is added if another
    /// object of the same type already has the name.
    pub fn set_name(&mut self, name: &str) -> Result<String> {
        let handle = self.handle;
        self.model.borrow_mut().set_object_name(handle, name)
    }

    /// Set the comment printed above the object
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.idf_object_mut().set_comment(comment);
    }

    /// Set a field from text
    pub fn set_string(&mut self, index: usize, value: &str) -> Result<()> {
        ensure!(index > 0, "The handle field cannot be changed");
        self.idf_object_mut().set_string(index, value)
    }

    /// Set a numeric field
    pub fn set_double(&mut self, index: usize, value: f64) -> Result<()> {
        self.idf_object_mut().set_double(index, value)
    }

    /// Set an integer field
    pub fn set_int(&mut self, index: usize, value: i32) -> Result<()> {
        self.idf_object_mut().set_int(index, value)
    }

    /// Clear a field
    pub fn reset(&mut self, index: usize) {
        if index > 0 {
            self.idf_object_mut().reset(index);
        }
    }

    /// Write a `Yes`/`No` choice field
    pub(crate) fn set_yes_no(&mut self, index: usize, value: bool) -> Result<()> {
        self.set_string(index, if value { "Yes" } else { "No" })
    }

    /// Point a field at another object of the model. The target must belong to one of the
    /// reference classes the field accepts.
    pub fn set_pointer(&mut self, index: usize, target: Handle) -> Result<()> {
        let field = self.pointer_field(index)?;
        let target_idd = self
            .model()
            .object(target)
            .with_context(|| format!("Object {target} is not in the model"))?
            .idd_object();
        ensure!(
            target_idd.is_referenced_by(field),
            "{} objects cannot be used for {} of {}",
            target_idd.name,
            field.name,
            self.idd_object_type()
        );

        self.idf_object_mut().set_string(index, &target.to_string())
    }

    fn pointer_field(&self, index: usize) -> Result<&'static IddField> {
        let field = self
            .idd_object()
            .field(index)
            .with_context(|| format!("{} has no field at index {index}", self.idd_object_type()))?;
        ensure!(field.is_pointer(), "{} is not a pointer field", field.name);

        Ok(field)
    }

    /// Access the object's extensible groups
    pub(crate) fn push_extensible_group(&mut self, values: &[&str]) -> Result<usize> {
        self.idf_object_mut().push_extensible_group(values)
    }

    pub(crate) fn erase_extensible_group(&mut self, group: usize) -> Result<()> {
        self.idf_object_mut().erase_extensible_group(group)
    }

    pub(crate) fn clear_extensible_groups(&mut self) {
        self.idf_object_mut().clear_extensible_groups();
    }

    /// Remove the object from its model
    pub fn remove(mut self) -> Result<RemovedObject> {
        let handle = self.handle;
        self.model.borrow_mut().remove(handle)
    }
}
