//! Miscellaneous utility data structures.

use std::iter::FromIterator;
use std::ops::Deref;

/// A vector with a specifically selected element.
///
/// This type is primarially used to implement scrolling selections through
/// search results.
#[derive(Clone, Debug)]
pub struct SelectedVec<T> {
  vec: Vec<T>,

  // NOTE: Always in range when vec is non-empty.
  selection: usize,
}

impl<T> SelectedVec<T> {
  /// Constructs a new, empty `SelectedVec`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the currently selected index in `self`.
  pub fn selection(&self) -> usize {
    self.selection
  }

  /// Returns the currently selected index in `self`, shifted by `delta` such
  /// that it is still a valid selection.
  pub fn shifted_selection(&self, delta: isize) -> usize {
    (self.selection as isize)
      .saturating_add(delta)
      .clamp(0, self.vec.len().saturating_sub(1) as isize) as usize
  }

  /// Returns a reference to the selected element if `self` is nonempty.
  pub fn selected(&self) -> Option<&T> {
    self.vec.get(self.selection)
  }

  /// Shifts the selected index by `delta`, clamping to the index bounds of
  /// the internal vector.
  ///
  /// This function returns true when the selection was successfully changed;
  /// that is, if the new, clamped index is different from the current one.
  pub fn shift(&mut self, delta: isize) -> bool {
    let new_index = self.shifted_selection(delta);
    if new_index == self.selection {
      return false;
    }

    self.selection = new_index;
    true
  }

  /// Replaces the contents of `self`.
  ///
  /// If an element of `vec` matches the previously selected one according to
  /// `same`, it stays selected; otherwise the selection resets to the top.
  pub fn replace(&mut self, vec: Vec<T>, same: impl Fn(&T, &T) -> bool) {
    let selection = self
      .selected()
      .and_then(|old| vec.iter().position(|new| same(old, new)))
      .unwrap_or(0);
    self.vec = vec;
    self.selection = selection;
  }
}

impl<T> Default for SelectedVec<T> {
  fn default() -> Self {
    Self {
      vec: Vec::new(),
      selection: 0,
    }
  }
}

impl<T, V: Into<Vec<T>>> From<V> for SelectedVec<T> {
  fn from(v: V) -> Self {
    Self {
      vec: v.into(),
      selection: 0,
    }
  }
}

impl<T> Deref for SelectedVec<T> {
  type Target = [T];
  fn deref(&self) -> &[T] {
    &self.vec
  }
}

impl<A> FromIterator<A> for SelectedVec<A> {
  fn from_iter<T>(iter: T) -> Self
  where
    T: IntoIterator<Item = A>,
  {
    Vec::<A>::from_iter(iter).into()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use pretty_assertions::assert_eq;

  #[test]
  fn shifting_clamps() {
    let mut v = SelectedVec::from(vec!['a', 'b', 'c']);
    assert_eq!(v.selected(), Some(&'a'));
    assert!(!v.shift(-1));
    assert!(v.shift(5));
    assert_eq!(v.selected(), Some(&'c'));
    assert_eq!(v.shifted_selection(-1), 1);

    let mut empty = SelectedVec::<char>::new();
    assert!(!empty.shift(1));
    assert_eq!(empty.selected(), None);
  }

  #[test]
  fn replacing_keeps_the_selection() {
    let mut v = (1..=5).collect::<SelectedVec<u32>>();
    v.shift(3);
    assert_eq!(v.selected(), Some(&4));

    v.replace(vec![2, 4, 6], |a, b| a == b);
    assert_eq!(v.selection(), 1);
    assert_eq!(v.selected(), Some(&4));

    v.replace(vec![7, 8], |a, b| a == b);
    assert_eq!(v.selection(), 0);

    v.replace(vec![], |a, b| a == b);
    assert_eq!(v.selected(), None);
  }
}
