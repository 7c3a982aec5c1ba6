//! Contains the definition of [`Arena`] and [`ID`], the append-only storage
//! used to give every stored item a stable, typed identity.

use std::{
    cmp::Ordering,
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};

/// A typed index referring to an item stored in an [`Arena<T>`].
///
/// The phantom type parameter prevents an id handed out by one arena type
/// from being used to index into another.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct ID<T: ?Sized> {
    index: usize,

    #[serde(skip)]
    _marker: PhantomData<Box<T>>,
}

impl<T: ?Sized> ID<T> {
    /// Creates an id from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self { index, _marker: PhantomData }
    }

    /// Returns the raw index of this id.
    #[must_use]
    pub const fn into_index(self) -> usize { self.index }
}

impl<T: ?Sized> Debug for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ID({})", self.index)
    }
}

impl<T: ?Sized> Clone for ID<T> {
    fn clone(&self) -> Self { *self }
}

impl<T: ?Sized> Copy for ID<T> {}

impl<T: ?Sized> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool { self.index == other.index }
}

impl<T: ?Sized> Eq for ID<T> {}

impl<T: ?Sized> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering { self.index.cmp(&other.index) }
}

impl<T: ?Sized> Hash for ID<T> {
    fn hash<H: Hasher>(&self, state: &mut H) { self.index.hash(state); }
}

/// An append-only collection assigning each inserted item a stable
/// [`ID<T>`].
///
/// Items are never removed; ids therefore stay valid for the lifetime of the
/// arena and iteration follows insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self { Self { items: Vec::new() } }
}

impl<T> Arena<T> {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Returns the number of items stored in the arena.
    #[must_use]
    pub fn len(&self) -> usize { self.items.len() }

    /// Returns `true` if the arena holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Appends an item and returns the id it was assigned.
    pub fn insert(&mut self, item: T) -> ID<T> {
        let id = ID::new(self.items.len());
        self.items.push(item);
        id
    }

    /// Returns a reference to the item with the given id, or `None` if the
    /// id was not produced by this arena.
    #[must_use]
    pub fn get(&self, id: ID<T>) -> Option<&T> { self.items.get(id.index) }

    /// Returns a mutable reference to the item with the given id, or `None`
    /// if the id was not produced by this arena.
    #[must_use]
    pub fn get_mut(&mut self, id: ID<T>) -> Option<&mut T> {
        self.items.get_mut(id.index)
    }

    /// Iterates over `(id, item)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ID<T>, &T)> {
        self.items.iter().enumerate().map(|(index, item)| (ID::new(index), item))
    }

    /// Iterates over the ids of all stored items in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ID<T>> + '_ {
        (0..self.items.len()).map(ID::new)
    }

    /// Iterates over the stored items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &T> { self.items.iter() }
}

impl<T> Index<ID<T>> for Arena<T> {
    type Output = T;

    fn index(&self, id: ID<T>) -> &Self::Output { &self.items[id.index] }
}

impl<T> IndexMut<ID<T>> for Arena<T> {
    fn index_mut(&mut self, id: ID<T>) -> &mut Self::Output {
        &mut self.items[id.index]
    }
}
