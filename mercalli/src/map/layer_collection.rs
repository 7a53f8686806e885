use std::ops::{Index, IndexMut};

use crate::layer::Layer;

/// Collection of layers with some meta-information.
///
/// When a map is rendered, it draws all visible layers in the order they are stored in
/// the collection. Any layer can be temporarily hidden with the [`LayerCollection::hide`]
/// or [`LayerCollection::show_by`] methods. Hidden layers are ignored by the renderer,
/// but retain their place in the collection.
#[derive(Default)]
pub struct LayerCollection(Vec<LayerEntry>);

struct LayerEntry {
    layer: Box<dyn Layer>,
    is_hidden: bool,
}

impl LayerCollection {
    /// Adds the layer to the end of the collection.
    ///
    /// # Examples
    ///
    /// ```
    /// use mercalli::layer::TestLayer;
    /// use mercalli::map::LayerCollection;
    ///
    /// let mut collection = LayerCollection::default();
    /// collection.push(TestLayer("Layer A"));
    ///
    /// assert_eq!(collection.len(), 1);
    /// ```
    pub fn push(&mut self, layer: impl Layer + 'static) {
        self.0.push(layer.into())
    }

    /// Inserts a layer at position `index`, shifting all layers after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, layer: impl Layer + 'static) {
        self.0.insert(index, layer.into());
    }

    /// Removes a layer at `index`, shifting all layers after it to the left and returning
    /// the removed layer.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use mercalli::layer::TestLayer;
    /// use mercalli::map::LayerCollection;
    ///
    /// let mut collection = LayerCollection::from(vec![
    ///     TestLayer("Layer A"),
    ///     TestLayer("Layer B"),
    /// ]);
    ///
    /// let removed = collection.remove(0);
    /// assert_eq!(removed.attribution().unwrap().get_text(), "Layer A");
    /// assert_eq!(collection.len(), 1);
    /// ```
    pub fn remove(&mut self, index: usize) -> Box<dyn Layer> {
        self.0.remove(index).layer
    }

    /// Returns the count of layers in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the collection contains zero layers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a layer at `index`, or `None` if index is out of bounds.
    pub fn get(&self, index: usize) -> Option<&dyn Layer> {
        self.0.get(index).map(|entry| &*entry.layer)
    }

    /// Returns a mutable reference to a layer at `index`, or `None` if index is out of
    /// bounds.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Box<dyn Layer>> {
        self.0.get_mut(index).map(|entry| &mut entry.layer)
    }

    /// Iterates over all layers in the collection.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Layer> + '_ {
        self.0.iter().map(|entry| &*entry.layer)
    }

    /// Iterates over mutable references to all layers in the collection.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Layer>> + '_ {
        self.0.iter_mut().map(|entry| &mut entry.layer)
    }

    /// Sets the layer at `index` as invisible. The hidden layer can be later shown with
    /// [`LayerCollection::show`].
    ///
    /// Hidden layers are stored in the layer collection, but are not rendered to a map.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use mercalli::layer::TestLayer;
    /// use mercalli::map::LayerCollection;
    ///
    /// let mut collection = LayerCollection::from(vec![
    ///     TestLayer("Layer A"),
    ///     TestLayer("Layer B"),
    /// ]);
    ///
    /// collection.hide(1);
    /// assert!(!collection.is_visible(1));
    /// ```
    pub fn hide(&mut self, index: usize) {
        self.0[index].is_hidden = true;
    }

    /// Sets the layer at `index` as visible.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn show(&mut self, index: usize) {
        self.0[index].is_hidden = false;
    }

    /// Sets all layers for which the predicate returns true as visible. The rest of the
    /// layers are set as hidden.
    ///
    /// # Examples
    ///
    /// ```
    /// use mercalli::layer::TestLayer;
    /// use mercalli::map::LayerCollection;
    ///
    /// let mut collection = LayerCollection::from(vec![
    ///     TestLayer("Layer A"),
    ///     TestLayer("Layer B"),
    ///     TestLayer("Layer C"),
    /// ]);
    ///
    /// collection.show_by(|layer| {
    ///     layer.attribution().is_some_and(|a| a.get_text().ends_with("B"))
    /// });
    ///
    /// assert!(!collection.is_visible(0));
    /// assert!(collection.is_visible(1));
    /// assert!(!collection.is_visible(2));
    /// ```
    pub fn show_by<F>(&mut self, mut f: F)
    where
        F: FnMut(&dyn Layer) -> bool,
    {
        for entry in &mut self.0 {
            entry.is_hidden = !f(&*entry.layer);
        }
    }

    /// Returns true if the layer at `index` is not hidden.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn is_visible(&self, index: usize) -> bool {
        !self.0[index].is_hidden
    }

    /// Iterates over all visible layers in the collection.
    pub fn iter_visible(&self) -> impl Iterator<Item = &dyn Layer> + '_ {
        self.0
            .iter()
            .filter(|entry| !entry.is_hidden)
            .map(|entry| &*entry.layer)
    }
}

impl Index<usize> for LayerCollection {
    type Output = dyn Layer;

    fn index(&self, index: usize) -> &Self::Output {
        &*self.0[index].layer
    }
}

impl IndexMut<usize> for LayerCollection {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut *self.0[index].layer
    }
}

impl<L: Into<LayerEntry>, T: IntoIterator<Item = L>> From<T> for LayerCollection {
    fn from(value: T) -> Self {
        Self(value.into_iter().map(|layer| layer.into()).collect())
    }
}

impl<T: Layer + 'static> From<T> for LayerEntry {
    fn from(value: T) -> Self {
        Self {
            layer: Box::new(value),
            is_hidden: false,
        }
    }
}

impl From<Box<dyn Layer>> for LayerEntry {
    fn from(value: Box<dyn Layer>) -> Self {
        Self {
            layer: value,
            is_hidden: false,
        }
    }
}
