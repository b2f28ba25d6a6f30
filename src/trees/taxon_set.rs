use anyhow::{anyhow, Result};
use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    hash::Hash,
};

/// The trait for taxon labels.
///
/// Taxa may be labeled by any type implementing some traits allowing their
/// use in maps and their display. This trait is just a shortcut used to
/// combine them.
///
/// Simple types like [usize] and [String] implement [LabelType].
pub trait LabelType: Clone + Debug + Display + Eq + Hash {}
impl<T: Clone + Debug + Display + Eq + Hash> LabelType for T {}

/// A taxon, associated with a unique identifier.
///
/// Taxon ids are dense and assigned in first-seen order, so they double as
/// the leaf slot numbers of the network encoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Taxon<T>
where
    T: LabelType,
{
    id: usize,
    label: T,
}

impl<T> Taxon<T>
where
    T: LabelType,
{
    fn new(id: usize, label: T) -> Self {
        Self { id, label }
    }

    /// Returns the taxon label.
    pub fn label(&self) -> &T {
        &self.label
    }

    /// Returns the identifier associated with the taxon.
    pub fn id(&self) -> usize {
        self.id
    }
}

impl<T> Display for Taxon<T>
where
    T: LabelType,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Handles the set of taxa shared by all the input trees.
///
/// Each taxon gets a unique dense id equal to its insertion rank. The set is
/// append-only: taxa are fixed by the first input tree and never removed.
///
/// The type of the labels must be a [`LabelType`] instance.
#[derive(Default)]
pub struct TaxonSet<T>
where
    T: LabelType,
{
    taxa: Vec<Taxon<T>>,
    label_to_id: HashMap<T, usize>,
}

impl<T> TaxonSet<T>
where
    T: LabelType,
{
    /// Adds a new taxon to this set and returns its id.
    ///
    /// If the taxon is already present, nothing is added and the existing id
    /// is returned.
    ///
    /// # Example
    ///
    /// ```
    /// # use phylocnf::trees::TaxonSet;
    /// let mut taxa = TaxonSet::default();
    /// assert_eq!(0, taxa.new_taxon("cat"));
    /// assert_eq!(1, taxa.new_taxon("dog"));
    /// assert_eq!(0, taxa.new_taxon("cat"));
    /// assert_eq!(2, taxa.len());
    /// ```
    pub fn new_taxon(&mut self, label: T) -> usize {
        *self.label_to_id.entry(label.clone()).or_insert_with(|| {
            self.taxa.push(Taxon::new(self.taxa.len(), label));
            self.taxa.len() - 1
        })
    }

    /// Returns the taxon object associated with a label.
    ///
    /// In case no such taxon exists, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// # use phylocnf::trees::TaxonSet;
    /// let mut taxa = TaxonSet::default();
    /// taxa.new_taxon("cat");
    /// assert!(taxa.get_taxon(&"cat").is_ok());
    /// assert!(taxa.get_taxon(&"dog").is_err());
    /// ```
    pub fn get_taxon(&self, label: &T) -> Result<&Taxon<T>> {
        self.label_to_id
            .get(label)
            .map(|i| &self.taxa[*i])
            .ok_or_else(|| anyhow!("no such taxon: {}", label))
    }

    /// Returns the taxon with the corresponding id.
    ///
    /// # Panics
    ///
    /// Panics if no taxon has such id.
    pub fn get_taxon_by_id(&self, id: usize) -> &Taxon<T> {
        &self.taxa[id]
    }

    /// Returns the number of taxa in the set.
    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    /// Returns `true` if and only if the set has no taxon.
    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Returns an iterator over the taxa, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Taxon<T>> + '_ {
        self.taxa.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_taxa_get_dense_ids() {
        let mut taxa = TaxonSet::default();
        for (i, label) in ["a", "b", "c"].iter().enumerate() {
            assert_eq!(i, taxa.new_taxon(label.to_string()));
        }
        assert_eq!(3, taxa.len());
        assert!(!taxa.is_empty());
        for (i, taxon) in taxa.iter().enumerate() {
            assert_eq!(i, taxon.id());
        }
    }

    #[test]
    fn test_repeated_taxon() {
        let mut taxa = TaxonSet::default();
        assert_eq!(0, taxa.new_taxon("a"));
        assert_eq!(1, taxa.new_taxon("b"));
        assert_eq!(0, taxa.new_taxon("a"));
        assert_eq!(2, taxa.len());
    }

    #[test]
    fn test_get_taxon() {
        let mut taxa = TaxonSet::default();
        taxa.new_taxon("a");
        assert_eq!(0, taxa.get_taxon(&"a").unwrap().id());
        assert!(taxa.get_taxon(&"b").is_err());
    }

    #[test]
    fn test_get_taxon_by_id() {
        let mut taxa = TaxonSet::default();
        taxa.new_taxon("a".to_string());
        taxa.new_taxon("b".to_string());
        assert_eq!("b", taxa.get_taxon_by_id(1).label());
    }

    #[test]
    #[should_panic]
    fn test_get_taxon_by_unknown_id() {
        let taxa = TaxonSet::<String>::default();
        taxa.get_taxon_by_id(0);
    }

    #[test]
    fn test_empty() {
        let taxa = TaxonSet::<String>::default();
        assert_eq!(0, taxa.len());
        assert!(taxa.is_empty());
    }
}
